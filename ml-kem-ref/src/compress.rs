//! Lossy rounding between `Z_q` and `d`-bit integers.
//!
//! ```text
//! Compress_d(x)   = round(2^d / q * x) mod 2^d = floor((x * 2^d + floor(q/2)) / q) mod 2^d
//! Decompress_d(y) = round(q / 2^d * y)         = floor((q * y + 2^(d-1)) / 2^d)
//! ```
//!
//! The widths used by ML-KEM-768 are 1 (message), 4 (`v`), 10 (`u`), plus 5 and 11 for the
//! other parameter sets.  After a round trip a coefficient moves by at most `ceil(q / 2^(d+1))`.

use hybrid_array::{
    ArraySize,
    typenum::{U1, U4, U5, U10, U11},
};

use crate::algebra::{FieldElement, Polynomial, Vector};
use crate::encode::EncodingSize;
use crate::param::Q;
use crate::util::Truncate;

/// The compression widths this crate accepts
pub const SUPPORTED_WIDTHS: [usize; 5] = [1, 4, 5, 10, 11];

const HALF_Q: u32 = (Q as u32) >> 1;

// Algorithm 3 Compress_d
#[allow(clippy::integer_division_remainder_used)]
pub(crate) fn compress(x: u16, d: usize) -> u16 {
    debug_assert!(x < Q);
    debug_assert!(SUPPORTED_WIDTHS.contains(&d));
    let scaled = (u32::from(x) << d) + HALF_Q;
    u16::truncate((scaled / u32::from(Q)) & ((1 << d) - 1))
}

// Algorithm 4 Decompress_d
pub(crate) fn decompress(y: u16, d: usize) -> u16 {
    debug_assert!(u32::from(y) < (1 << d));
    let scaled = u32::from(Q) * u32::from(y) + (1 << (d - 1));
    u16::truncate(scaled >> d)
}

/// A width in [`SUPPORTED_WIDTHS`].  `U12` is an encoding size but not a compression width.
pub(crate) trait CompressionSize: EncodingSize {}

impl CompressionSize for U1 {}
impl CompressionSize for U4 {}
impl CompressionSize for U5 {}
impl CompressionSize for U10 {}
impl CompressionSize for U11 {}

/// Coefficient-wise compression of standard-domain polynomials.
///
/// Callers guarantee that the coefficients passed to `decompress` are below `2^D`, which holds
/// for anything produced by `ByteDecode_D`.  The range-checked entry points are in
/// [`crate::hazmat`].
pub(crate) trait Compress {
    /// Replace every coefficient `x` with `Compress_D(x)`.
    #[must_use]
    fn compress<D: CompressionSize>(&self) -> Self;

    /// Replace every coefficient `y < 2^D` with `Decompress_D(y)`.
    #[must_use]
    fn decompress<D: CompressionSize>(&self) -> Self;
}

impl Compress for Polynomial {
    fn compress<D: CompressionSize>(&self) -> Self {
        Self::new(
            self.0
                .iter()
                .map(|x| FieldElement::new(compress(x.value(), D::USIZE)))
                .collect(),
        )
    }

    fn decompress<D: CompressionSize>(&self) -> Self {
        Self::new(
            self.0
                .iter()
                .map(|y| FieldElement::new(decompress(y.value(), D::USIZE)))
                .collect(),
        )
    }
}

impl<K: ArraySize> Compress for Vector<K> {
    fn compress<D: CompressionSize>(&self) -> Self {
        Self::new(self.0.iter().map(Compress::compress::<D>).collect())
    }

    fn decompress<D: CompressionSize>(&self) -> Self {
        Self::new(self.0.iter().map(Compress::decompress::<D>).collect())
    }
}
