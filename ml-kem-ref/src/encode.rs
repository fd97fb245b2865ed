use core::ops::Mul;
use hybrid_array::{
    Array, ArraySize,
    typenum::{
        Prod, U1, U4, U5, U10, U11, U12, U32, U128, U160, U256, U320, U352, U384, Unsigned,
    },
};

use crate::algebra::{FieldElement, NttPolynomial, NttVector, Polynomial, Vector};
use crate::arith::canonical_reduce;
use crate::param::N;
use crate::util::Truncate;

/// A bit width at which polynomials can be encoded, with the size of the encoding
pub(crate) trait EncodingSize: ArraySize {
    /// `32 * D` bytes
    type EncodedPolynomialSize: ArraySize;
}

macro_rules! define_encoding_size {
    ($($d:ident => $size:ident),* $(,)?) => {
        $(
            impl EncodingSize for $d {
                type EncodedPolynomialSize = $size;
            }
        )*
    };
}

define_encoding_size! {
    U1 => U32,
    U4 => U128,
    U5 => U160,
    U10 => U320,
    U11 => U352,
    U12 => U384,
}

pub(crate) type EncodedPolynomial<D> = Array<u8, <D as EncodingSize>::EncodedPolynomialSize>;

/// Values and bytes per packing unit: `lcm(d, 8)` bits hold `8 / gcd(d, 8)` values in
/// `d / gcd(d, 8)` bytes.  The largest unit (d = 11) is 88 bits, so one `u128` always suffices.
fn packing_steps(d: usize) -> (usize, usize) {
    let tz = d.trailing_zeros().min(3);
    (8 >> tz, d >> tz)
}

// Algorithm 5 ByteEncode_d
//
// Each value occupies `d` bits, least significant bit first, with no padding between values.
pub(crate) fn byte_encode(d: usize, vals: &[u16; N], bytes: &mut [u8]) {
    debug_assert!((1..=12).contains(&d));
    debug_assert_eq!(bytes.len(), 32 * d);
    let (val_step, byte_step) = packing_steps(d);

    for (v, b) in vals.chunks(val_step).zip(bytes.chunks_mut(byte_step)) {
        let mut x = 0u128;
        for (j, &vj) in v.iter().enumerate() {
            debug_assert!(u32::from(vj) < (1 << d));
            x |= u128::from(vj) << (d * j);
        }

        let xb = x.to_le_bytes();
        b.copy_from_slice(&xb[..byte_step]);
    }
}

// Algorithm 6 ByteDecode_d
//
// For d = 12 a field can hold values up to 4095, which are reduced mod q.
pub(crate) fn byte_decode(d: usize, bytes: &[u8], vals: &mut [u16; N]) {
    debug_assert!((1..=12).contains(&d));
    debug_assert_eq!(bytes.len(), 32 * d);
    let (val_step, byte_step) = packing_steps(d);
    let mask = (1u16 << d) - 1;

    for (v, b) in vals.chunks_mut(val_step).zip(bytes.chunks(byte_step)) {
        let mut xb = [0u8; 16];
        xb[..byte_step].copy_from_slice(b);

        let x = u128::from_le_bytes(xb);
        for (j, vj) in v.iter_mut().enumerate() {
            *vj = u16::truncate(x >> (d * j)) & mask;

            if d == 12 {
                *vj = canonical_reduce((*vj).into());
            }
        }
    }
}

/// Whether every 12-bit field of `bytes` already encodes a value below q
pub(crate) fn is_canonical_12(bytes: &[u8]) -> bool {
    bytes.chunks_exact(3).all(|b| {
        let d1 = u16::from(b[0]) | (u16::from(b[1] & 0x0f) << 8);
        let d2 = u16::from(b[1] >> 4) | (u16::from(b[2]) << 4);
        d1 < crate::param::Q && d2 < crate::param::Q
    })
}

fn encode_elements<D: EncodingSize>(elems: &[FieldElement]) -> EncodedPolynomial<D> {
    let vals: [u16; N] = core::array::from_fn(|i| elems[i].value());
    let mut bytes = EncodedPolynomial::<D>::default();
    byte_encode(D::USIZE, &vals, &mut bytes);
    bytes
}

fn decode_elements<D: EncodingSize>(bytes: &[u8]) -> Array<FieldElement, U256> {
    let mut vals = [0u16; N];
    byte_decode(D::USIZE, bytes, &mut vals);
    Array::from_fn(|i| FieldElement::new(vals[i]))
}

/// Fixed-width serialization of polynomials and vectors of polynomials.
///
/// Only values already known to fit in `D` bits are encoded through this trait: compressed
/// coefficients, and canonical coefficients at `D = 12`.  Raw packing of caller-supplied values
/// goes through [`crate::hazmat::byte_encode`], which checks the range.
pub(crate) trait Encode<D: EncodingSize> {
    /// The size of the encoding
    type EncodedSize: ArraySize;

    /// Pack the coefficients, which must be below `2^D`.
    fn encode(&self) -> Array<u8, Self::EncodedSize>;

    /// Unpack an encoding.
    fn decode(enc: &Array<u8, Self::EncodedSize>) -> Self;
}

impl<D: EncodingSize> Encode<D> for Polynomial {
    type EncodedSize = D::EncodedPolynomialSize;

    fn encode(&self) -> Array<u8, Self::EncodedSize> {
        encode_elements::<D>(&self.0)
    }

    fn decode(enc: &Array<u8, Self::EncodedSize>) -> Self {
        Self::new(decode_elements::<D>(enc))
    }
}

impl<D: EncodingSize> Encode<D> for NttPolynomial {
    type EncodedSize = D::EncodedPolynomialSize;

    fn encode(&self) -> Array<u8, Self::EncodedSize> {
        encode_elements::<D>(&self.0)
    }

    fn decode(enc: &Array<u8, Self::EncodedSize>) -> Self {
        Self::new(decode_elements::<D>(enc))
    }
}

impl<D, K> Encode<D> for Vector<K>
where
    D: EncodingSize,
    K: ArraySize,
    D::EncodedPolynomialSize: Mul<K>,
    Prod<D::EncodedPolynomialSize, K>: ArraySize,
{
    type EncodedSize = Prod<D::EncodedPolynomialSize, K>;

    fn encode(&self) -> Array<u8, Self::EncodedSize> {
        let mut out = Array::<u8, Self::EncodedSize>::default();
        let step = D::EncodedPolynomialSize::USIZE;
        for (p, chunk) in self.0.iter().zip(out.chunks_exact_mut(step)) {
            chunk.copy_from_slice(&Encode::<D>::encode(p));
        }
        out
    }

    fn decode(enc: &Array<u8, Self::EncodedSize>) -> Self {
        let step = D::EncodedPolynomialSize::USIZE;
        Self::new(Array::from_fn(|i| {
            Polynomial::new(decode_elements::<D>(&enc[i * step..(i + 1) * step]))
        }))
    }
}

impl<D, K> Encode<D> for NttVector<K>
where
    D: EncodingSize,
    K: ArraySize,
    D::EncodedPolynomialSize: Mul<K>,
    Prod<D::EncodedPolynomialSize, K>: ArraySize,
{
    type EncodedSize = Prod<D::EncodedPolynomialSize, K>;

    fn encode(&self) -> Array<u8, Self::EncodedSize> {
        let mut out = Array::<u8, Self::EncodedSize>::default();
        let step = D::EncodedPolynomialSize::USIZE;
        for (p, chunk) in self.0.iter().zip(out.chunks_exact_mut(step)) {
            chunk.copy_from_slice(&Encode::<D>::encode(p));
        }
        out
    }

    fn decode(enc: &Array<u8, Self::EncodedSize>) -> Self {
        let step = D::EncodedPolynomialSize::USIZE;
        Self::new(Array::from_fn(|i| {
            NttPolynomial::new(decode_elements::<D>(&enc[i * step..(i + 1) * step]))
        }))
    }
}
