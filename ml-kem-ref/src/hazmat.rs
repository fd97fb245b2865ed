//! Raw-integer access to the individual building blocks.
//!
//! Every function here takes and returns plain coefficients (`u16`, `[u16; 256]`) and bytes, so
//! that an external harness can drive one micro-operation at a time and compare it with a
//! hardware implementation.  Preconditions that the typed API enforces by construction are
//! checked here and reported as [`Error`]s.
//!
//! <div class="warning">
//! These functions bypass the domain separation between standard and NTT-domain polynomials.
//! Prefer the typed API for anything but verification.
//! </div>

use crate::algebra::{self, FieldElement, NttPolynomial, Polynomial};
use crate::arith;
use crate::compress::{self, SUPPORTED_WIDTHS};
use crate::encode;
use crate::error::{Error, Result};
use crate::ntt::{self, Ntt, NttInverse};
use crate::param::{BARRETT_BOUND, CBD_INPUT_LEN, K, N, Q};
use crate::sampling;
use crate::util::{B32, Truncate};

pub use crate::crypto::{HashMode, sponge};
pub use crate::ntt::bitrev7;

/// Selector of [`poly_addsub`]: coefficient-wise addition
pub const POLY_ADD: u8 = 0;

/// Selector of [`poly_addsub`]: coefficient-wise subtraction
pub const POLY_SUB: u8 = 1;

fn element(what: &'static str, x: u16) -> Result<FieldElement> {
    Error::check_range(what, x, Q.into())?;
    Ok(FieldElement::new(x))
}

fn standard(coeffs: &[u16; N]) -> Result<Polynomial> {
    Polynomial::from_coefficients(coeffs)
}

fn ntt_domain(coeffs: &[u16; N]) -> Result<NttPolynomial> {
    NttPolynomial::from_coefficients(coeffs)
}

fn check_width(d: usize, supported: impl Fn(usize) -> bool) -> Result<()> {
    if supported(d) {
        Ok(())
    } else {
        tracing::debug!(d, "rejecting unsupported bit width");
        Err(Error::UnsupportedWidth { d })
    }
}

/// `a mod q`
#[must_use]
pub fn canonical_reduce(a: u32) -> u16 {
    arith::canonical_reduce(a)
}

/// `a - q` if `a >= q`, else `a`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless `a < 2q`.
pub fn cond_sub(a: u32) -> Result<u16> {
    Error::check_range("condSub input", a, 2 * u64::from(Q))?;
    Ok(arith::cond_sub(u16::truncate(a)))
}

/// Correct a 13-bit borrow pattern: `(a + q) & 0xfff` if bit 12 is set, else `a & 0xfff`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless `a < 2^13`.
pub fn cond_add13(a: u16) -> Result<u16> {
    Error::check_range("condAdd13 input", a, 1 << 13)?;
    Ok(arith::cond_add13(a))
}

/// Barrett reduction with `V = 20158` and a shift of 26.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless `a < 77_517_490`.
pub fn barrett_reduce(a: u32) -> Result<u16> {
    Error::check_range("Barrett input", a, BARRETT_BOUND.into())?;
    Ok(arith::barrett_reduce(a))
}

/// `a + b mod q`
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless both operands are canonical.
pub fn mod_add(a: u16, b: u16) -> Result<u16> {
    Ok((element("a", a)? + element("b", b)?).value())
}

/// `a - b mod q`
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless both operands are canonical.
pub fn mod_sub(a: u16, b: u16) -> Result<u16> {
    Ok((element("a", a)? - element("b", b)?).value())
}

/// Entry `k` of the twiddle table, `17^BitRev7(k) mod q`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless `k < 128`.
pub fn zeta(k: usize) -> Result<u16> {
    Error::check_range("twiddle index", u64::try_from(k).unwrap_or(u64::MAX), 128)?;
    Ok(ntt::zeta_table()[k])
}

/// Forward NTT.  The input is reduced mod q on entry.
#[must_use]
pub fn ntt(f: &[u16; N]) -> [u16; N] {
    Polynomial::reduce_from(f).ntt().coefficients()
}

/// Inverse NTT, including the scaling by `128^-1`.  The input is reduced mod q on entry.
#[must_use]
pub fn ntt_inverse(f_hat: &[u16; N]) -> [u16; N] {
    NttPolynomial::reduce_from(f_hat).ntt_inverse().coefficients()
}

/// One Cooley-Tukey butterfly: `(even + zeta * odd, even - zeta * odd)`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all inputs are canonical.
pub fn ntt_butterfly(even: u16, odd: u16, zeta: u16) -> Result<(u16, u16)> {
    let (e, o) = ntt::ntt_butterfly(
        element("even", even)?,
        element("odd", odd)?,
        element("zeta", zeta)?,
    );
    Ok((e.value(), o.value()))
}

/// One Gentleman-Sande butterfly: `(even + odd, zeta * (odd - even))`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all inputs are canonical.
pub fn intt_butterfly(even: u16, odd: u16, zeta: u16) -> Result<(u16, u16)> {
    let (e, o) = ntt::intt_butterfly(
        element("even", even)?,
        element("odd", odd)?,
        element("zeta", zeta)?,
    );
    Ok((e.value(), o.value()))
}

/// `(a0 + a1 X) * (b0 + b1 X) mod (X^2 - zeta)`
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all inputs are canonical.
pub fn base_mul(a0: u16, a1: u16, b0: u16, b1: u16, zeta: u16) -> Result<(u16, u16)> {
    let (c0, c1) = algebra::base_mul(
        element("a0", a0)?,
        element("a1", a1)?,
        element("b0", b0)?,
        element("b1", b1)?,
        element("zeta", zeta)?,
    );
    Ok((c0.value(), c1.value()))
}

/// Coefficient-wise `a + b`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all coefficients are canonical.
pub fn poly_add(a: &[u16; N], b: &[u16; N]) -> Result<[u16; N]> {
    Ok((&standard(a)? + &standard(b)?).coefficients())
}

/// Coefficient-wise `a - b`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all coefficients are canonical.
pub fn poly_sub(a: &[u16; N], b: &[u16; N]) -> Result<[u16; N]> {
    Ok((&standard(a)? - &standard(b)?).coefficients())
}

/// [`poly_add`] for `mode == POLY_ADD`, [`poly_sub`] for `mode == POLY_SUB`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] for any other mode, or if a coefficient is not canonical.
pub fn poly_addsub(mode: u8, a: &[u16; N], b: &[u16; N]) -> Result<[u16; N]> {
    match mode {
        POLY_ADD => poly_add(a, b),
        POLY_SUB => poly_sub(a, b),
        _ => Err(Error::OutOfRange {
            what: "poly_addsub mode",
            value: mode.into(),
            bound: 2,
        }),
    }
}

/// Multiplication of two NTT-domain polynomials.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all coefficients are canonical.
pub fn poly_basemul(a_hat: &[u16; N], b_hat: &[u16; N]) -> Result<[u16; N]> {
    Ok((&ntt_domain(a_hat)? * &ntt_domain(b_hat)?).coefficients())
}

/// Multiplication in `Z_q[X] / (X^256 + 1)` by the schoolbook method.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] unless all coefficients are canonical.
pub fn schoolbook_mul(a: &[u16; N], b: &[u16; N]) -> Result<[u16; N]> {
    Ok(standard(a)?.schoolbook_mul(&standard(b)?).coefficients())
}

/// `ByteEncode_d`: pack 256 values of `d` bits each into `32 * d` bytes.
///
/// # Errors
///
/// Returns [`Error::UnsupportedWidth`] unless `1 <= d <= 12`, and [`Error::OutOfRange`] if a
/// value does not fit in `d` bits (or, for `d = 12`, is not below q).
pub fn byte_encode(d: usize, vals: &[u16; N]) -> Result<Vec<u8>> {
    check_width(d, |d| (1..=12).contains(&d))?;
    let bound = if d == 12 { Q.into() } else { 1u64 << d };
    for &v in vals {
        Error::check_range("encoded value", v, bound)?;
    }

    let mut bytes = vec![0u8; 32 * d];
    encode::byte_encode(d, vals, &mut bytes);
    Ok(bytes)
}

/// `ByteDecode_d`: unpack `32 * d` bytes into 256 values.  For `d = 12` each value is reduced
/// mod q.
///
/// # Errors
///
/// Returns [`Error::UnsupportedWidth`] unless `1 <= d <= 12`, and [`Error::InvalidLength`]
/// unless `bytes` is exactly `32 * d` bytes long.
pub fn byte_decode(d: usize, bytes: &[u8]) -> Result<[u16; N]> {
    check_width(d, |d| (1..=12).contains(&d))?;
    Error::check_length("encoded polynomial", 32 * d, bytes.len())?;

    let mut vals = [0u16; N];
    encode::byte_decode(d, bytes, &mut vals);
    Ok(vals)
}

/// `Compress_d(x)`
///
/// # Errors
///
/// Returns [`Error::UnsupportedWidth`] unless `d` is one of 1, 4, 5, 10, 11, and
/// [`Error::OutOfRange`] unless `x < q`.
pub fn compress(x: u16, d: usize) -> Result<u16> {
    check_width(d, |d| SUPPORTED_WIDTHS.contains(&d))?;
    Error::check_range("compress input", x, Q.into())?;
    Ok(compress::compress(x, d))
}

/// `Decompress_d(y)`
///
/// # Errors
///
/// Returns [`Error::UnsupportedWidth`] unless `d` is one of 1, 4, 5, 10, 11, and
/// [`Error::OutOfRange`] unless `y < 2^d`.
pub fn decompress(y: u16, d: usize) -> Result<u16> {
    check_width(d, |d| SUPPORTED_WIDTHS.contains(&d))?;
    Error::check_range("compressed value", y, 1 << d)?;
    Ok(compress::decompress(y, d))
}

/// `SamplePolyCBD_2` over exactly 128 bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] for any other input length.
pub fn cbd_eta2(bytes: &[u8]) -> Result<[u16; N]> {
    Error::check_length("CBD input", CBD_INPUT_LEN, bytes.len())?;
    Ok(sampling::sample_poly_cbd(bytes).coefficients())
}

/// `SampleNTT(rho || col || row)`
#[must_use]
pub fn sample_ntt(rho: &[u8; 32], col: u8, row: u8) -> [u16; N] {
    sampling::sample_ntt(&B32::from(*rho), col, row).coefficients()
}

/// The matrix `A_hat`, indexed `[row][col]`.
#[must_use]
pub fn expand_a(rho: &[u8; 32]) -> [[[u16; N]; K]; K] {
    let a_hat = sampling::expand_a(&B32::from(*rho));
    core::array::from_fn(|i| core::array::from_fn(|j| a_hat.entry(i, j).coefficients()))
}
