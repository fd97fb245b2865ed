use hybrid_array::ArraySize;

use crate::algebra::{FieldElement, NttPolynomial, NttVector, Polynomial, Vector};
use crate::param::{N, N_INV};

// Since the powers of zeta used in the NTT and MultiplyNTTs are fixed, we use a pre-computed
// table to avoid the need to compute the exponentiations at runtime.
//
//   ZETA_POW_BITREV[k] = zeta^{BitRev_7(k)} mod q
//
// Because operator overloading can't be const, the reductions here are done manually with `%`,
// and the loops are `while` loops.
//
// The values computed here match those provided in Appendix A of FIPS 203.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::as_conversions)]
#[allow(clippy::integer_division_remainder_used)]
const ZETA_POW_BITREV: [u16; 128] = {
    const ZETA: u32 = crate::param::ZETA as u32;
    const Q: u32 = crate::param::Q as u32;

    // Compute the powers of zeta
    let mut pow = [0u16; 128];
    let mut i = 0;
    let mut curr = 1u32;
    while i < 128 {
        pow[i] = curr as u16;
        i += 1;
        curr = (curr * ZETA) % Q;
    }

    // Reorder the powers according to bitrev7
    let mut pow_bitrev = [0u16; 128];
    let mut i = 0;
    while i < 128 {
        pow_bitrev[i] = pow[bitrev7(i as u8) as usize];
        i += 1;
    }
    pow_bitrev
};

/// Reverse the low seven bits of `k`.
#[must_use]
pub const fn bitrev7(k: u8) -> u8 {
    (k & 0x7f).reverse_bits() >> 1
}

/// The twiddle factor `zeta^{BitRev_7(k)}`, for `k < 128`.
pub(crate) fn zeta(k: usize) -> FieldElement {
    FieldElement::new(ZETA_POW_BITREV[k])
}

/// The whole twiddle table, in the order the forward transform consumes it.
#[must_use]
pub fn zeta_table() -> &'static [u16; 128] {
    &ZETA_POW_BITREV
}

/// Cooley-Tukey butterfly: `(even + zeta * odd, even - zeta * odd)`.
#[must_use]
pub fn ntt_butterfly(
    even: FieldElement,
    odd: FieldElement,
    zeta: FieldElement,
) -> (FieldElement, FieldElement) {
    let t = zeta * odd;
    (even + t, even - t)
}

/// Gentleman-Sande butterfly: `(even + odd, zeta * (odd - even))`.
#[must_use]
pub fn intt_butterfly(
    even: FieldElement,
    odd: FieldElement,
    zeta: FieldElement,
) -> (FieldElement, FieldElement) {
    (even + odd, zeta * (odd - even))
}

/// Conversion from the standard domain into the NTT domain
pub trait Ntt {
    /// The NTT-domain counterpart of `Self`
    type Output;

    /// Apply the forward transform.
    fn ntt(&self) -> Self::Output;
}

/// One forward layer.  The twiddle index advances once per block of `2 * LEN` coefficients,
/// not once per butterfly.
#[allow(clippy::inline_always)]
#[inline(always)]
fn ntt_layer<const LEN: usize, const ITERATIONS: usize>(w: &mut [FieldElement; N], k: &mut usize) {
    for i in 0..ITERATIONS {
        let start = i * 2 * LEN;
        let z = zeta(*k);
        *k += 1;
        for j in start..(start + LEN) {
            (w[j], w[j + LEN]) = ntt_butterfly(w[j], w[j + LEN], z);
        }
    }
}

impl Ntt for Polynomial {
    type Output = NttPolynomial;

    // Algorithm 9 NTT
    fn ntt(&self) -> Self::Output {
        let mut w: [FieldElement; N] = self.0.clone().into();
        let mut k = 1;

        ntt_layer::<128, 1>(&mut w, &mut k);
        ntt_layer::<64, 2>(&mut w, &mut k);
        ntt_layer::<32, 4>(&mut w, &mut k);
        ntt_layer::<16, 8>(&mut w, &mut k);
        ntt_layer::<8, 16>(&mut w, &mut k);
        ntt_layer::<4, 32>(&mut w, &mut k);
        ntt_layer::<2, 64>(&mut w, &mut k);

        debug_assert_eq!(k, 128);
        NttPolynomial::new(w.into())
    }
}

impl<K: ArraySize> Ntt for Vector<K> {
    type Output = NttVector<K>;

    fn ntt(&self) -> Self::Output {
        NttVector::new(self.0.iter().map(Polynomial::ntt).collect())
    }
}

/// Conversion from the NTT domain back into the standard domain
#[allow(clippy::module_name_repetitions)]
pub trait NttInverse {
    /// The standard-domain counterpart of `Self`
    type Output;

    /// Apply the inverse transform, including the final scaling by `128^-1`.
    fn ntt_inverse(&self) -> Self::Output;
}

#[allow(clippy::inline_always)]
#[inline(always)]
fn ntt_inverse_layer<const LEN: usize, const ITERATIONS: usize>(
    w: &mut [FieldElement; N],
    k: &mut usize,
) {
    for i in 0..ITERATIONS {
        let start = i * 2 * LEN;
        let z = zeta(*k);
        *k -= 1;
        for j in start..(start + LEN) {
            (w[j], w[j + LEN]) = intt_butterfly(w[j], w[j + LEN], z);
        }
    }
}

impl NttInverse for NttPolynomial {
    type Output = Polynomial;

    // Algorithm 10 NTT^{-1}
    fn ntt_inverse(&self) -> Self::Output {
        const INVERSE_128: FieldElement = FieldElement::new(N_INV);

        let mut w: [FieldElement; N] = self.0.clone().into();
        let mut k = 127;

        ntt_inverse_layer::<2, 64>(&mut w, &mut k);
        ntt_inverse_layer::<4, 32>(&mut w, &mut k);
        ntt_inverse_layer::<8, 16>(&mut w, &mut k);
        ntt_inverse_layer::<16, 8>(&mut w, &mut k);
        ntt_inverse_layer::<32, 4>(&mut w, &mut k);
        ntt_inverse_layer::<64, 2>(&mut w, &mut k);
        ntt_inverse_layer::<128, 1>(&mut w, &mut k);

        debug_assert_eq!(k, 0);
        INVERSE_128 * &Polynomial::new(w.into())
    }
}

impl<K: ArraySize> NttInverse for NttVector<K> {
    type Output = Vector<K>;

    fn ntt_inverse(&self) -> Self::Output {
        Vector::new(self.0.iter().map(NttPolynomial::ntt_inverse).collect())
    }
}

#[cfg(test)]
#[allow(clippy::as_conversions)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::integer_division_remainder_used)]
mod test {
    use super::*;
    use crate::param::Q;
    use hybrid_array::Array;

    fn pow_mod(base: u32, mut exp: u32) -> u32 {
        let q = u32::from(Q);
        let mut acc = 1u32;
        let mut b = base % q;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc * b % q;
            }
            b = b * b % q;
            exp >>= 1;
        }
        acc
    }

    #[test]
    fn bitrev() {
        assert_eq!(bitrev7(0), 0);
        assert_eq!(bitrev7(1), 64);
        assert_eq!(bitrev7(64), 1);
        assert_eq!(bitrev7(127), 127);
        for k in 0..128u8 {
            assert_eq!(bitrev7(bitrev7(k)), k);
        }
    }

    #[test]
    fn twiddle_table() {
        assert_eq!(pow_mod(17, 256), 1);
        assert_ne!(pow_mod(17, 128), 1);

        let table = zeta_table();
        assert_eq!(table[0], 1);
        assert_eq!(table[1], 1729);
        assert_eq!(table[2], 2580);
        assert_eq!(table[127], 2154);
        for (k, &z) in table.iter().enumerate() {
            assert_eq!(u32::from(z), pow_mod(17, u32::from(bitrev7(k as u8))));
        }
    }

    #[test]
    fn butterflies() {
        let e = FieldElement::new(5);
        let o = FieldElement::new(7);
        let z = FieldElement::new(1729);
        let (e1, o1) = ntt_butterfly(e, o, z);
        let t = (7 * 1729) % u32::from(Q);
        assert_eq!(u32::from(e1.value()), (5 + t) % u32::from(Q));
        assert_eq!(u32::from(o1.value()), (5 + u32::from(Q) - t) % u32::from(Q));

        // With 1729^2 = -1 the inverse butterfly undoes the forward one up to a factor of two
        let (e2, o2) = intt_butterfly(e1, o1, z);
        let two = FieldElement::new(2);
        assert_eq!(e2, two * e);
        assert_eq!(o2, two * o);
    }

    #[test]
    fn ntt_of_zero_and_unit() {
        assert_eq!(Polynomial::default().ntt(), NttPolynomial::default());

        let mut one = Polynomial::default();
        one.0[0] = FieldElement::ONE;
        let one_hat = one.ntt();
        for (i, c) in one_hat.0.iter().enumerate() {
            let expected = if i % 2 == 0 { 1 } else { 0 };
            assert_eq!(c.value(), expected);
        }
    }

    #[test]
    fn ntt() {
        let f = Polynomial::new(Array::from_fn(|i| FieldElement::new(i as u16)));
        let g = Polynomial::new(Array::from_fn(|i| FieldElement::new((2 * i) as u16)));
        let f_hat = f.ntt();
        let g_hat = g.ntt();

        // Verify that NTT and NTT^-1 are actually inverses
        assert_eq!(f_hat.ntt_inverse(), f);
        assert_eq!(NttPolynomial::new(f.0.clone()).ntt_inverse().ntt().0, f.0);

        // Verify that NTT is a homomorphism with regard to addition
        let fg = &f + &g;
        assert_eq!((&f_hat + &g_hat).ntt_inverse(), fg);

        // Verify that NTT is a homomorphism with regard to multiplication
        let fg = f.schoolbook_mul(&g);
        assert_eq!((&f_hat * &g_hat).ntt_inverse(), fg);
    }

    #[test]
    fn ntt_extremes() {
        let max = Polynomial::new(Array::from_fn(|_| FieldElement::new(Q - 1)));
        assert_eq!(max.ntt().ntt_inverse(), max);

        let max_hat = NttPolynomial::new(max.0.clone());
        assert_eq!(max_hat.ntt_inverse().ntt(), max_hat);
    }
}
