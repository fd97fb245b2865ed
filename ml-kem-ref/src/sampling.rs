use hybrid_array::Array;

use crate::algebra::{FieldElement, NttMatrix, NttPolynomial, NttVector, Polynomial, Vector};
use crate::crypto::{PRF, Xof};
use crate::param::{N, Q, Rank};
use crate::util::{B32, Truncate};

// Algorithm 7 SampleNTT
//
// The XOF is seeded with rho || col || row.  Every three bytes of the stream give two 12-bit
// candidates, and each candidate below q is accepted until the polynomial is full.
pub(crate) fn sample_ntt(rho: &B32, col: u8, row: u8) -> NttPolynomial {
    let mut xof = Xof::default().absorb(rho).absorb(&[col, row]);

    let mut a = NttPolynomial::default();
    let mut j = 0;
    let mut c = [0u8; 3];
    while j < N {
        xof.squeeze(&mut c);
        let d1 = u16::from(c[0]) | (u16::from(c[1] & 0x0f) << 8);
        let d2 = u16::from(c[1] >> 4) | (u16::from(c[2]) << 4);

        if d1 < Q {
            a.0[j] = FieldElement::new(d1);
            j += 1;
        }

        if j < N && d2 < Q {
            a.0[j] = FieldElement::new(d2);
            j += 1;
        }
    }

    a
}

// Algorithm 8 SamplePolyCBD_2
//
// Each byte yields two coefficients, low nibble first.  A nibble with bits b0..b3 maps to
// (b0 + b1) - (b2 + b3).
pub(crate) fn sample_poly_cbd(bytes: &[u8]) -> Polynomial {
    debug_assert_eq!(bytes.len(), crate::param::CBD_INPUT_LEN);

    let nibble = |x: u8| {
        let a = (x & 1) + ((x >> 1) & 1);
        let b = ((x >> 2) & 1) + ((x >> 3) & 1);
        FieldElement::new(a.into()) - FieldElement::new(b.into())
    };

    let mut f = Polynomial::default();
    for (&byte, pair) in bytes.iter().zip(f.0.chunks_exact_mut(2)) {
        pair[0] = nibble(byte & 0x0f);
        pair[1] = nibble(byte >> 4);
    }
    f
}

/// `CBD(PRF(sigma, start + i))` for each of the `k` entries of a vector
pub(crate) fn sample_cbd_vector(sigma: &B32, start: u8) -> Vector<Rank> {
    Vector::new(Array::from_fn(|i| {
        sample_poly_cbd(&PRF(sigma, start + u8::truncate(i)))
    }))
}

// Algorithm 13 lines 3-7
//
// A_hat[i][j] = SampleNTT(rho || j || i): the column index is absorbed first.
pub(crate) fn expand_a(rho: &B32) -> NttMatrix<Rank> {
    NttMatrix::new(Array::from_fn(|i| {
        NttVector::new(Array::from_fn(|j| {
            sample_ntt(rho, u8::truncate(j), u8::truncate(i))
        }))
    }))
}
