use core::ops::{Add, Mul, Neg, Sub};
use hybrid_array::{Array, ArraySize, typenum::U256};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

use crate::arith::{barrett_reduce, canonical_reduce, mod_add, mod_mul, mod_sub};
use crate::error::{Error, Result};
use crate::ntt::zeta;
use crate::param::{N, Q};

/// An element of `Z_q`, always held in canonical form `[0, q)`.  The overloaded operators use
/// the reduction primitives of the `arith` module, so the results agree bit for bit with the
/// hardware datapath: conditional subtraction for addition, the 13-bit borrow correction for
/// subtraction, and Barrett reduction for multiplication.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct FieldElement(u16);

impl FieldElement {
    /// The additive identity
    pub const ZERO: Self = Self(0);

    /// The multiplicative identity
    pub const ONE: Self = Self(1);

    pub(crate) const fn new(x: u16) -> Self {
        debug_assert!(x < Q);
        Self(x)
    }

    /// Wrap a canonical value, failing if `x >= q`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `x` is not canonical.
    pub fn try_new(x: u16) -> Result<Self> {
        Error::check_range("coefficient", x, Q.into())?;
        Ok(Self(x))
    }

    /// Reduce an arbitrary value into the field.
    #[must_use]
    pub fn reduce(x: u32) -> Self {
        Self(canonical_reduce(x))
    }

    /// The canonical representative of this element.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        FieldElement(mod_sub(0, self.0))
    }
}

impl Add<FieldElement> for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        FieldElement(mod_add(self.0, rhs.0))
    }
}

impl Sub<FieldElement> for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        FieldElement(mod_sub(self.0, rhs.0))
    }
}

impl Mul<FieldElement> for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        FieldElement(mod_mul(self.0, rhs.0))
    }
}

/// Implements the coefficient-level plumbing shared by the two polynomial domains.  The domains
/// get separate types so that a standard-domain polynomial can never be passed where an
/// NTT-domain one is expected; the macro only shares the code, not the type.
macro_rules! define_polynomial {
    ($name:ident) => {
        impl $name {
            pub(crate) const fn new(x: Array<FieldElement, U256>) -> Self {
                Self(x)
            }

            /// Build a polynomial from canonical coefficients.
            ///
            /// # Errors
            ///
            /// Returns [`Error::OutOfRange`] if any coefficient is `>= q`.
            pub fn from_coefficients(coeffs: &[u16; N]) -> Result<Self> {
                let mut out = Self::default();
                for (o, &c) in out.0.iter_mut().zip(coeffs.iter()) {
                    *o = FieldElement::try_new(c)?;
                }
                Ok(out)
            }

            /// Build a polynomial by reducing every coefficient mod q.
            #[must_use]
            pub fn reduce_from(coeffs: &[u16; N]) -> Self {
                Self(Array::from_fn(|i| FieldElement::reduce(coeffs[i].into())))
            }

            /// The canonical coefficients of this polynomial.
            #[must_use]
            pub fn coefficients(&self) -> [u16; N] {
                core::array::from_fn(|i| self.0[i].value())
            }

            /// The coefficients as field elements.
            #[must_use]
            pub fn as_elements(&self) -> &[FieldElement] {
                &self.0
            }
        }

        #[cfg(feature = "zeroize")]
        impl Zeroize for $name {
            fn zeroize(&mut self) {
                self.0.zeroize();
            }
        }

        impl Add<&$name> for &$name {
            type Output = $name;

            fn add(self, rhs: &$name) -> $name {
                $name(
                    self.0
                        .iter()
                        .zip(rhs.0.iter())
                        .map(|(&x, &y)| x + y)
                        .collect(),
                )
            }
        }

        impl Sub<&$name> for &$name {
            type Output = $name;

            fn sub(self, rhs: &$name) -> $name {
                $name(
                    self.0
                        .iter()
                        .zip(rhs.0.iter())
                        .map(|(&x, &y)| x - y)
                        .collect(),
                )
            }
        }

        impl Mul<&$name> for FieldElement {
            type Output = $name;

            fn mul(self, rhs: &$name) -> $name {
                $name(rhs.0.iter().map(|&x| self * x).collect())
            }
        }

        impl Neg for &$name {
            type Output = $name;

            fn neg(self) -> $name {
                $name(self.0.iter().map(|&x| -x).collect())
            }
        }
    };
}

/// A `Polynomial` is a member of the ring `R_q = Z_q[X] / (X^256 + 1)`, in the standard
/// (coefficient) domain.  Polynomials can be added, subtracted, negated, and multiplied by field
/// elements.  Ring multiplication is only provided as [`Polynomial::schoolbook_mul`]; fast
/// multiplication goes through the NTT.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Polynomial(pub(crate) Array<FieldElement, U256>);

define_polynomial!(Polynomial);

impl Polynomial {
    /// Multiplication in `R_q` by the O(n^2) schoolbook method, with the reduction `X^256 = -1`.
    #[must_use]
    pub fn schoolbook_mul(&self, rhs: &Polynomial) -> Polynomial {
        let mut out = Polynomial::default();
        for (i, &x) in self.0.iter().enumerate() {
            for (j, &y) in rhs.0.iter().enumerate() {
                let xy = x * y;
                if i + j < N {
                    out.0[i + j] = out.0[i + j] + xy;
                } else {
                    out.0[i + j - N] = out.0[i + j - N] - xy;
                }
            }
        }
        out
    }
}

/// An `NttPolynomial` is a member of the NTT algebra `T_q`, the image of `R_q` under the NTT:
/// 128 degree-one residues modulo `X^2 - zeta^(2 BitRev7(i) + 1)`, stored as 256 coefficients.
/// NTT polynomials can be added, subtracted, negated, and multiplied with each other, the last
/// through [`NttPolynomial::basemul`].
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct NttPolynomial(pub(crate) Array<FieldElement, U256>);

define_polynomial!(NttPolynomial);

// Algorithm 12 BaseCaseMultiply
//
// The partial products are accumulated before the reduction; every Barrett input stays below
// 2 q^2.
/// Multiplication in `Z_q[X] / (X^2 - zeta)`: `(a0 + a1 X) * (b0 + b1 X)`
#[must_use]
pub fn base_mul(
    a0: FieldElement,
    a1: FieldElement,
    b0: FieldElement,
    b1: FieldElement,
    zeta: FieldElement,
) -> (FieldElement, FieldElement) {
    let (a0, a1, b0, b1) = (
        u32::from(a0.0),
        u32::from(a1.0),
        u32::from(b0.0),
        u32::from(b1.0),
    );

    let a1b1 = u32::from(barrett_reduce(a1 * b1));
    let c0 = barrett_reduce(a0 * b0 + a1b1 * u32::from(zeta.0));
    let c1 = barrett_reduce(a0 * b1 + a1 * b0);
    (FieldElement(c0), FieldElement(c1))
}

impl NttPolynomial {
    /// Algorithm 11 `MultiplyNTTs`
    ///
    /// The coefficients are processed in 64 groups of four.  Each group holds two residues whose
    /// moduli use opposite roots: `zeta_(64 + i)` for the first and `-zeta_(64 + i)` for the second.
    #[must_use]
    pub fn basemul(&self, rhs: &NttPolynomial) -> NttPolynomial {
        let mut out = NttPolynomial::default();
        let groups = self.0.chunks_exact(4).zip(rhs.0.chunks_exact(4));
        for (i, ((a, b), c)) in groups.zip(out.0.chunks_exact_mut(4)).enumerate() {
            let z = zeta(64 + i);
            let (c0, c1) = base_mul(a[0], a[1], b[0], b[1], z);
            let (c2, c3) = base_mul(a[2], a[3], b[2], b[3], -z);
            c.copy_from_slice(&[c0, c1, c2, c3]);
        }
        out
    }
}

impl Mul<&NttPolynomial> for &NttPolynomial {
    type Output = NttPolynomial;

    fn mul(self, rhs: &NttPolynomial) -> NttPolynomial {
        self.basemul(rhs)
    }
}

/// A `Vector` is a vector of `K` polynomials from `R_q`.  Vectors can be added and subtracted.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Vector<K: ArraySize>(pub(crate) Array<Polynomial, K>);

impl<K: ArraySize> Vector<K> {
    pub(crate) const fn new(x: Array<Polynomial, K>) -> Self {
        Self(x)
    }

    /// The polynomials of this vector.
    #[must_use]
    pub fn polynomials(&self) -> &[Polynomial] {
        &self.0
    }
}

#[cfg(feature = "zeroize")]
impl<K: ArraySize> Zeroize for Vector<K> {
    fn zeroize(&mut self) {
        self.0.iter_mut().for_each(Zeroize::zeroize);
    }
}

impl<K: ArraySize> Add<&Vector<K>> for &Vector<K> {
    type Output = Vector<K>;

    fn add(self, rhs: &Vector<K>) -> Vector<K> {
        Vector(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(x, y)| x + y)
                .collect(),
        )
    }
}

impl<K: ArraySize> Sub<&Vector<K>> for &Vector<K> {
    type Output = Vector<K>;

    fn sub(self, rhs: &Vector<K>) -> Vector<K> {
        Vector(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(x, y)| x - y)
                .collect(),
        )
    }
}

/// An `NttVector` is a vector of `K` polynomials from `T_q`.  NTT vectors can be added, and
/// "multiplied" with each other to produce a dot product.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct NttVector<K: ArraySize>(pub(crate) Array<NttPolynomial, K>);

impl<K: ArraySize> NttVector<K> {
    pub(crate) const fn new(x: Array<NttPolynomial, K>) -> Self {
        Self(x)
    }

    /// The polynomials of this vector.
    #[must_use]
    pub fn polynomials(&self) -> &[NttPolynomial] {
        &self.0
    }
}

#[cfg(feature = "zeroize")]
impl<K: ArraySize> Zeroize for NttVector<K> {
    fn zeroize(&mut self) {
        self.0.iter_mut().for_each(Zeroize::zeroize);
    }
}

impl<K: ArraySize> Add<&NttVector<K>> for &NttVector<K> {
    type Output = NttVector<K>;

    fn add(self, rhs: &NttVector<K>) -> NttVector<K> {
        NttVector(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(x, y)| x + y)
                .collect(),
        )
    }
}

impl<K: ArraySize> Mul<&NttVector<K>> for &NttVector<K> {
    type Output = NttPolynomial;

    fn mul(self, rhs: &NttVector<K>) -> NttPolynomial {
        self.0
            .iter()
            .zip(rhs.0.iter())
            .map(|(x, y)| x * y)
            .fold(NttPolynomial::default(), |x, y| &x + &y)
    }
}

/// A square `K x K` matrix of NTT-domain polynomials, stored by rows.
///
/// Key generation multiplies by the matrix and encryption by its transpose.  Both read the same
/// storage: [`NttMatrix::row_dot`] walks `A[i][j]` over `j` and [`NttMatrix::col_dot`] walks
/// `A[j][i]` over `j`.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct NttMatrix<K: ArraySize>(pub(crate) Array<NttVector<K>, K>);

impl<K: ArraySize> NttMatrix<K> {
    pub(crate) const fn new(x: Array<NttVector<K>, K>) -> Self {
        Self(x)
    }

    /// The entry `A[row][col]`.
    #[must_use]
    pub fn entry(&self, row: usize, col: usize) -> &NttPolynomial {
        &self.0[row].0[col]
    }

    /// `sum_j A[i][j] * v[j]`
    #[must_use]
    pub fn row_dot(&self, i: usize, v: &NttVector<K>) -> NttPolynomial {
        &self.0[i] * v
    }

    /// `sum_j A[j][i] * v[j]`
    #[must_use]
    pub fn col_dot(&self, i: usize, v: &NttVector<K>) -> NttPolynomial {
        self.0
            .iter()
            .zip(v.0.iter())
            .map(|(row, vj)| &row.0[i] * vj)
            .fold(NttPolynomial::default(), |x, y| &x + &y)
    }

    /// `A^T * v`
    #[must_use]
    pub fn transpose_mul(&self, v: &NttVector<K>) -> NttVector<K> {
        NttVector(Array::from_fn(|i| self.col_dot(i, v)))
    }
}

impl<K: ArraySize> Mul<&NttVector<K>> for &NttMatrix<K> {
    type Output = NttVector<K>;

    fn mul(self, rhs: &NttVector<K>) -> NttVector<K> {
        NttVector(Array::from_fn(|i| self.row_dot(i, rhs)))
    }
}
