//! K-PKE, the deterministic public-key encryption scheme underneath ML-KEM.
//!
//! Each byte-level algorithm is split into its sampling and serialization steps and a
//! polynomial-level core (`key_gen_inner`, `encrypt_inner`, `decrypt_inner`) that takes the
//! matrix and noise as arguments.  The cores are public so that every composition step can be
//! checked on its own.

use hybrid_array::{
    Array,
    typenum::{U1, U4, U10, U12},
};
use tracing::instrument;

use crate::algebra::{NttMatrix, NttVector, Polynomial, Vector};
use crate::compress::Compress;
use crate::crypto::{G, PRF};
use crate::encode::Encode;
use crate::ntt::{Ntt, NttInverse};
use crate::param::{
    CIPHERTEXT_U_LEN, ENCAPSULATION_KEY_LEN, EncodedCiphertext, EncodedDecryptionKey,
    EncodedEncapsulationKey, K, PKE_DECRYPTION_KEY_LEN, Rank,
};
use crate::sampling::{expand_a, sample_cbd_vector, sample_poly_cbd};
use crate::util::{B32, Truncate};

/// A K-PKE decryption key: the secret vector `s_hat`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionKey {
    s_hat: NttVector<Rank>,
}

/// A K-PKE encryption key: the public vector `t_hat` and the matrix seed `rho`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptionKey {
    t_hat: NttVector<Rank>,
    rho: B32,
}

/// `t_hat = A_hat * NTT(s) + NTT(e)`, reading the matrix by rows.  Returns `(t_hat, s_hat)`.
#[must_use]
pub fn key_gen_inner(
    A_hat: &NttMatrix<Rank>,
    s: &Vector<Rank>,
    e: &Vector<Rank>,
) -> (NttVector<Rank>, NttVector<Rank>) {
    let s_hat = s.ntt();
    let e_hat = e.ntt();
    let t_hat = &(A_hat * &s_hat) + &e_hat;
    (t_hat, s_hat)
}

/// `u = NTT^-1(A_hat^T * NTT(y)) + e1` and `v = NTT^-1(t_hat . NTT(y)) + e2 + mu`, reading the
/// matrix by columns.  Both results are uncompressed.
#[must_use]
pub fn encrypt_inner(
    A_hat: &NttMatrix<Rank>,
    t_hat: &NttVector<Rank>,
    y: &Vector<Rank>,
    e1: &Vector<Rank>,
    e2: &Polynomial,
    mu: &Polynomial,
) -> (Vector<Rank>, Polynomial) {
    let y_hat = y.ntt();
    let u = &A_hat.transpose_mul(&y_hat).ntt_inverse() + e1;
    let v = &(&(t_hat * &y_hat).ntt_inverse() + e2) + mu;
    (u, v)
}

/// `w = v - NTT^-1(s_hat . NTT(u))` for decompressed `u` and `v`.  Compressing `w` to one bit
/// per coefficient recovers the message.
#[must_use]
pub fn decrypt_inner(s_hat: &NttVector<Rank>, u: &Vector<Rank>, v: &Polynomial) -> Polynomial {
    let u_hat = u.ntt();
    v - &(s_hat * &u_hat).ntt_inverse()
}

impl DecryptionKey {
    // Algorithm 13 K-PKE.KeyGen
    /// Deterministically derive a key pair from the seed `d`.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn generate(d: &B32) -> (DecryptionKey, EncryptionKey) {
        let k = u8::truncate(K);
        let (rho, sigma) = G(&[d.as_slice(), &[k]]);

        let A_hat = expand_a(&rho);
        let s = sample_cbd_vector(&sigma, 0);
        let e = sample_cbd_vector(&sigma, k);

        let (t_hat, s_hat) = key_gen_inner(&A_hat, &s, &e);
        (DecryptionKey { s_hat }, EncryptionKey { t_hat, rho })
    }

    // Algorithm 15 K-PKE.Decrypt
    /// Recover the 32-byte message from a ciphertext.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn decrypt(&self, c: &EncodedCiphertext) -> B32 {
        let (u, v) = parse_ciphertext(c);
        let w = decrypt_inner(&self.s_hat, &u, &v);
        Encode::<U1>::encode(&w.compress::<U1>())
    }

    /// The secret vector `s_hat`.
    #[must_use]
    pub fn s_hat(&self) -> &NttVector<Rank> {
        &self.s_hat
    }

    /// `ByteEncode_12(s_hat)`
    #[must_use]
    pub fn as_bytes(&self) -> EncodedDecryptionKey {
        Encode::<U12>::encode(&self.s_hat)
    }

    /// Parse `ByteEncode_12(s_hat)`, reducing each field mod q.
    #[must_use]
    pub fn from_bytes(enc: &EncodedDecryptionKey) -> Self {
        Self {
            s_hat: <NttVector<Rank> as Encode<U12>>::decode(enc),
        }
    }
}

#[cfg(feature = "zeroize")]
impl zeroize::Zeroize for DecryptionKey {
    fn zeroize(&mut self) {
        self.s_hat.zeroize();
    }
}

impl EncryptionKey {
    // Algorithm 14 K-PKE.Encrypt
    /// Encrypt the 32-byte message `m` with the randomness seed `r`.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn encrypt(&self, m: &B32, r: &B32) -> EncodedCiphertext {
        let k = u8::truncate(K);
        let A_hat = expand_a(&self.rho);
        let y = sample_cbd_vector(r, 0);
        let e1 = sample_cbd_vector(r, k);
        let e2 = sample_poly_cbd(&PRF(r, 2 * k));
        let mu = <Polynomial as Encode<U1>>::decode(m).decompress::<U1>();

        let (u, v) = encrypt_inner(&A_hat, &self.t_hat, &y, &e1, &e2, &mu);

        let c1 = Encode::<U10>::encode(&u.compress::<U10>());
        let c2 = Encode::<U4>::encode(&v.compress::<U4>());

        let mut c = EncodedCiphertext::default();
        c[..CIPHERTEXT_U_LEN].copy_from_slice(&c1);
        c[CIPHERTEXT_U_LEN..].copy_from_slice(&c2);
        c
    }

    /// The public vector `t_hat`.
    #[must_use]
    pub fn t_hat(&self) -> &NttVector<Rank> {
        &self.t_hat
    }

    /// The matrix seed `rho`.
    #[must_use]
    pub fn rho(&self) -> &B32 {
        &self.rho
    }

    /// `ByteEncode_12(t_hat) || rho`
    #[must_use]
    pub fn as_bytes(&self) -> EncodedEncapsulationKey {
        let t_hat = Encode::<U12>::encode(&self.t_hat);
        let mut enc = EncodedEncapsulationKey::default();
        enc[..PKE_DECRYPTION_KEY_LEN].copy_from_slice(&t_hat);
        enc[PKE_DECRYPTION_KEY_LEN..].copy_from_slice(&self.rho);
        enc
    }

    /// Parse `ByteEncode_12(t_hat) || rho`, reducing each 12-bit field mod q.
    #[must_use]
    pub fn from_bytes(enc: &EncodedEncapsulationKey) -> Self {
        let t_hat: EncodedDecryptionKey = Array::from_fn(|i| enc[i]);
        let rho: B32 = Array::from_fn(|i| enc[PKE_DECRYPTION_KEY_LEN + i]);
        debug_assert_eq!(PKE_DECRYPTION_KEY_LEN + rho.len(), ENCAPSULATION_KEY_LEN);

        Self {
            t_hat: <NttVector<Rank> as Encode<U12>>::decode(&t_hat),
            rho,
        }
    }
}

/// Split a ciphertext and undo the compression of both parts.
fn parse_ciphertext(c: &EncodedCiphertext) -> (Vector<Rank>, Polynomial) {
    let c1 = Array::from_fn(|i| c[i]);
    let c2 = Array::from_fn(|i| c[CIPHERTEXT_U_LEN + i]);

    let u = <Vector<Rank> as Encode<U10>>::decode(&c1).decompress::<U10>();
    let v = <Polynomial as Encode<U4>>::decode(&c2).decompress::<U4>();
    (u, v)
}

/// K-PKE.KeyGen on bytes: `(ek, dk_pke)`
#[must_use]
pub fn key_gen(d: &B32) -> (EncodedEncapsulationKey, EncodedDecryptionKey) {
    let (dk, ek) = DecryptionKey::generate(d);
    (ek.as_bytes(), dk.as_bytes())
}

/// K-PKE.Encrypt on bytes
#[must_use]
pub fn encrypt(ek: &EncodedEncapsulationKey, m: &B32, r: &B32) -> EncodedCiphertext {
    EncryptionKey::from_bytes(ek).encrypt(m, r)
}

/// K-PKE.Decrypt on bytes
#[must_use]
pub fn decrypt(dk: &EncodedDecryptionKey, c: &EncodedCiphertext) -> B32 {
    DecryptionKey::from_bytes(dk).decrypt(c)
}
