//! ML-KEM-768 key generation, encapsulation, and decapsulation.
//!
//! Decapsulation applies the Fujisaki-Okamoto transform with implicit rejection: a ciphertext
//! that does not re-encrypt to itself yields the pseudorandom key `J(z || c)` instead of an error.

use hybrid_array::Array;
use subtle::{ConditionallySelectable, ConstantTimeEq};
use tracing::instrument;

#[cfg(feature = "rand_core")]
use rand_core::CryptoRng;

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{G, H, J};
use crate::encode::is_canonical_12;
use crate::error::{Error, Result};
use crate::param::{
    CIPHERTEXT_LEN, DECAPSULATION_KEY_LEN, ENCAPSULATION_KEY_LEN, EncodedCiphertext,
    EncodedDecapsulationKey, EncodedDecryptionKey, EncodedEncapsulationKey,
    PKE_DECRYPTION_KEY_LEN, SEED_LEN,
};
use crate::pke::{DecryptionKey, EncryptionKey};
use crate::util::B32;

/// An ML-KEM-768 ciphertext
pub type Ciphertext = EncodedCiphertext;

/// The 32-byte shared secret produced by encapsulation and decapsulation
pub type SharedKey = B32;

/// Copy a buffer whose length has already been checked into a fixed-size array.
fn to_array<N: hybrid_array::ArraySize>(bytes: &[u8]) -> Array<u8, N> {
    debug_assert_eq!(bytes.len(), N::USIZE);
    Array::from_fn(|i| bytes[i])
}

/// An ML-KEM-768 encapsulation key, together with its hash `H(ek)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncapsulationKey {
    ek_pke: EncryptionKey,
    h: B32,
}

impl EncapsulationKey {
    fn new(ek_pke: EncryptionKey) -> Self {
        let h = H(&ek_pke.as_bytes());
        Self { ek_pke, h }
    }

    /// Parse an encoded encapsulation key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] unless `bytes` is exactly 1184 bytes long, and
    /// [`Error::NonCanonicalKey`] if any 12-bit field of `t_hat` holds a value `>= q`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Error::check_length("encapsulation key", ENCAPSULATION_KEY_LEN, bytes.len())?;
        if !is_canonical_12(&bytes[..PKE_DECRYPTION_KEY_LEN]) {
            tracing::debug!("rejecting encapsulation key with non-canonical coefficients");
            return Err(Error::NonCanonicalKey);
        }

        let enc: EncodedEncapsulationKey = to_array(bytes);
        Ok(Self {
            ek_pke: EncryptionKey::from_bytes(&enc),
            h: H(bytes),
        })
    }

    /// `ByteEncode_12(t_hat) || rho`
    #[must_use]
    pub fn as_bytes(&self) -> EncodedEncapsulationKey {
        self.ek_pke.as_bytes()
    }

    /// The underlying K-PKE encryption key.
    #[must_use]
    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.ek_pke
    }

    /// `H(ek)`
    #[must_use]
    pub fn h(&self) -> &B32 {
        &self.h
    }

    // Algorithm 17 ML-KEM.Encaps_internal
    /// Encapsulate a shared key using the caller-provided 32-byte message `m`.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn encapsulate_deterministic(&self, m: &B32) -> (Ciphertext, SharedKey) {
        let (K, r) = G(&[m.as_slice(), self.h.as_slice()]);
        let c = self.ek_pke.encrypt(m, &r);
        (c, K)
    }

    /// Encapsulate a shared key, drawing the message from `rng`.
    #[cfg(feature = "rand_core")]
    pub fn encapsulate<R: CryptoRng + ?Sized>(&self, rng: &mut R) -> (Ciphertext, SharedKey) {
        let mut m = B32::default();
        rng.fill_bytes(&mut m);
        let out = self.encapsulate_deterministic(&m);

        #[cfg(feature = "zeroize")]
        m.zeroize();

        out
    }
}

/// An ML-KEM-768 decapsulation key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecapsulationKey {
    dk_pke: DecryptionKey,
    ek: EncapsulationKey,
    z: B32,
}

impl DecapsulationKey {
    // Algorithm 16 ML-KEM.KeyGen_internal
    /// Deterministically derive a decapsulation key from the seeds `d` and `z`.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn generate_deterministic(d: &B32, z: &B32) -> Self {
        let (dk_pke, ek_pke) = DecryptionKey::generate(d);
        Self {
            dk_pke,
            ek: EncapsulationKey::new(ek_pke),
            z: z.clone(),
        }
    }

    /// Parse an encoded decapsulation key `dk_pke || ek || H(ek) || z`.  The fields are taken
    /// positionally; the stored hash is used as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] unless `bytes` is exactly 2400 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Error::check_length("decapsulation key", DECAPSULATION_KEY_LEN, bytes.len())?;

        let (dk_pke, rest) = bytes.split_at(PKE_DECRYPTION_KEY_LEN);
        let (ek, rest) = rest.split_at(ENCAPSULATION_KEY_LEN);
        let (h, z) = rest.split_at(SEED_LEN);

        let dk_pke: EncodedDecryptionKey = to_array(dk_pke);
        let ek: EncodedEncapsulationKey = to_array(ek);
        Ok(Self {
            dk_pke: DecryptionKey::from_bytes(&dk_pke),
            ek: EncapsulationKey {
                ek_pke: EncryptionKey::from_bytes(&ek),
                h: to_array(h),
            },
            z: to_array(z),
        })
    }

    /// `dk_pke || ek || H(ek) || z`
    #[must_use]
    pub fn as_bytes(&self) -> EncodedDecapsulationKey {
        let parts = [
            self.dk_pke.as_bytes().as_slice(),
            self.ek.as_bytes().as_slice(),
            self.ek.h.as_slice(),
            self.z.as_slice(),
        ]
        .concat();
        to_array(&parts)
    }

    /// The encapsulation key that pairs with this key.
    #[must_use]
    pub fn encapsulation_key(&self) -> &EncapsulationKey {
        &self.ek
    }

    // Algorithm 18 ML-KEM.Decaps_internal
    /// Recover the shared key from a ciphertext.  Both candidate keys are always computed, and
    /// the result is selected without branching on the re-encryption check.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn decapsulate(&self, c: &Ciphertext) -> SharedKey {
        let mp = self.dk_pke.decrypt(c);
        let (Kp, rp) = G(&[mp.as_slice(), self.ek.h.as_slice()]);
        let K_bar = J(&[self.z.as_slice(), c.as_slice()]);
        let cp = self.ek.ek_pke.encrypt(&mp, &rp);

        let equal = cp.as_slice().ct_eq(c.as_slice());
        Array::from_fn(|i| u8::conditional_select(&K_bar[i], &Kp[i], equal))
    }
}

#[cfg(feature = "zeroize")]
impl Drop for DecapsulationKey {
    fn drop(&mut self) {
        self.dk_pke.zeroize();
        self.z.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for DecapsulationKey {}

/// An ML-KEM-768 key pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    dk: DecapsulationKey,
}

impl KeyPair {
    /// Deterministically derive a key pair from the seeds `d` and `z`.
    #[must_use]
    pub fn from_seed(d: &B32, z: &B32) -> Self {
        Self {
            dk: DecapsulationKey::generate_deterministic(d, z),
        }
    }

    /// Generate a key pair, drawing `d` and `z` from `rng`.
    #[cfg(feature = "rand_core")]
    pub fn generate<R: CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut d = B32::default();
        let mut z = B32::default();
        rng.fill_bytes(&mut d);
        rng.fill_bytes(&mut z);
        let kp = Self::from_seed(&d, &z);

        #[cfg(feature = "zeroize")]
        {
            d.zeroize();
            z.zeroize();
        }

        kp
    }

    /// The decapsulation (private) half of the pair.
    #[must_use]
    pub fn decapsulation_key(&self) -> &DecapsulationKey {
        &self.dk
    }

    /// The encapsulation (public) half of the pair.
    #[must_use]
    pub fn encapsulation_key(&self) -> &EncapsulationKey {
        &self.dk.ek
    }
}

fn seed(what: &'static str, bytes: &[u8]) -> Result<B32> {
    Error::check_length(what, SEED_LEN, bytes.len())?;
    Ok(to_array(bytes))
}

/// ML-KEM.KeyGen on byte buffers: `(ek, dk)` from the 32-byte seeds `d` and `z`.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] if either seed is not 32 bytes long.
#[instrument(level = "debug", skip_all, fields(d_len = d.len(), z_len = z.len()))]
pub fn key_gen(d: &[u8], z: &[u8]) -> Result<(EncodedEncapsulationKey, EncodedDecapsulationKey)> {
    let dk = DecapsulationKey::generate_deterministic(&seed("d", d)?, &seed("z", z)?);
    Ok((dk.ek.as_bytes(), dk.as_bytes()))
}

/// ML-KEM.Encaps on byte buffers: `(c, K)` for the key `ek` and the 32-byte message `m`.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] for a wrongly sized key or message, and
/// [`Error::NonCanonicalKey`] if `ek` fails the modulus check.
#[instrument(level = "debug", skip_all, fields(ek_len = ek.len(), m_len = m.len()))]
pub fn encapsulate(ek: &[u8], m: &[u8]) -> Result<(Ciphertext, SharedKey)> {
    let ek = EncapsulationKey::from_bytes(ek)?;
    Ok(ek.encapsulate_deterministic(&seed("m", m)?))
}

/// ML-KEM.Decaps on byte buffers.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] for a wrongly sized key or ciphertext.  A well-sized
/// ciphertext never produces an error.
#[instrument(level = "debug", skip_all, fields(dk_len = dk.len(), c_len = c.len()))]
pub fn decapsulate(dk: &[u8], c: &[u8]) -> Result<SharedKey> {
    let dk = DecapsulationKey::from_bytes(dk)?;
    Error::check_length("ciphertext", CIPHERTEXT_LEN, c.len())?;
    Ok(dk.decapsulate(&to_array(c)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Truncate;

    fn seed(x: u8) -> B32 {
        Array::from_fn(|i| u8::truncate(i) ^ x)
    }

    #[test]
    fn round_trip() {
        let kp = KeyPair::from_seed(&seed(1), &seed(2));
        let ek = kp.encapsulation_key();
        for x in 0..4 {
            let (c, K) = ek.encapsulate_deterministic(&seed(x));
            assert_eq!(kp.decapsulation_key().decapsulate(&c), K);
        }
    }

    #[test]
    fn key_layout() {
        let d = seed(3);
        let z = seed(4);
        let (ek, dk) = key_gen(&d, &z).unwrap();
        assert_eq!(ek.len(), ENCAPSULATION_KEY_LEN);
        assert_eq!(dk.len(), DECAPSULATION_KEY_LEN);

        let (dk_pke, rest) = dk.split_at(PKE_DECRYPTION_KEY_LEN);
        let (ek_part, rest) = rest.split_at(ENCAPSULATION_KEY_LEN);
        let (h, z_part) = rest.split_at(SEED_LEN);
        assert_eq!(dk_pke, crate::pke::key_gen(&d).1.as_slice());
        assert_eq!(ek_part, ek.as_slice());
        assert_eq!(h, H(&ek).as_slice());
        assert_eq!(z_part, z.as_slice());

        let parsed = DecapsulationKey::from_bytes(&dk).unwrap();
        assert_eq!(parsed, DecapsulationKey::generate_deterministic(&d, &z));
        assert_eq!(parsed.as_bytes(), dk);
    }

    #[test]
    fn implicit_rejection() {
        let kp = KeyPair::from_seed(&seed(5), &seed(6));
        let (mut c, K) = kp.encapsulation_key().encapsulate_deterministic(&seed(7));
        c[0] ^= 1;

        let K_bar = kp.decapsulation_key().decapsulate(&c);
        assert_ne!(K_bar, K);
        assert_eq!(K_bar, J(&[seed(6).as_slice(), c.as_slice()]));
    }

    #[test]
    fn byte_level_api() {
        let (ek, dk) = key_gen(&seed(8), &seed(9)).unwrap();
        let (c, K) = encapsulate(&ek, &seed(10)).unwrap();
        assert_eq!(decapsulate(&dk, &c).unwrap(), K);
    }

    #[test]
    fn length_errors() {
        assert_eq!(
            key_gen(&[0; 31], &[0; 32]),
            Err(Error::InvalidLength {
                what: "d",
                expected: 32,
                got: 31
            })
        );

        let (ek, dk) = key_gen(&seed(1), &seed(2)).unwrap();
        assert!(matches!(
            encapsulate(&ek[1..], &seed(3)),
            Err(Error::InvalidLength { what: "encapsulation key", .. })
        ));
        assert!(matches!(
            encapsulate(&ek, &[0; 33]),
            Err(Error::InvalidLength { what: "m", .. })
        ));
        assert!(matches!(
            decapsulate(&dk, &[0; CIPHERTEXT_LEN - 1]),
            Err(Error::InvalidLength { what: "ciphertext", .. })
        ));
        assert!(matches!(
            decapsulate(&dk[..DECAPSULATION_KEY_LEN - 1], &[0; CIPHERTEXT_LEN]),
            Err(Error::InvalidLength { what: "decapsulation key", .. })
        ));
    }

    #[test]
    fn modulus_check() {
        let (mut ek, _) = key_gen(&seed(1), &seed(2)).unwrap();
        assert!(EncapsulationKey::from_bytes(&ek).is_ok());

        // First coefficient becomes 0xd01 = 3329
        ek[0] = 0x01;
        ek[1] = (ek[1] & 0xf0) | 0x0d;
        assert_eq!(
            EncapsulationKey::from_bytes(&ek),
            Err(Error::NonCanonicalKey)
        );
        assert!(encapsulate(&ek, &seed(3)).is_err());

        // The K-PKE layer reduces instead of rejecting
        let ek_pke = EncryptionKey::from_bytes(&ek);
        assert_eq!(ek_pke.t_hat().polynomials()[0].coefficients()[0], 0);
    }
}
