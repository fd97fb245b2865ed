//! ML-KEM-768 parameters.
//!
//! Only the `k = 3` parameter set is implemented, so the parameters are plain constants.  The
//! sizes of the encoded objects are provided twice: as `usize` constants for slice-based
//! validation and as `typenum` sizes for the `hybrid-array` buffers that carry them.
//!
//! ```text
//! ek        = ByteEncode_12(t_hat) || rho                         384*k + 32   = 1184
//! dk_pke    = ByteEncode_12(s_hat)                                384*k        = 1152
//! dk        = dk_pke || ek || H(ek) || z                          768*k + 96   = 2400
//! c         = ByteEncode_du(Compress_du(u)) || ByteEncode_dv(..)  32*(du*k+dv) = 1088
//! ```

use hybrid_array::{
    Array,
    typenum::{Prod, Sum, U3, U32, U128, U320, U384, Unsigned},
};

/// The prime modulus `q`
pub const Q: u16 = 3329;

/// The number of coefficients in a polynomial
pub const N: usize = 256;

/// The rank of the module, i.e., the dimension of vectors and matrices
pub const K: usize = 3;

/// The CBD parameter for secrets and for the encryption noise `y`
pub const ETA1: usize = 2;

/// The CBD parameter for the encryption noise `e1` and `e2`
pub const ETA2: usize = 2;

/// Compression width for the `u` component of a ciphertext
pub const DU: usize = 10;

/// Compression width for the `v` component of a ciphertext
pub const DV: usize = 4;

/// Barrett multiplier `V = floor(2^26 / q)`
pub const BARRETT_MULTIPLIER: u64 = 20158;

/// Barrett shift
pub const BARRETT_SHIFT: u32 = 26;

/// Exclusive upper bound on inputs for which Barrett reduction yields a remainder below `2q`
pub const BARRETT_BOUND: u32 = 77_517_490;

/// `128^-1 mod q`, the scaling factor applied after the inverse NTT
pub const N_INV: u16 = 3303;

/// The primitive 256th root of unity
pub const ZETA: u16 = 17;

/// Length of the seeds `d`, `z`, `m`, and `r`
pub const SEED_LEN: usize = 32;

/// Length of the shared secret
pub const SHARED_KEY_LEN: usize = 32;

/// Number of random bytes consumed by one CBD sample
pub const CBD_INPUT_LEN: usize = 64 * ETA1;

/// Length of a 12-bit encoded polynomial
pub const ENCODED_POLYNOMIAL_LEN: usize = 384;

/// Length of an encoded encapsulation key
pub const ENCAPSULATION_KEY_LEN: usize = 1184;

/// Length of an encoded K-PKE decryption key
pub const PKE_DECRYPTION_KEY_LEN: usize = 1152;

/// Length of an encoded decapsulation key
pub const DECAPSULATION_KEY_LEN: usize = 2400;

/// Length of the `u` part of a ciphertext
pub const CIPHERTEXT_U_LEN: usize = 960;

/// Length of the `v` part of a ciphertext
pub const CIPHERTEXT_V_LEN: usize = 128;

/// Length of a ciphertext
pub const CIPHERTEXT_LEN: usize = 1088;

/// The rank `k` as a type-level integer
pub type Rank = U3;

pub(crate) type EncodedNttVectorSize = Prod<U384, Rank>;
pub(crate) type EncodedUSize = Prod<U320, Rank>;
pub(crate) type EncodedVSize = U128;

/// Size of an encoded encapsulation key
pub type EncapsulationKeySize = Sum<EncodedNttVectorSize, U32>;

/// Size of an encoded decapsulation key
pub type DecapsulationKeySize = Sum<Sum<Sum<EncodedNttVectorSize, EncapsulationKeySize>, U32>, U32>;

/// Size of a ciphertext
pub type CiphertextSize = Sum<EncodedUSize, EncodedVSize>;

/// An encoded encapsulation key
pub type EncodedEncapsulationKey = Array<u8, EncapsulationKeySize>;

/// An encoded K-PKE decryption key
pub type EncodedDecryptionKey = Array<u8, EncodedNttVectorSize>;

/// An encoded decapsulation key
pub type EncodedDecapsulationKey = Array<u8, DecapsulationKeySize>;

/// An encoded ciphertext
pub type EncodedCiphertext = Array<u8, CiphertextSize>;

const _: () = {
    assert!(Rank::USIZE == K);
    assert!(CBD_INPUT_LEN == 128);
    assert!(EncodedNttVectorSize::USIZE == PKE_DECRYPTION_KEY_LEN);
    assert!(EncapsulationKeySize::USIZE == ENCAPSULATION_KEY_LEN);
    assert!(DecapsulationKeySize::USIZE == DECAPSULATION_KEY_LEN);
    assert!(EncodedUSize::USIZE == CIPHERTEXT_U_LEN);
    assert!(EncodedVSize::USIZE == CIPHERTEXT_V_LEN);
    assert!(CiphertextSize::USIZE == CIPHERTEXT_LEN);
    assert!(PKE_DECRYPTION_KEY_LEN == K * ENCODED_POLYNOMIAL_LEN);
    assert!(CIPHERTEXT_LEN == 32 * (DU * K + DV));
};
