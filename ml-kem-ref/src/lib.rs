#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::pedantic)] // Be pedantic by default
#![warn(clippy::integer_division_remainder_used)] // Be judicious about using `/` and `%`
#![allow(non_snake_case)] // Allow notation matching FIPS 203
#![allow(clippy::clone_on_copy)] // Be explicit about moving data
#![warn(missing_docs)]

//! # Usage
//!
//! ```
//! use ml_kem_ref::{B32, KeyPair};
//!
//! let d = B32::from([1u8; 32]);
//! let z = B32::from([2u8; 32]);
//! let m = B32::from([3u8; 32]);
//!
//! let kp = KeyPair::from_seed(&d, &z);
//! let (c, k_send) = kp.encapsulation_key().encapsulate_deterministic(&m);
//! let k_recv = kp.decapsulation_key().decapsulate(&c);
//! assert_eq!(k_send, k_recv);
//! ```

mod algebra;
mod arith;
mod compress;
mod crypto;
mod encode;
mod error;
mod kem;
mod ntt;
mod sampling;
mod util;

pub mod hazmat;
pub mod param;
pub mod pke;

pub use crate::algebra::{
    FieldElement, NttMatrix, NttPolynomial, NttVector, Polynomial, Vector, base_mul,
};
pub use crate::error::{Error, Result};
pub use crate::kem::{
    Ciphertext, DecapsulationKey, EncapsulationKey, KeyPair, SharedKey, decapsulate,
    encapsulate, key_gen,
};
pub use crate::ntt::{Ntt, NttInverse};
pub use crate::util::B32;

pub use hybrid_array as array;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeded_round_trip() {
        let kp = KeyPair::from_seed(&B32::from([0xa5; 32]), &B32::from([0x5a; 32]));
        let ek = EncapsulationKey::from_bytes(&kp.encapsulation_key().as_bytes()).unwrap();
        let dk = DecapsulationKey::from_bytes(&kp.decapsulation_key().as_bytes()).unwrap();

        let (c, k_send) = ek.encapsulate_deterministic(&B32::from([0x11; 32]));
        assert_eq!(dk.decapsulate(&c), k_send);
    }

    #[cfg(feature = "rand_core")]
    #[test]
    fn random_round_trip() {
        let mut rng = rand_core::UnwrapErr(getrandom::SysRng);
        for _ in 0..8 {
            let kp = KeyPair::generate(&mut rng);
            let (c, k_send) = kp.encapsulation_key().encapsulate(&mut rng);
            let k_recv = kp.decapsulation_key().decapsulate(&c);
            assert_eq!(k_send, k_recv);
        }
    }
}
