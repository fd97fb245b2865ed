//! Property-based tests for the `ml-kem-ref` crate.

use ml_kem_ref::{
    B32, KeyPair,
    hazmat::{self, HashMode},
    param::{N, Q},
};
use proptest::{collection, prelude::*};

fn poly() -> impl Strategy<Value = [u16; N]> {
    collection::vec(0..Q, N).prop_map(|v| v.try_into().unwrap())
}

fn wrapped_distance(a: u16, b: u16) -> u16 {
    let diff = a.abs_diff(b);
    diff.min(Q - diff)
}

proptest! {
    #[test]
    fn ntt_inverse_round_trip(f in poly()) {
        prop_assert_eq!(hazmat::ntt_inverse(&hazmat::ntt(&f)), f);
        prop_assert_eq!(hazmat::ntt(&hazmat::ntt_inverse(&f)), f);
    }

    #[test]
    fn ntt_is_additive(a in poly(), b in poly()) {
        let sum = hazmat::poly_add(&a, &b).unwrap();
        let ntt_sum = hazmat::poly_add(&hazmat::ntt(&a), &hazmat::ntt(&b)).unwrap();
        prop_assert_eq!(hazmat::ntt(&sum), ntt_sum);
    }

    #[test]
    fn basemul_matches_schoolbook(a in poly(), b in poly()) {
        let product = hazmat::poly_basemul(&hazmat::ntt(&a), &hazmat::ntt(&b)).unwrap();
        prop_assert_eq!(hazmat::ntt_inverse(&product), hazmat::schoolbook_mul(&a, &b).unwrap());
    }

    #[test]
    fn compress_error_bound(x in 0..Q, d in prop::sample::select(vec![1usize, 4, 5, 10, 11])) {
        let y = hazmat::decompress(hazmat::compress(x, d).unwrap(), d).unwrap();
        let bound = u16::try_from(u32::from(Q).div_ceil(1 << (d + 1))).unwrap();
        prop_assert!(wrapped_distance(x, y) <= bound);
    }

    #[test]
    fn byte_codec_round_trip(f in poly(), d in 1usize..=12) {
        let vals = f.map(|x| if d == 12 { x } else { x & ((1 << d) - 1) });
        let bytes = hazmat::byte_encode(d, &vals).unwrap();
        prop_assert_eq!(bytes.len(), 32 * d);
        prop_assert_eq!(hazmat::byte_decode(d, &bytes).unwrap(), vals);
    }

    #[test]
    fn byte_decode_12_reduces(bytes in collection::vec(any::<u8>(), 384)) {
        let vals = hazmat::byte_decode(12, &bytes).unwrap();
        prop_assert!(vals.iter().all(|&x| x < Q));
        let reencoded = hazmat::byte_decode(12, &hazmat::byte_encode(12, &vals).unwrap()).unwrap();
        prop_assert_eq!(reencoded, vals);
    }

    #[test]
    fn cbd_is_deterministic_and_small(bytes in collection::vec(any::<u8>(), 128)) {
        let f = hazmat::cbd_eta2(&bytes).unwrap();
        prop_assert_eq!(f, hazmat::cbd_eta2(&bytes).unwrap());
        prop_assert!(f.iter().all(|&x| x <= 2 || x >= Q - 2));
    }

    #[test]
    fn sponge_lengths(input in collection::vec(any::<u8>(), 0..300), len in 0usize..600) {
        prop_assert_eq!(hazmat::sponge(HashMode::Shake128, &input, len).unwrap().len(), len);
        let long = hazmat::sponge(HashMode::Shake256, &input, len + 32).unwrap();
        let short = hazmat::sponge(HashMode::Shake256, &input, len).unwrap();
        prop_assert_eq!(&long[..len], short.as_slice());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn kem_round_trip(d in any::<[u8; 32]>(), z in any::<[u8; 32]>(), m in any::<[u8; 32]>()) {
        let kp = KeyPair::from_seed(&d.into(), &z.into());
        let (c, k) = kp.encapsulation_key().encapsulate_deterministic(&m.into());
        prop_assert_eq!(kp.decapsulation_key().decapsulate(&c), k);
    }

    #[test]
    fn implicit_rejection(
        d in any::<[u8; 32]>(),
        z in any::<[u8; 32]>(),
        m in any::<[u8; 32]>(),
        pos in 0usize..1088,
        flip in 1u8..=255,
    ) {
        let kp = KeyPair::from_seed(&d.into(), &z.into());
        let (mut c, k) = kp.encapsulation_key().encapsulate_deterministic(&m.into());
        c[pos] ^= flip;

        let expected = hazmat::sponge(HashMode::Shake256, &[z.as_slice(), c.as_slice()].concat(), 32)
            .unwrap();
        let k_bar = kp.decapsulation_key().decapsulate(&c);
        prop_assert_eq!(k_bar.as_slice(), expected.as_slice());
        prop_assert_ne!(k_bar, k);
    }

    #[test]
    fn byte_level_api_matches_typed(d in any::<[u8; 32]>(), z in any::<[u8; 32]>(), m in any::<[u8; 32]>()) {
        let (ek, dk) = ml_kem_ref::key_gen(&d, &z).unwrap();
        let kp = KeyPair::from_seed(&B32::from(d), &B32::from(z));
        prop_assert_eq!(&ek, &kp.encapsulation_key().as_bytes());
        prop_assert_eq!(&dk, &kp.decapsulation_key().as_bytes());

        let (c, k) = ml_kem_ref::encapsulate(&ek, &m).unwrap();
        prop_assert_eq!(ml_kem_ref::decapsulate(&dk, &c).unwrap(), k);
    }
}
