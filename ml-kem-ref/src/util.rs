use hybrid_array::{
    Array,
    typenum::{U32, U64},
};

/// A 32-byte array, defined here for brevity because it is used several times
pub type B32 = Array<u8, U32>;

/// A 64-byte array, the output of `G`
pub(crate) type B64 = Array<u8, U64>;

/// Truncate an unsigned integer to a shorter representation, discarding the high-order bits
pub(crate) trait Truncate<T> {
    fn truncate(x: T) -> Self;
}

macro_rules! define_truncate {
    ($from:ident, $to:ident) => {
        impl Truncate<$from> for $to {
            #[allow(clippy::cast_possible_truncation)]
            #[allow(clippy::as_conversions)]
            fn truncate(x: $from) -> $to {
                (x & $from::from($to::MAX)) as $to
            }
        }
    };
}

define_truncate!(u128, u16);
define_truncate!(u64, u32);
define_truncate!(u32, u16);
define_truncate!(usize, u8);

/// Split `G` output into its two 32-byte halves
pub(crate) fn split_b64(x: &B64) -> (B32, B32) {
    (
        Array::from_fn(|i| x[i]),
        Array::from_fn(|i| x[i + 32]),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn truncate() {
        assert_eq!(u16::truncate(0x1_2345_u32), 0x2345);
        assert_eq!(u32::truncate(0xdead_beef_0000_0001_u64), 1);
        assert_eq!(u8::truncate(0x1ff_usize), 0xff);
        assert_eq!(u16::truncate(u128::MAX), u16::MAX);
    }

    #[test]
    fn split() {
        let x: B64 = Array::from_fn(|i| u8::truncate(i));
        let (a, b) = split_b64(&x);
        assert_eq!(a[0], 0);
        assert_eq!(a[31], 31);
        assert_eq!(b[0], 32);
        assert_eq!(b[31], 63);
    }
}
