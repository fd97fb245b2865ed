//! Modular arithmetic in `Z_q`.
//!
//! These are the reduction primitives that every other layer is built from.  They reproduce the
//! subtract-then-correct datapath of the hardware bit for bit, so each one documents the exact
//! input range it accepts.  The ranges are checked with `debug_assert!` here; the `hazmat` module
//! exposes checked variants for callers that supply raw integers.

use crate::param::{BARRETT_MULTIPLIER, BARRETT_SHIFT, Q};
use crate::util::Truncate;

const Q32: u32 = Q as u32;

/// Bit 12 of a 13-bit difference, set when the subtraction borrowed
const BORROW_BIT: u16 = 1 << 12;
const MASK_12: u16 = (1 << 12) - 1;
const MASK_13: u16 = (1 << 13) - 1;

/// `a mod q` for any input.
#[allow(clippy::integer_division_remainder_used)]
pub(crate) fn canonical_reduce(a: u32) -> u16 {
    u16::truncate(a % Q32)
}

/// Reduce `a` in `[0, 2q)` to `[0, q)`.
#[inline]
pub(crate) fn cond_sub(a: u16) -> u16 {
    debug_assert!(a < 2 * Q);
    if a >= Q { a - Q } else { a }
}

/// Correct the 13-bit result of `a - b` for canonical `a`, `b`.
///
/// If the borrow bit is set the true difference was negative, and adding `q` modulo `2^12`
/// recovers `a - b + q`.
#[inline]
pub(crate) fn cond_add13(a: u16) -> u16 {
    debug_assert!(a <= MASK_13);
    if a & BORROW_BIT != 0 {
        (a + Q) & MASK_12
    } else {
        a & MASK_12
    }
}

/// Barrett reduction for `a < 77_517_490`.
#[inline]
pub(crate) fn barrett_reduce(a: u32) -> u16 {
    cond_sub(barrett_remainder(a))
}

/// The Barrett quotient step alone: `a - floor(a * V / 2^26) * q`, which lies in `[0, 2q)`.
#[inline]
pub(crate) fn barrett_remainder(a: u32) -> u16 {
    debug_assert!(a < crate::param::BARRETT_BOUND);
    let t = u32::truncate((u64::from(a) * BARRETT_MULTIPLIER) >> BARRETT_SHIFT);
    let r = a - t * Q32;
    debug_assert!(r < 2 * Q32);
    u16::truncate(r)
}

/// `a + b mod q` for canonical operands.
#[inline]
pub(crate) fn mod_add(a: u16, b: u16) -> u16 {
    debug_assert!(a < Q && b < Q);
    cond_sub(a + b)
}

/// `a - b mod q` for canonical operands, through the 13-bit borrow pattern.
#[inline]
pub(crate) fn mod_sub(a: u16, b: u16) -> u16 {
    debug_assert!(a < Q && b < Q);
    cond_add13(borrow_pattern(a, b))
}

/// The 13-bit result of an unsigned 13-bit subtraction `a - b`.
#[inline]
pub(crate) fn borrow_pattern(a: u16, b: u16) -> u16 {
    (a + (1 << 13) - b) & MASK_13
}

/// `a * b mod q` for canonical operands.
#[inline]
pub(crate) fn mod_mul(a: u16, b: u16) -> u16 {
    barrett_reduce(u32::from(a) * u32::from(b))
}
