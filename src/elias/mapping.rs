use std::num::NonZeroU64;

use crate::elias::{CodeErr, EncodeErr};

/// A bijection between caller values and the positive integers an Elias code
/// can represent.
pub trait ValueMapping {
    type Value: Copy;

    fn lift(&self, value: Self::Value) -> Result<NonZeroU64, EncodeErr>;

    /// Map a decoded code back to a caller value. `offset` locates the code
    /// in its stream for error reporting.
    fn lower(&self, code: NonZeroU64, offset: usize) -> Result<Self::Value, CodeErr>;
}

/// Zero-inclusive unsigned mapping: `v` is coded as `v + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsigned;

/// Zigzag mapping: negative `v` is coded as `-2v`, the rest as `2v + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signed;

impl ValueMapping for Unsigned {
    type Value = u64;

    #[inline]
    fn lift(&self, value: u64) -> Result<NonZeroU64, EncodeErr> {
        value
            .checked_add(1)
            .and_then(NonZeroU64::new)
            .ok_or(EncodeErr::Overflow)
    }

    #[inline]
    fn lower(&self, code: NonZeroU64, _offset: usize) -> Result<u64, CodeErr> {
        Ok(code.get() - 1)
    }
}

impl ValueMapping for Signed {
    type Value = i64;

    #[inline]
    fn lift(&self, value: i64) -> Result<NonZeroU64, EncodeErr> {
        let code = if value < 0 {
            // i64::MIN would map to 2^64
            value.unsigned_abs().checked_mul(2)
        } else {
            Some(((value as u64) << 1) | 1)
        };
        code.and_then(NonZeroU64::new).ok_or(EncodeErr::Overflow)
    }

    #[inline]
    fn lower(&self, code: NonZeroU64, _offset: usize) -> Result<i64, CodeErr> {
        let code = code.get();
        let half = (code >> 1) as i64;
        Ok(if code & 1 == 0 { -half } else { half })
    }
}

/// Unsigned mapping restricted to the non-negative half of `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NonNegative;

impl ValueMapping for NonNegative {
    type Value = i64;

    #[inline]
    fn lift(&self, value: i64) -> Result<NonZeroU64, EncodeErr> {
        if value < 0 {
            return Err(EncodeErr::Negative(value));
        }
        Unsigned.lift(value as u64)
    }

    #[inline]
    fn lower(&self, code: NonZeroU64, offset: usize) -> Result<i64, CodeErr> {
        let value = Unsigned.lower(code, offset)?;
        i64::try_from(value).map_err(|_| CodeErr::Overflow { offset })
    }
}
