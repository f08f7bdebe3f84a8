//! Saturating Q15 fixed-point arithmetic.
//!
//! [`Q15`] holds a signed value in `[-1.0, 1.0)` with 15 fractional bits.
//! Every operator saturates at the rails instead of wrapping, so filter
//! feedback paths clip rather than flip sign on overflow.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use super::intrinsics::{mul_16x16, saturate16};

/// Signed Q15 fixed-point number with saturating arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Q15(pub i16);

impl Q15 {
    /// 0.0
    pub const ZERO: Q15 = Q15(0);
    /// Largest representable value, just under 1.0.
    pub const ONE: Q15 = Q15(i16::MAX);
    /// -1.0
    pub const MIN: Q15 = Q15(i16::MIN);

    /// Convert from a float, rounding as `x * 32767 + 0.5` and saturating.
    pub const fn from_f32(x: f32) -> Q15 {
        let scaled = x * 32767.0 + 0.5;
        if scaled >= 32767.0 {
            Q15(i16::MAX)
        } else if scaled <= -32768.0 {
            Q15(i16::MIN)
        } else {
            Q15(scaled as i16)
        }
    }

    /// Saturate a wide intermediate that is already in Q15 scale.
    #[inline(always)]
    pub fn saturate(wide: i32) -> Q15 {
        Q15(saturate16(wide))
    }

    /// Raw `i16` representation.
    #[inline(always)]
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// Widen to `i32` for accumulation.
    #[inline(always)]
    pub const fn wide(self) -> i32 {
        self.0 as i32
    }

    /// Scale by a Q16.16 multiplier (65536 = unity), saturating.
    ///
    /// Used for gains that exceed the Q15 range, such as a make-up gain of 1.5.
    #[inline(always)]
    pub fn scale_q16(self, multiplier: i32) -> Q15 {
        let product = (self.0 as i64 * multiplier as i64) >> 16;
        Q15(saturate16(product.clamp(i32::MIN as i64, i32::MAX as i64) as i32))
    }
}

impl Add for Q15 {
    type Output = Q15;

    #[inline(always)]
    fn add(self, rhs: Q15) -> Q15 {
        Q15(saturate16(self.0 as i32 + rhs.0 as i32))
    }
}

impl AddAssign for Q15 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Q15) {
        *self = *self + rhs;
    }
}

impl Sub for Q15 {
    type Output = Q15;

    #[inline(always)]
    fn sub(self, rhs: Q15) -> Q15 {
        Q15(saturate16(self.0 as i32 - rhs.0 as i32))
    }
}

impl Mul for Q15 {
    type Output = Q15;

    /// `(a * b) >> 15`, saturated. Only `-1.0 * -1.0` actually clips.
    #[inline(always)]
    fn mul(self, rhs: Q15) -> Q15 {
        Q15(saturate16(mul_16x16(self.0, rhs.0) >> 15))
    }
}

impl Neg for Q15 {
    type Output = Q15;

    #[inline(always)]
    fn neg(self) -> Q15 {
        Q15(self.0.saturating_neg())
    }
}

impl From<i16> for Q15 {
    fn from(raw: i16) -> Q15 {
        Q15(raw)
    }
}

impl From<Q15> for i16 {
    fn from(q: Q15) -> i16 {
        q.0
    }
}

/// Convert a gain to a Q16.16 multiplier (65536 = unity).
pub const fn gain_q16(gain: f32) -> i32 {
    (gain * 65536.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f32_matches_fixed_rounding() {
        assert_eq!(Q15::from_f32(0.5), Q15(16384));
        assert_eq!(Q15::from_f32(0.4), Q15(13107));
        assert_eq!(Q15::from_f32(0.62), Q15(20316));
        assert_eq!(Q15::from_f32(1.0), Q15::ONE);
        assert_eq!(Q15::from_f32(1.5), Q15::ONE);
        assert_eq!(Q15::from_f32(-2.0), Q15::MIN);
        assert_eq!(Q15::from_f32(0.0), Q15::ZERO);
    }

    #[test]
    fn multiply() {
        // 0.5 * 0.5 = 0.25
        assert_eq!(Q15(16384) * Q15(16384), Q15(8192));
        // ~1.0 * ~1.0 loses one LSB
        assert_eq!(Q15::ONE * Q15::ONE, Q15(32766));
        assert_eq!(Q15::MIN * Q15::ONE, Q15(-32767));
        // -1.0 * -1.0 would be +1.0; clips instead of wrapping
        assert_eq!(Q15::MIN * Q15::MIN, Q15::ONE);
        assert_eq!(Q15(-3) * Q15(16384), Q15(-2)); // arithmetic shift floors
    }

    #[test]
    fn add_sub_saturate() {
        assert_eq!(Q15(100) + Q15(200), Q15(300));
        assert_eq!(Q15(32000) + Q15(1000), Q15::ONE);
        assert_eq!(Q15(-32000) - Q15(1000), Q15::MIN);
        assert_eq!(Q15(5) - Q15(7), Q15(-2));

        let mut acc = Q15(32760);
        acc += Q15(100);
        assert_eq!(acc, Q15::ONE);
    }

    #[test]
    fn negation_clips_min() {
        assert_eq!(-Q15(1234), Q15(-1234));
        assert_eq!(-Q15::MIN, Q15::ONE);
    }

    #[test]
    fn q16_scaling() {
        let one_and_half = gain_q16(1.5);
        assert_eq!(one_and_half, 98304);
        assert_eq!(Q15(10000).scale_q16(one_and_half), Q15(15000));
        assert_eq!(Q15(30000).scale_q16(one_and_half), Q15::ONE);
        assert_eq!(Q15(-30000).scale_q16(one_and_half), Q15::MIN);
        assert_eq!(Q15(1234).scale_q16(gain_q16(1.0)), Q15(1234));
    }
}
