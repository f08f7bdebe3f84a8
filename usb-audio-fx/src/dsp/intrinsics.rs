//! Cortex-M DSP instruction wrappers with pure-Rust fallbacks.
//!
//! On targets with the DSP extension (`thumbv7em`, `thumbv8m.main`) these
//! compile to single-cycle saturate/multiply instructions. Everywhere else
//! (host tests, Cortex-M0+ such as the RP2040) the fallback path computes the
//! exact same result.

/// Signed saturate after an arithmetic right shift.
///
/// Computes `clamp(val >> RSHIFT, -(2^(BITS-1)), 2^(BITS-1) - 1)`.
///
/// Maps to ARM `SSAT`. `BITS` and `RSHIFT` are const generics because the
/// instruction takes them as immediates.
#[inline(always)]
pub fn signed_saturate_rshift<const BITS: u32, const RSHIFT: u32>(val: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #{bits}, {val}, asr #{rshift}",
                out = out(reg) out,
                val = in(reg) val,
                bits = const BITS,
                rshift = const RSHIFT,
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        let shifted = val >> RSHIFT;
        let max = (1i32 << (BITS - 1)) - 1;
        let min = -(1i32 << (BITS - 1));
        shifted.clamp(min, max)
    }
}

/// Saturate an `i32` into `i16` range (`-32768..=32767`).
///
/// Maps to ARM `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        val.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// Signed 16×16 → 32 multiply of the bottom halfwords. Maps to ARM `SMULBB`.
#[inline(always)]
pub fn mul_16x16(a: i16, b: i16) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "smulbb {out}, {a}, {b}",
                out = out(reg) out,
                a = in(reg) a as i32,
                b = in(reg) b as i32,
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        a as i32 * b as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate16_clamps_both_rails() {
        assert_eq!(saturate16(0), 0);
        assert_eq!(saturate16(32767), 32767);
        assert_eq!(saturate16(32768), 32767);
        assert_eq!(saturate16(-32768), -32768);
        assert_eq!(saturate16(-32769), -32768);
        assert_eq!(saturate16(i32::MAX), 32767);
        assert_eq!(saturate16(i32::MIN), -32768);
    }

    #[test]
    fn ssat_extracts_high_halfword() {
        // A 32-bit container with Q15 in the top half.
        let word = (-1234i32) << 16 | 0x00AB;
        assert_eq!(signed_saturate_rshift::<16, 16>(word), -1234);
        assert_eq!(signed_saturate_rshift::<16, 16>(i32::MAX), 32767);
        assert_eq!(signed_saturate_rshift::<16, 16>(i32::MIN), -32768);
    }

    #[test]
    fn ssat_clamps_narrow_widths() {
        assert_eq!(signed_saturate_rshift::<8, 0>(300), 127);
        assert_eq!(signed_saturate_rshift::<8, 0>(-300), -128);
        assert_eq!(signed_saturate_rshift::<8, 2>(400), 100);
    }

    #[test]
    fn mul_16x16_is_full_precision() {
        assert_eq!(mul_16x16(32767, 32767), 1_073_676_289);
        assert_eq!(mul_16x16(-32768, -32768), 1_073_741_824);
        assert_eq!(mul_16x16(-2, 3), -6);
    }
}
