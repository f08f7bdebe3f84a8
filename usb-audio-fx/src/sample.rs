//! Sample container format shared by the USB transport, the ring buffers
//! and the effects.
//!
//! ## Bit layout
//!
//! ```text
//!  31                16 15                 0
//! ┌────────────────────┬────────────────────┐
//! │   Q15 amplitude    │  transport padding │
//! └────────────────────┴────────────────────┘
//! ```
//!
//! DSP code only ever sees the high halfword, extracted with an arithmetic
//! shift. Results are written back shifted left, leaving the padding zero.
//! Frames are [`CHANNELS`] consecutive containers, left first.

use crate::constants::CHANNELS;
use crate::dsp::intrinsics::signed_saturate_rshift;
use crate::dsp::Q15;

/// One channel's amplitude at one instant, in its 32-bit transport container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Sample(pub i32);

/// One interleaved stereo frame.
pub type Frame = [Sample; CHANNELS];

impl Sample {
    /// Digital silence.
    pub const SILENCE: Sample = Sample(0);

    /// Pack a Q15 value into the high halfword.
    #[inline(always)]
    pub const fn from_q15(q: Q15) -> Sample {
        Sample((q.raw() as i32) << 16)
    }

    /// Extract the Q15 amplitude (arithmetic shift, never out of range).
    #[inline(always)]
    pub fn q15(self) -> Q15 {
        Q15(signed_saturate_rshift::<16, 16>(self.0) as i16)
    }

    /// Raw container bits.
    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Decode a little-endian container as it arrives on the wire.
    #[inline]
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Sample {
        Sample(i32::from_le_bytes(bytes))
    }

    /// Encode as little-endian for the wire.
    #[inline]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl From<i32> for Sample {
    fn from(raw: i32) -> Sample {
        Sample(raw)
    }
}
