//! Fixed-point DSP building blocks.
//!
//! - [`intrinsics`]: Cortex-M saturate/multiply instructions with portable fallbacks
//! - [`q15`]: the saturating [`Q15`] sample type
//! - [`delay`]: arena-backed circular delay lines

pub mod delay;
pub mod intrinsics;
pub mod q15;

pub use delay::{DelayArena, DelayLine};
pub use q15::{gain_q16, Q15};
