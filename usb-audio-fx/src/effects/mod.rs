//! Effect variants behind [`EffectEngine`].
//!
//! | Effect | Enabled means | Disabled means |
//! |--------|---------------|----------------|
//! | [`ReverbEffect`] | Wet/dry reverb mix | Bit-exact pass-through (tail keeps running) |
//! | [`GranularEffect`] | Capture frozen | Capture recording |
//!
//! Firmware builds pick one variant at compile time by instantiating
//! [`AudioTask`](crate::task::AudioTask) with it directly. [`Effect`] is for
//! hosts that choose at runtime.

pub mod granular;
pub mod reverb;

pub use granular::{GranularEffect, GranularParams};
pub use reverb::{ReverbEffect, ReverbParams};

use crate::engine::{EffectEngine, ParamId};
use crate::sample::Sample;

/// One of the built-in effects, selected at runtime.
#[allow(clippy::large_enum_variant)]
pub enum Effect {
    /// Schroeder-Moorer reverb.
    Reverb(ReverbEffect),
    /// Granular freeze-delay.
    Granular(GranularEffect),
}

impl From<ReverbEffect> for Effect {
    fn from(fx: ReverbEffect) -> Self {
        Effect::Reverb(fx)
    }
}

impl From<GranularEffect> for Effect {
    fn from(fx: GranularEffect) -> Self {
        Effect::Granular(fx)
    }
}

impl EffectEngine for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Reverb(fx) => fx.name(),
            Effect::Granular(fx) => fx.name(),
        }
    }

    fn init(&mut self) {
        match self {
            Effect::Reverb(fx) => fx.init(),
            Effect::Granular(fx) => fx.init(),
        }
    }

    fn set_format(&mut self, channels: u8, sample_rate: u32) {
        match self {
            Effect::Reverb(fx) => fx.set_format(channels, sample_rate),
            Effect::Granular(fx) => fx.set_format(channels, sample_rate),
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        match self {
            Effect::Reverb(fx) => fx.set_enabled(enabled),
            Effect::Granular(fx) => fx.set_enabled(enabled),
        }
    }

    fn set_param(&mut self, id: ParamId, value: i16) {
        match self {
            Effect::Reverb(fx) => fx.set_param(id, value),
            Effect::Granular(fx) => fx.set_param(id, value),
        }
    }

    fn process(&mut self, output: &mut [Sample], input: &[Sample], frames: usize) {
        match self {
            Effect::Reverb(fx) => fx.process(output, input, frames),
            Effect::Granular(fx) => fx.process(output, input, frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_the_variant() {
        let mut fx = Effect::from(ReverbEffect::new());
        assert_eq!(fx.name(), "Schroeder-Moorer Reverb");

        fx = Effect::from(GranularEffect::new());
        assert_eq!(fx.name(), "Granular Freeze");
        fx.set_enabled(true);
        match &fx {
            Effect::Granular(g) => assert!(g.is_frozen()),
            Effect::Reverb(_) => unreachable!(),
        }
    }
}
