use crate::sample::Sample;

/// Identifier of a runtime-adjustable effect parameter.
///
/// IDs form one namespace shared by every effect. An effect reacts to the
/// IDs it understands and silently ignores the rest.
pub type ParamId = u8;

/// Well-known parameter IDs.
pub mod param {
    use super::ParamId;

    /// Wet (processed) level, raw Q15.
    pub const WET_MIX: ParamId = 0;
    /// Dry (direct) level, raw Q15.
    pub const DRY_MIX: ParamId = 1;
    /// Grain length: `256 + (value >> 1)` samples.
    pub const GRAIN_LENGTH: ParamId = 2;
    /// Concurrent grains: `1 + (value >> 11)`, 1–8.
    pub const GRAIN_DENSITY: ParamId = 3;
    /// Comb feedback damping, raw Q15.
    pub const DAMPING: ParamId = 4;
    /// Allpass diffusion gain, raw Q15.
    pub const ALLPASS_GAIN: ParamId = 5;
    /// Output make-up gain, Q13 (8192 = unity).
    pub const MASTER_GAIN: ParamId = 6;
    /// Decay-time scale, Q14 (16384 = the tuned T60 table).
    pub const DECAY: ParamId = 7;
}

/// Contract every effect variant implements so the audio task can drive it
/// without knowing which effect it is.
///
/// `process` runs once per quantum on the audio path: implementations must
/// not allocate, block, or loop over data-dependent bounds.
pub trait EffectEngine {
    /// Human-readable effect name.
    fn name(&self) -> &'static str;

    /// Reset all internal state for the current format. Must be called
    /// before the first [`process`](EffectEngine::process).
    fn init(&mut self);

    /// Adopt a new stream format. Rate-dependent effects rebuild their
    /// delay lines here; rate-independent ones may ignore it.
    fn set_format(&mut self, channels: u8, sample_rate: u32);

    /// Enable or disable the effect. Takes effect at the next `process` call.
    fn set_enabled(&mut self, enabled: bool);

    /// Apply a parameter immediately. Unknown IDs are ignored.
    fn set_param(&mut self, id: ParamId, value: i16);

    /// Process `frames` interleaved stereo frames from `input` into `output`.
    ///
    /// Both slices hold at least `frames * CHANNELS` samples.
    fn process(&mut self, output: &mut [Sample], input: &[Sample], frames: usize);
}

impl<E: EffectEngine + ?Sized> EffectEngine for &mut E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init(&mut self) {
        (**self).init()
    }

    fn set_format(&mut self, channels: u8, sample_rate: u32) {
        (**self).set_format(channels, sample_rate)
    }

    fn set_enabled(&mut self, enabled: bool) {
        (**self).set_enabled(enabled)
    }

    fn set_param(&mut self, id: ParamId, value: i16) {
        (**self).set_param(id, value)
    }

    fn process(&mut self, output: &mut [Sample], input: &[Sample], frames: usize) {
        (**self).process(output, input, frames)
    }
}
