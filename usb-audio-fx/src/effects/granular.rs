//! Granular delay with freeze.
//!
//! Incoming audio is down-mixed to mono and recorded into a circular capture
//! buffer. A pool of eight grains replays short enveloped slices of that
//! buffer; whenever a slot falls idle it is immediately re-seeded at a random
//! offset. The summed grains form a mono texture mixed under both channels.
//!
//! Freezing stops the recorder. In-flight grains are left alone, and every
//! grain from then on loops over the captured segment, turning the last few
//! hundred milliseconds into a sustained drone.
//!
//! ## Grain envelope
//!
//! ```text
//!  gain
//!   1 ┤      ┌───────────────┐
//!     │     ╱                 ╲
//!   0 ┼────┘                   └────
//!     0   FADE            len-FADE len
//! ```

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::constants::CHANNELS;
use crate::dsp::Q15;
use crate::engine::{param, EffectEngine, ParamId};
use crate::sample::Sample;

/// Capture buffer length in mono samples (~341 ms at 48 kHz).
pub const CAPTURE_LEN: usize = 16_384;

/// Grain slots in the pool.
pub const NUM_GRAINS: usize = 8;

/// Fade-in and fade-out length of each grain, in samples.
pub const GRAIN_FADE: u32 = 512;

/// Shortest settable grain.
pub const MIN_GRAIN_LENGTH: u32 = 256;

/// Longest settable grain; leaves half the buffer as the start-offset window.
pub const MAX_GRAIN_LENGTH: u32 = (CAPTURE_LEN / 2) as u32;

/// Seed of the default grain-placement generator.
const DEFAULT_SEED: u64 = 0x5EED_6A41;

/// One playback voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grain {
    /// Capture-buffer index of the grain's first sample.
    pub start: usize,
    /// Samples played so far.
    pub elapsed: u32,
    /// Whether the slot is playing.
    pub active: bool,
}

impl Grain {
    const IDLE: Grain = Grain {
        start: 0,
        elapsed: 0,
        active: false,
    };
}

/// Tunable granular coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GranularParams {
    /// Direct signal level.
    pub dry: Q15,
    /// Grain texture level.
    pub wet: Q15,
    /// Grain length in samples.
    pub grain_length: u32,
    /// Active grain slots, 1–8.
    pub density: usize,
}

impl GranularParams {
    /// The tuned defaults.
    pub const DEFAULT: GranularParams = GranularParams {
        dry: Q15::from_f32(0.5),
        wet: Q15::from_f32(0.5),
        grain_length: 2048,
        density: NUM_GRAINS,
    };
}

impl Default for GranularParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Trapezoid gain for a grain `elapsed` samples into its `length`.
#[inline]
pub fn grain_envelope(elapsed: u32, length: u32) -> Q15 {
    let remaining = length.saturating_sub(elapsed);
    let ramp = elapsed.min(remaining);
    if ramp >= GRAIN_FADE {
        Q15::ONE
    } else {
        Q15((ramp * i16::MAX as u32 / GRAIN_FADE) as i16)
    }
}

/// Granular freeze-delay.
///
/// `R` supplies grain start offsets. It defaults to a fixed-seed
/// [`SmallRng`]; tests inject their own source for reproducible placement.
pub struct GranularEffect<R = SmallRng> {
    capture: [i16; CAPTURE_LEN],
    write_pos: usize,
    frozen: bool,
    grains: [Grain; NUM_GRAINS],
    params: GranularParams,
    sample_rate: u32,
    rng: R,
}

impl GranularEffect<SmallRng> {
    /// Create a granular effect with the default generator and coefficients.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::seed_from_u64(DEFAULT_SEED))
    }

    /// Create a granular effect whose grain placement follows `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for GranularEffect<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> GranularEffect<R> {
    /// Create a granular effect drawing grain offsets from `rng`.
    ///
    /// Usable in a `static` initializer when `rng` itself is const-built,
    /// which keeps the capture buffer out of the stack.
    pub const fn with_rng(rng: R) -> Self {
        GranularEffect {
            capture: [0; CAPTURE_LEN],
            write_pos: 0,
            frozen: false,
            grains: [Grain::IDLE; NUM_GRAINS],
            params: GranularParams::DEFAULT,
            sample_rate: crate::constants::REFERENCE_SAMPLE_RATE,
            rng,
        }
    }

    /// Current coefficients.
    pub fn params(&self) -> &GranularParams {
        &self.params
    }

    /// Whether the recorder is stopped.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Next capture index the recorder will write.
    pub fn write_position(&self) -> usize {
        self.write_pos
    }

    /// The captured mono audio.
    pub fn capture(&self) -> &[i16; CAPTURE_LEN] {
        &self.capture
    }

    /// The grain pool.
    pub fn grains(&self) -> &[Grain; NUM_GRAINS] {
        &self.grains
    }

    /// Last rate passed to `set_format`. Grains are rate-independent.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Advance the grains in the active slots by one sample and return
    /// their saturated sum.
    #[inline]
    fn grain_tick(&mut self) -> Q15 {
        let length = self.params.grain_length;
        let window = CAPTURE_LEN - length as usize;
        let mut sum = 0i32;

        for grain in self.grains.iter_mut().take(self.params.density) {
            if grain.active {
                let envelope = grain_envelope(grain.elapsed, length);
                let index = (grain.start + grain.elapsed as usize) % CAPTURE_LEN;
                sum += (Q15(self.capture[index]) * envelope).wide();

                grain.elapsed += 1;
                if grain.elapsed >= length {
                    grain.active = false;
                }
            } else {
                // Start somewhere in the oldest `window` samples so the grain
                // finishes before reaching the recorder's cursor.
                let offset = self.rng.next_u32() as usize % window;
                *grain = Grain {
                    start: (self.write_pos + offset) % CAPTURE_LEN,
                    elapsed: 0,
                    active: true,
                };
            }
        }

        Q15::saturate(sum)
    }
}

impl<R: RngCore> EffectEngine for GranularEffect<R> {
    fn name(&self) -> &'static str {
        "Granular Freeze"
    }

    fn init(&mut self) {
        self.capture.fill(0);
        self.write_pos = 0;
        self.grains = [Grain::IDLE; NUM_GRAINS];

        #[cfg(feature = "tracing")]
        tracing::debug!(
            grain_length = self.params.grain_length,
            density = self.params.density,
            "granular state reset"
        );
    }

    fn set_format(&mut self, _channels: u8, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Enabled means frozen: the recorder stops and grains loop the capture.
    fn set_enabled(&mut self, enabled: bool) {
        self.frozen = enabled;
    }

    fn set_param(&mut self, id: ParamId, value: i16) {
        match id {
            param::WET_MIX => self.params.wet = Q15(value),
            param::DRY_MIX => self.params.dry = Q15(value),
            param::GRAIN_LENGTH => {
                let length = 256 + (value as i32 >> 1);
                self.params.grain_length =
                    length.clamp(MIN_GRAIN_LENGTH as i32, MAX_GRAIN_LENGTH as i32) as u32;
            }
            param::GRAIN_DENSITY => {
                let density = 1 + (value as i32 >> 11);
                self.params.density = density.clamp(1, NUM_GRAINS as i32) as usize;
            }
            _ => {
                #[cfg(feature = "tracing")]
                tracing::trace!(id, value, "granular ignores parameter");
            }
        }
    }

    fn process(&mut self, output: &mut [Sample], input: &[Sample], frames: usize) {
        debug_assert!(input.len() >= frames * CHANNELS);
        debug_assert!(output.len() >= frames * CHANNELS);

        for (out, inp) in output
            .chunks_exact_mut(CHANNELS)
            .zip(input.chunks_exact(CHANNELS).take(frames))
        {
            let left = inp[0].q15();
            let right = inp[1].q15();

            if !self.frozen {
                self.capture[self.write_pos] = ((left.wide() + right.wide()) >> 1) as i16;
                self.write_pos = (self.write_pos + 1) % CAPTURE_LEN;
            }

            let texture = self.grain_tick() * self.params.wet;
            out[0] = Sample::from_q15(left * self.params.dry + texture);
            out[1] = Sample::from_q15(right * self.params.dry + texture);
        }
    }
}
