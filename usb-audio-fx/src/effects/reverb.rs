//! Fixed-point Schroeder–Moorer reverb.
//!
//! Per channel, every sample runs through:
//!
//! ```text
//!  dry ─► pre-delay ─┬─► comb 0 ─┐
//!                    ├─► comb 1 ─┤
//!                    │    ...    ├─Σ─► allpass 0 ─► … ─► allpass 3 ─► wet
//!                    └─► comb 7 ─┘
//!
//!  out = (dry·DRY + wet·WET) · MASTER
//! ```
//!
//! Each comb has a one-pole lowpass in its feedback path (damping) and a
//! feedback gain derived from a target T60. Left and right use different
//! prime-ish delay tables for stereo decorrelation; the channels never mix.
//!
//! All delay lines live in one arena owned by the effect, so a format change
//! re-carves the arena instead of allocating. The default arena holds the
//! reference-rate tables; a larger `A` in [`ReverbEffect<A>`] keeps the delay
//! times exact up to [`ReverbEffect::max_scaled_rate`].

use crate::constants::{CHANNELS, REFERENCE_SAMPLE_RATE};
use crate::dsp::{gain_q16, DelayArena, DelayLine, Q15};
use crate::engine::{param, EffectEngine, ParamId};
use crate::sample::Sample;

/// Parallel comb filters per channel.
pub const NUM_COMBS: usize = 8;

/// Serial allpass filters per channel.
pub const NUM_ALLPASSES: usize = 4;

/// Pre-delay at the reference rate (20 ms).
pub const PREDELAY_SAMPLES: usize = 960;

/// Upper bound on comb feedback; keeps every loop strictly stable.
pub const MAX_FEEDBACK: f32 = 0.98;

/// Comb delay lengths at the reference rate, left then right.
const COMB_DELAYS: [[usize; NUM_COMBS]; CHANNELS] = [
    [509, 863, 1481, 2521, 4273, 7253, 10007, 15013],
    [523, 877, 1489, 2531, 4283, 7283, 10037, 15031],
];

/// Allpass delay lengths at the reference rate, left then right.
const ALLPASS_DELAYS: [[usize; NUM_ALLPASSES]; CHANNELS] = [
    [142, 396, 1071, 3079],
    [145, 399, 1073, 3081],
];

/// Target decay time (seconds to -60 dB) of each comb.
const COMB_T60: [f32; NUM_COMBS] = [0.25, 0.30, 0.40, 0.80, 2.00, 6.00, 10.00, 20.00];

/// Level at which each comb's output enters the wet sum.
const COMB_OUTPUT_GAIN: [Q15; NUM_COMBS] = [
    Q15::from_f32(0.62),
    Q15::from_f32(0.60),
    Q15::from_f32(0.58),
    Q15::from_f32(0.55),
    Q15::from_f32(0.52),
    Q15::from_f32(0.50),
    Q15::from_f32(0.48),
    Q15::from_f32(0.45),
];

const fn table_sum(table: &[usize]) -> usize {
    let mut sum = 0;
    let mut i = 0;
    while i < table.len() {
        sum += table[i];
        i += 1;
    }
    sum
}

/// Arena size: every delay line of both channels at the reference rate.
pub const ARENA_LEN: usize = table_sum(&COMB_DELAYS[0])
    + table_sum(&COMB_DELAYS[1])
    + table_sum(&ALLPASS_DELAYS[0])
    + table_sum(&ALLPASS_DELAYS[1])
    + PREDELAY_SAMPLES * CHANNELS;

/// Tunable reverb coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReverbParams {
    /// Direct signal level.
    pub dry: Q15,
    /// Reverberated signal level.
    pub wet: Q15,
    /// Comb feedback damping: 0 = bright, 1 = dark.
    pub damping: Q15,
    /// Allpass diffusion gain.
    pub allpass_gain: Q15,
    /// Output make-up gain, Q16.16.
    pub master_gain: i32,
    /// Multiplier applied to the T60 table.
    pub decay_scale: f32,
}

impl ReverbParams {
    /// The tuned defaults.
    pub const DEFAULT: ReverbParams = ReverbParams {
        dry: Q15::from_f32(0.50),
        wet: Q15::from_f32(0.50),
        damping: Q15::from_f32(0.40),
        allpass_gain: Q15::from_f32(0.50),
        master_gain: gain_q16(1.50),
        decay_scale: 1.0,
    };

    #[inline]
    fn mix(&self, dry: Q15, wet: Q15) -> Q15 {
        (dry * self.dry + wet * self.wet).scale_q16(self.master_gain)
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Feedback comb with a one-pole lowpass in the loop.
#[derive(Clone, Copy, Debug)]
struct CombFilter {
    line: DelayLine,
    feedback: Q15,
    damp: Q15,
    /// Lowpass memory.
    filt: Q15,
}

impl CombFilter {
    const EMPTY: CombFilter = CombFilter {
        line: DelayLine::EMPTY,
        feedback: Q15::ZERO,
        damp: Q15::ZERO,
        filt: Q15::ZERO,
    };

    /// Returns the delayed sample; feeds `input` plus the damped feedback back in.
    #[inline]
    fn process(&mut self, arena: &mut [i16], input: Q15) -> Q15 {
        let delayed = self.line.read(arena);
        let feedback = delayed * self.feedback;
        self.filt = self.filt * (Q15::ONE - self.damp) + feedback * self.damp;
        self.line.write_advance(arena, input + self.filt);
        delayed
    }
}

/// Schroeder allpass diffuser.
#[derive(Clone, Copy, Debug)]
struct AllpassFilter {
    line: DelayLine,
    gain: Q15,
}

impl AllpassFilter {
    const EMPTY: AllpassFilter = AllpassFilter {
        line: DelayLine::EMPTY,
        gain: Q15::ZERO,
    };

    #[inline]
    fn process(&mut self, arena: &mut [i16], input: Q15) -> Q15 {
        let delayed = self.line.read(arena);
        let output = delayed - input * self.gain;
        self.line.write_advance(arena, input + output * self.gain);
        output
    }
}

/// One channel's reverb network.
#[derive(Clone, Copy, Debug)]
struct ReverbChannel {
    predelay: DelayLine,
    combs: [CombFilter; NUM_COMBS],
    allpasses: [AllpassFilter; NUM_ALLPASSES],
}

impl ReverbChannel {
    const EMPTY: ReverbChannel = ReverbChannel {
        predelay: DelayLine::EMPTY,
        combs: [CombFilter::EMPTY; NUM_COMBS],
        allpasses: [AllpassFilter::EMPTY; NUM_ALLPASSES],
    };

    /// Run one dry sample through the network and return the wet sample.
    #[inline]
    fn tick(&mut self, arena: &mut [i16], dry: Q15) -> Q15 {
        let pre = self.predelay.exchange(arena, dry);

        let mut sum = 0i32;
        for (comb, gain) in self.combs.iter_mut().zip(COMB_OUTPUT_GAIN) {
            sum += (comb.process(arena, pre) * gain).wide();
        }

        let mut wet = Q15::saturate(sum);
        for allpass in self.allpasses.iter_mut() {
            wet = allpass.process(arena, wet);
        }
        wet
    }
}

/// Scale a reference-rate delay length to `rate`.
fn scaled_len(len: usize, rate: u32) -> usize {
    ((len as u64 * rate as u64) / REFERENCE_SAMPLE_RATE as u64).max(1) as usize
}

/// `10^(-3 · len / rate / T60)`, capped at [`MAX_FEEDBACK`].
fn comb_feedback(len: usize, sample_rate: u32, t60: f32) -> Q15 {
    let gain = libm::powf(10.0, -3.0 * len as f32 / sample_rate as f32 / t60);
    Q15::from_f32(gain.min(MAX_FEEDBACK))
}

/// Stereo fixed-point reverb over an `A`-sample delay arena.
///
/// Delay lengths follow the stream rate up to [`max_scaled_rate`]; faster
/// streams keep the lengths of that rate, which shortens the delay times.
/// `A` must be at least [`ARENA_LEN`].
///
/// [`max_scaled_rate`]: ReverbEffect::max_scaled_rate
///
/// # Example
/// ```ignore
/// // Exact delay times up to 96 kHz.
/// static mut REVERB: ReverbEffect<{ 2 * ARENA_LEN }> =
///     ReverbEffect::with_params(ReverbParams::DEFAULT);
///
/// let reverb = unsafe { &mut *core::ptr::addr_of_mut!(REVERB) };
/// reverb.set_format(2, 96_000);
/// reverb.process(&mut out, &input, FRAME_LENGTH);
/// ```
pub struct ReverbEffect<const A: usize = ARENA_LEN> {
    arena: [i16; A],
    channels: [ReverbChannel; CHANNELS],
    params: ReverbParams,
    sample_rate: u32,
    enabled: bool,
    /// Delay lines carved for `sample_rate`.
    ready: bool,
}

impl ReverbEffect {
    /// Create a reverb with default coefficients at the reference rate.
    ///
    /// Delay lines are carved on [`init`](EffectEngine::init) or
    /// [`set_format`](EffectEngine::set_format); until then `process` passes
    /// audio through untouched.
    pub const fn new() -> Self {
        Self::with_params(ReverbParams::DEFAULT)
    }
}

impl<const A: usize> ReverbEffect<A> {
    /// Create a reverb with custom coefficients.
    pub const fn with_params(params: ReverbParams) -> Self {
        const { assert!(A >= ARENA_LEN, "reverb arena smaller than the reference tables") };
        ReverbEffect {
            arena: [0; A],
            channels: [ReverbChannel::EMPTY; CHANNELS],
            params,
            sample_rate: REFERENCE_SAMPLE_RATE,
            enabled: true,
            ready: false,
        }
    }

    /// Highest rate whose scaled delay lines fit the arena.
    pub const fn max_scaled_rate() -> u32 {
        (A as u64 * REFERENCE_SAMPLE_RATE as u64 / ARENA_LEN as u64) as u32
    }

    /// Current coefficients.
    pub fn params(&self) -> &ReverbParams {
        &self.params
    }

    /// Rate the delay lines are currently scaled for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether the reverb is mixed into the output.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Delay length of comb `index` on `channel`, if carved.
    pub fn comb_len(&self, channel: usize, index: usize) -> Option<usize> {
        let comb = self.channels.get(channel)?.combs.get(index)?;
        self.ready.then_some(comb.line.len())
    }

    /// Feedback gain of comb `index` on `channel`.
    pub fn comb_feedback(&self, channel: usize, index: usize) -> Option<Q15> {
        let comb = self.channels.get(channel)?.combs.get(index)?;
        self.ready.then_some(comb.feedback)
    }

    /// Pre-delay length in samples, if carved.
    pub fn predelay_len(&self) -> Option<usize> {
        self.ready.then_some(self.channels[0].predelay.len())
    }

    /// Carve every delay line for the current rate and clear all state.
    fn rebuild(&mut self) {
        let max_rate = Self::max_scaled_rate();
        #[cfg(feature = "tracing")]
        if self.sample_rate > max_rate {
            tracing::warn!(
                sample_rate = self.sample_rate,
                max_rate,
                "reverb arena too small for this rate; delay times shortened"
            );
        }

        let rate = self.sample_rate.min(max_rate);
        let mut carver = DelayArena::new(A);
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            *channel = ReverbChannel::EMPTY;
            // At `max_rate` the scaled tables sum to at most `A`, so carving
            // cannot run out; an exhausted arena would only leave a line silent.
            channel.predelay = carver
                .carve(scaled_len(PREDELAY_SAMPLES, rate))
                .unwrap_or(DelayLine::EMPTY);
            for (comb, &len) in channel.combs.iter_mut().zip(&COMB_DELAYS[ch]) {
                comb.line = carver
                    .carve(scaled_len(len, rate))
                    .unwrap_or(DelayLine::EMPTY);
                comb.damp = self.params.damping;
            }
            for (allpass, &len) in channel.allpasses.iter_mut().zip(&ALLPASS_DELAYS[ch]) {
                allpass.line = carver
                    .carve(scaled_len(len, rate))
                    .unwrap_or(DelayLine::EMPTY);
                allpass.gain = self.params.allpass_gain;
            }
        }
        self.arena.fill(0);
        self.update_feedback();
        self.ready = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = rate,
            arena_used = carver.used(),
            arena_len = A,
            "reverb delay lines carved"
        );
    }

    /// Derive every comb's feedback gain from its length and scaled T60.
    fn update_feedback(&mut self) {
        let rate = self.sample_rate.max(1);
        let scale = self.params.decay_scale;
        for channel in self.channels.iter_mut() {
            for (comb, &t60) in channel.combs.iter_mut().zip(&COMB_T60) {
                comb.feedback = comb_feedback(comb.line.len(), rate, t60 * scale);
            }
        }
    }
}

impl Default for ReverbEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl<const A: usize> EffectEngine for ReverbEffect<A> {
    fn name(&self) -> &'static str {
        "Schroeder-Moorer Reverb"
    }

    fn init(&mut self) {
        self.rebuild();
    }

    fn set_format(&mut self, _channels: u8, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.rebuild();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_param(&mut self, id: ParamId, value: i16) {
        match id {
            param::WET_MIX => self.params.wet = Q15(value),
            param::DRY_MIX => self.params.dry = Q15(value),
            param::DAMPING => {
                self.params.damping = Q15(value);
                for comb in self.channels.iter_mut().flat_map(|c| c.combs.iter_mut()) {
                    comb.damp = Q15(value);
                }
            }
            param::ALLPASS_GAIN => {
                self.params.allpass_gain = Q15(value);
                for allpass in self.channels.iter_mut().flat_map(|c| c.allpasses.iter_mut()) {
                    allpass.gain = Q15(value);
                }
            }
            param::MASTER_GAIN => self.params.master_gain = (value as i32) << 3,
            param::DECAY if value > 0 => {
                self.params.decay_scale = value as f32 / 16384.0;
                self.update_feedback();
            }
            _ => {
                #[cfg(feature = "tracing")]
                tracing::trace!(id, value, "reverb ignores parameter");
            }
        }
    }

    fn process(&mut self, output: &mut [Sample], input: &[Sample], frames: usize) {
        debug_assert!(input.len() >= frames * CHANNELS);
        debug_assert!(output.len() >= frames * CHANNELS);

        let frames_in = input.chunks_exact(CHANNELS).take(frames);
        let frames_out = output.chunks_exact_mut(CHANNELS);

        if !self.ready {
            for (out, inp) in frames_out.zip(frames_in) {
                out.copy_from_slice(inp);
            }
            return;
        }

        for (out, inp) in frames_out.zip(frames_in) {
            for (ch, (o, &i)) in out.iter_mut().zip(inp).enumerate() {
                let dry = i.q15();
                // The network keeps running while bypassed so a re-enable
                // picks up a live tail instead of a stale one.
                let wet = self.channels[ch].tick(&mut self.arena, dry);
                *o = if self.enabled {
                    Sample::from_q15(self.params.mix(dry, wet))
                } else {
                    i
                };
            }
        }
    }
}
