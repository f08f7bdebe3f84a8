//! The cooperative audio task and its transmit-side pacer.
//!
//! ```text
//!  USB OUT ISR ──push──▶ [input ring] ──pop 96──▶ AudioTask::run
//!                                                    │ effect.process
//!  USB IN ISR ◀──SofPacer::fill── [output ring] ◀──push 96──┘
//! ```
//!
//! [`AudioTask::run`] is called from the firmware's main loop. It never
//! blocks and processes at most one quantum per call.

pub mod clock;

pub use clock::SofPacer;

use crate::constants::{FRAME_LENGTH, QUANTUM_SAMPLES};
use crate::control::BypassInput;
use crate::engine::{EffectEngine, ParamId};
use crate::error::CapacityError;
use crate::io::ring::SampleRing;
use crate::io::usb::{ConfigSource, StreamConfig};
use crate::sample::Sample;

/// Outcome of one [`AudioTask::run`] call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// The host changed the sample rate. The effect was rebuilt and no audio
    /// was processed this call.
    FormatChanged {
        /// The newly adopted rate.
        sample_rate: u32,
    },
    /// One quantum moved from the input ring to the output ring.
    Processed,
    /// Less than one quantum was buffered; nothing happened.
    Starved,
}

/// Running counters, readable at any time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Quanta processed and queued for transmit.
    pub processed: u32,
    /// Calls that found less than a quantum waiting.
    pub starved: u32,
    /// Processed quanta the output ring rejected.
    pub dropped: u32,
    /// Sample-rate changes adopted.
    pub format_changes: u32,
}

/// Drains the input ring one quantum at a time through an effect into the
/// output ring.
///
/// The task is the input ring's consumer and the output ring's producer.
pub struct AudioTask<'a, E, const N: usize> {
    input: &'a SampleRing<N>,
    output: &'a SampleRing<N>,
    effect: E,
    sample_rate: u32,
    scratch_in: [Sample; QUANTUM_SAMPLES],
    scratch_out: [Sample; QUANTUM_SAMPLES],
    stats: TaskStats,
}

impl<'a, E: EffectEngine, const N: usize> AudioTask<'a, E, N> {
    /// Bind `effect` between two rings and prepare it for `config`.
    ///
    /// `effect` may be a `&mut` to an effect living in a `static`, which
    /// keeps large delay arenas off the stack.
    pub fn new(
        input: &'a SampleRing<N>,
        output: &'a SampleRing<N>,
        mut effect: E,
        config: StreamConfig,
    ) -> Self {
        let sample_rate = config.effective_rate();
        effect.set_format(config.channels, sample_rate);
        effect.init();

        AudioTask {
            input,
            output,
            effect,
            sample_rate,
            scratch_in: [Sample::SILENCE; QUANTUM_SAMPLES],
            scratch_out: [Sample::SILENCE; QUANTUM_SAMPLES],
            stats: TaskStats::default(),
        }
    }

    /// One main-loop iteration.
    ///
    /// A sample-rate change is handled alone: the effect is rebuilt and the
    /// call returns without touching the rings. Rates above
    /// [`MAX_SAMPLE_RATE`](crate::constants::MAX_SAMPLE_RATE) are adopted
    /// clamped, matching what the transmit side paces at. Otherwise `bypass` is
    /// sampled and applied, and one quantum is processed if available.
    ///
    /// `Err` means the output ring was too full; the processed quantum was
    /// dropped and the task is ready for the next call.
    pub fn run<C, B>(&mut self, config: &C, bypass: &mut B) -> Result<TaskStatus, CapacityError>
    where
        C: ConfigSource + ?Sized,
        B: BypassInput + ?Sized,
    {
        let current = config.current_config();
        let sample_rate = current.effective_rate();
        if sample_rate != self.sample_rate {
            #[cfg(feature = "tracing")]
            tracing::info!(
                from = self.sample_rate,
                to = sample_rate,
                requested = current.sample_rate,
                effect = self.effect.name(),
                "sample rate changed, rebuilding effect"
            );

            self.sample_rate = sample_rate;
            self.effect.set_format(current.channels, sample_rate);
            self.effect.init();
            self.stats.format_changes = self.stats.format_changes.wrapping_add(1);
            return Ok(TaskStatus::FormatChanged { sample_rate });
        }

        self.effect.set_enabled(bypass.is_active());

        if self.input.size() < QUANTUM_SAMPLES {
            self.stats.starved = self.stats.starved.wrapping_add(1);
            return Ok(TaskStatus::Starved);
        }

        self.input.pop(&mut self.scratch_in)?;
        self.effect
            .process(&mut self.scratch_out, &self.scratch_in, FRAME_LENGTH);

        match self.output.push(&self.scratch_out) {
            Ok(()) => {
                self.stats.processed = self.stats.processed.wrapping_add(1);
                Ok(TaskStatus::Processed)
            }
            Err(err) => {
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                Err(err)
            }
        }
    }

    /// Forward a parameter change to the effect.
    pub fn set_param(&mut self, id: ParamId, value: i16) {
        self.effect.set_param(id, value);
    }

    /// The effect being driven.
    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Mutable access to the effect, for control-side updates.
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Sample rate the effect is currently built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Counters since construction.
    pub fn stats(&self) -> TaskStats {
        self.stats
    }
}
