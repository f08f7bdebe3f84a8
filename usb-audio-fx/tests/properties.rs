//! Property-based tests for the rings, the SOF pacer and the effects.
//!
//! Uses proptest to verify the invariants the pipeline relies on: FIFO order
//! and all-or-nothing transfers, exact long-run pacing, bit-exact reverb
//! bypass, and that unknown parameter IDs change nothing.

use std::collections::VecDeque;

use proptest::prelude::*;
use usb_audio_fx::io::SampleRing;
use usb_audio_fx::task::SofPacer;
use usb_audio_fx::{CapacityError, Sample};

/// One step of a producer/consumer schedule.
#[derive(Clone, Debug)]
enum Op {
    Push(Vec<i32>),
    Pop(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(any::<i32>(), 0..40).prop_map(Op::Push),
        (0usize..40).prop_map(Op::Pop),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Against a `VecDeque` model, every accepted pop returns exactly what
    /// was pushed in order, and every rejected transfer leaves the ring as
    /// it was.
    #[test]
    fn ring_matches_fifo_model(ops in prop::collection::vec(op(), 1..120)) {
        let ring: SampleRing<64> = SampleRing::new();
        let mut model: VecDeque<Sample> = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(values) => {
                    let samples: Vec<Sample> = values.into_iter().map(Sample).collect();
                    let free = ring.capacity_free();
                    match ring.push(&samples) {
                        Ok(()) => model.extend(samples.iter().copied()),
                        Err(CapacityError::EmptyRequest) => prop_assert!(samples.is_empty()),
                        Err(CapacityError::Overflow { requested, free: reported }) => {
                            prop_assert_eq!(requested, samples.len());
                            prop_assert_eq!(reported, free);
                            prop_assert!(requested > free);
                        }
                        Err(other) => prop_assert!(false, "unexpected {:?}", other),
                    }
                }
                Op::Pop(n) => {
                    let mut dst = vec![Sample(i32::MIN); n];
                    match ring.pop(&mut dst) {
                        Ok(()) => {
                            let expected: Vec<Sample> = model.drain(..n).collect();
                            prop_assert_eq!(dst, expected);
                        }
                        Err(_) => {
                            prop_assert!(n == 0 || n > model.len());
                            prop_assert!(dst.iter().all(|&s| s == Sample(i32::MIN)));
                        }
                    }
                }
            }
            prop_assert_eq!(ring.size(), model.len());
            prop_assert_eq!(ring.capacity_free(), 63 - model.len());
        }
    }

    /// Push n then pop n empties the ring from any starting offset.
    #[test]
    fn push_pop_round_trip_empties(offset in 0usize..64, n in 1usize..64) {
        let ring: SampleRing<64> = SampleRing::new();
        if offset > 0 {
            let walk = vec![Sample::SILENCE; offset.min(63)];
            ring.push(&walk).unwrap();
            let mut sink = vec![Sample::SILENCE; walk.len()];
            ring.pop(&mut sink).unwrap();
        }

        let data: Vec<Sample> = (0..n as i32).map(Sample).collect();
        ring.push(&data).unwrap();
        let mut out = vec![Sample::SILENCE; n];
        ring.pop(&mut out).unwrap();
        prop_assert_eq!(out, data);
        prop_assert_eq!(ring.size(), 0);
    }

    /// Over T ticks the pacer delivers floor(T * rate / 1000) frames, and
    /// no tick is more than one frame away from the ideal average.
    #[test]
    fn pacer_long_run_rate_is_exact(rate in 8_000u32..=96_000, ticks in 1u64..5_000) {
        let mut pacer = SofPacer::default();
        let floor = rate as usize / 1000;
        let mut total = 0u64;
        for _ in 0..ticks {
            let frames = pacer.frames_for_tick(rate);
            prop_assert!(frames == floor || frames == floor + 1);
            total += frames as u64;
        }
        prop_assert_eq!(total, ticks * rate as u64 / 1000);
    }
}

#[cfg(feature = "dsp")]
mod effects {
    use super::*;
    use usb_audio_fx::constants::{FRAME_LENGTH, QUANTUM_SAMPLES};
    use usb_audio_fx::effects::{GranularEffect, ReverbEffect};
    use usb_audio_fx::EffectEngine;

    fn quantum(values: &[i32]) -> [Sample; QUANTUM_SAMPLES] {
        core::array::from_fn(|i| Sample(values[i % values.len()]))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// A disabled reverb returns its input container-for-container,
        /// including the padding bits, even after it has built up a tail.
        #[test]
        fn reverb_bypass_is_identity(
            warmup in prop::collection::vec(any::<i32>(), 1..96),
            values in prop::collection::vec(any::<i32>(), 1..96),
        ) {
            let mut reverb = Box::new(ReverbEffect::new());
            reverb.init();
            reverb.set_enabled(true);
            let mut out = [Sample::SILENCE; QUANTUM_SAMPLES];
            reverb.process(&mut out, &quantum(&warmup), FRAME_LENGTH);

            reverb.set_enabled(false);
            let input = quantum(&values);
            reverb.process(&mut out, &input, FRAME_LENGTH);
            prop_assert_eq!(out, input);
        }

        /// Setting an unrecognized parameter ID leaves the output unchanged.
        #[test]
        fn unknown_param_changes_nothing(
            id in 8u8..=255,
            value in any::<i16>(),
            values in prop::collection::vec(-30_000i16..30_000, 1..96),
        ) {
            let containers: Vec<i32> = values.iter().map(|&v| (v as i32) << 16).collect();
            let input = quantum(&containers);

            let mut reference = Box::new(ReverbEffect::new());
            let mut tweaked = Box::new(ReverbEffect::new());
            reference.init();
            tweaked.init();
            reference.set_enabled(true);
            tweaked.set_enabled(true);
            tweaked.set_param(id, value);

            let mut a = [Sample::SILENCE; QUANTUM_SAMPLES];
            let mut b = [Sample::SILENCE; QUANTUM_SAMPLES];
            for _ in 0..4 {
                reference.process(&mut a, &input, FRAME_LENGTH);
                tweaked.process(&mut b, &input, FRAME_LENGTH);
                prop_assert_eq!(a, b);
            }

            let mut g_ref = GranularEffect::with_seed(9);
            let mut g_tweaked = GranularEffect::with_seed(9);
            g_ref.init();
            g_tweaked.init();
            g_tweaked.set_param(id, value);
            for _ in 0..4 {
                g_ref.process(&mut a, &input, FRAME_LENGTH);
                g_tweaked.process(&mut b, &input, FRAME_LENGTH);
                prop_assert_eq!(a, b);
            }
        }

        /// Once frozen, no later input reaches the capture buffer.
        #[test]
        fn frozen_capture_is_immutable(
            before in prop::collection::vec(any::<i32>(), 1..96),
            after in prop::collection::vec(any::<i32>(), 1..96),
            blocks in 1usize..40,
        ) {
            let mut granular = GranularEffect::with_seed(1);
            granular.init();
            let mut out = [Sample::SILENCE; QUANTUM_SAMPLES];
            granular.process(&mut out, &quantum(&before), FRAME_LENGTH);

            granular.set_enabled(true);
            let snapshot = *granular.capture();
            let cursor = granular.write_position();
            for _ in 0..blocks {
                granular.process(&mut out, &quantum(&after), FRAME_LENGTH);
            }
            prop_assert_eq!(granular.write_position(), cursor);
            prop_assert!(granular.capture() == &snapshot);
        }
    }
}
