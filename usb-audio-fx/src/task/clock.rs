//! Start-of-frame pacing for the device→host stream.
//!
//! The host polls the IN endpoint once per USB frame (1 kHz), which does not
//! divide most audio rates. [`SofPacer`] carries the fractional remainder
//! from tick to tick so every tick delivers a whole number of frames while
//! the long-run average matches the sample rate exactly.
//!
//! ```text
//! 44.1 kHz: 44 44 44 44 44 44 44 44 44 45 | 44 44 ...   (441 per 10 ticks)
//! 48 kHz:   48 48 48 48 ...
//! ```

use crate::constants::CHANNELS;
use crate::io::ring::SampleRing;
use crate::sample::{Frame, Sample};

/// Fractional frame accumulator driven by SOF ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SofPacer {
    sof_hz: u32,
    acc: u64,
}

impl SofPacer {
    /// Create a pacer for a tick rate of `sof_hz` (clamped to at least 1).
    pub const fn new(sof_hz: u32) -> Self {
        SofPacer {
            sof_hz: if sof_hz == 0 { 1 } else { sof_hz },
            acc: 0,
        }
    }

    /// Tick rate this pacer divides by.
    pub const fn sof_hz(&self) -> u32 {
        self.sof_hz
    }

    /// Carried remainder, in units of `1 / sof_hz` frames.
    pub const fn remainder(&self) -> u64 {
        self.acc
    }

    /// Forget the carried remainder.
    pub fn reset(&mut self) {
        self.acc = 0;
    }

    /// Advance one tick and return the number of frames owed for it.
    pub fn frames_for_tick(&mut self, sample_rate: u32) -> usize {
        self.acc += sample_rate as u64;
        let frames = self.acc / self.sof_hz as u64;
        self.acc %= self.sof_hz as u64;
        frames as usize
    }

    /// Advance one tick and fill the front of `dst` from `ring`.
    ///
    /// Returns the number of samples written. The request is clamped to the
    /// whole frames that fit in `dst`. When the ring holds less than the
    /// tick needs, the gap repeats the last frame popped; if not even one
    /// frame was available, the gap is silence.
    pub fn fill<const N: usize>(
        &mut self,
        ring: &SampleRing<N>,
        sample_rate: u32,
        dst: &mut [Sample],
    ) -> usize {
        let owed = self.frames_for_tick(sample_rate) * CHANNELS;
        let needed = owed.min(dst.len() - dst.len() % CHANNELS);
        if needed == 0 {
            return 0;
        }

        let have = ring.size();
        let mut copied = have.min(needed);
        copied -= copied % CHANNELS;
        if copied > 0 && ring.pop(&mut dst[..copied]).is_err() {
            copied = 0;
        }

        if copied < needed {
            #[cfg(feature = "tracing")]
            tracing::trace!(needed, copied, "tx ring short, padding packet");

            if copied >= CHANNELS {
                let (filled, gap) = dst[..needed].split_at_mut(copied);
                let mut last: Frame = [Sample::SILENCE; CHANNELS];
                last.copy_from_slice(&filled[copied - CHANNELS..]);
                for frame in gap.chunks_exact_mut(CHANNELS) {
                    frame.copy_from_slice(&last);
                }
            } else {
                dst[copied..needed].fill(Sample::SILENCE);
            }
        }

        needed
    }
}

impl Default for SofPacer {
    fn default() -> Self {
        Self::new(crate::constants::USB_SOF_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_rate_is_constant() {
        let mut pacer = SofPacer::default();
        for _ in 0..100 {
            assert_eq!(pacer.frames_for_tick(48_000), 48);
        }
        assert_eq!(pacer.remainder(), 0);
    }

    #[test]
    fn fractional_rate_carries_remainder() {
        let mut pacer = SofPacer::default();
        let ticks: [usize; 10] = core::array::from_fn(|_| pacer.frames_for_tick(44_100));
        assert_eq!(ticks, [44, 44, 44, 44, 44, 44, 44, 44, 44, 45]);
        assert_eq!(ticks.iter().sum::<usize>(), 441);
        assert_eq!(pacer.remainder(), 0);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let mut pacer = SofPacer::new(0);
        assert_eq!(pacer.sof_hz(), 1);
        assert_eq!(pacer.frames_for_tick(3), 3);
    }

    #[test]
    fn fill_from_full_ring() {
        let ring: SampleRing<256> = SampleRing::new();
        let data: [Sample; 120] = core::array::from_fn(|i| Sample(i as i32));
        ring.push(&data).unwrap();

        let mut pacer = SofPacer::default();
        let mut packet = [Sample(-1); 128];
        assert_eq!(pacer.fill(&ring, 48_000, &mut packet), 96);
        assert_eq!(&packet[..96], &data[..96]);
        assert_eq!(packet[96], Sample(-1));
        assert_eq!(ring.size(), 24);
    }

    #[test]
    fn short_ring_repeats_last_frame() {
        let ring: SampleRing<256> = SampleRing::new();
        ring.push(&[Sample(1), Sample(2), Sample(3), Sample(4), Sample(5)])
            .unwrap();

        let mut pacer = SofPacer::default();
        let mut packet = [Sample(-1); 96];
        assert_eq!(pacer.fill(&ring, 48_000, &mut packet), 96);
        assert_eq!(&packet[..4], &[Sample(1), Sample(2), Sample(3), Sample(4)]);
        for frame in packet[4..].chunks_exact(2) {
            assert_eq!(frame, &[Sample(3), Sample(4)]);
        }
        // The odd sample stays queued for the next tick.
        assert_eq!(ring.size(), 1);
    }

    #[test]
    fn empty_ring_yields_silence() {
        let ring: SampleRing<256> = SampleRing::new();
        let mut pacer = SofPacer::default();
        let mut packet = [Sample(-1); 96];
        assert_eq!(pacer.fill(&ring, 48_000, &mut packet), 96);
        assert!(packet.iter().all(|&s| s == Sample::SILENCE));
    }

    #[test]
    fn request_is_clamped_to_destination() {
        let ring: SampleRing<256> = SampleRing::new();
        let mut pacer = SofPacer::default();
        let mut packet = [Sample(-1); 11];
        assert_eq!(pacer.fill(&ring, 48_000, &mut packet), 10);
        assert_eq!(packet[10], Sample(-1));
    }
}
