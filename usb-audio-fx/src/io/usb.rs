//! Glue between the USB audio class endpoints and the sample rings.
//!
//! The transport stack owns descriptors, alternate settings and endpoint
//! scheduling. These functions are what its callbacks call:
//!
//! | Callback | Function | Ring role |
//! |----------|----------|-----------|
//! | OUT endpoint receive-complete | [`receive_packet`] | host→device producer |
//! | IN endpoint transmit-need-data (once per SOF) | [`transmit_packet`] | device→host consumer |
//!
//! Packets carry interleaved little-endian 32-bit sample containers whatever
//! the negotiated bit depth.

use crate::constants::{CHANNELS, MAX_PACKET_SAMPLES, MAX_SAMPLE_RATE, REFERENCE_SAMPLE_RATE};
use crate::error::CapacityError;
use crate::io::ring::SampleRing;
use crate::sample::Sample;
use crate::task::clock::SofPacer;

/// Bytes per sample container on the wire.
pub const BYTES_PER_SAMPLE: usize = 4;

/// Largest IN packet, in bytes.
pub const MAX_PACKET_BYTES: usize = MAX_PACKET_SAMPLES * BYTES_PER_SAMPLE;

/// Stream format negotiated with the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Frames per second.
    pub sample_rate: u32,
    /// Significant bits per sample inside the 32-bit container.
    pub bit_depth: u8,
    /// Interleaved channels per frame.
    pub channels: u8,
}

impl StreamConfig {
    /// 48 kHz, 24-bit, stereo.
    pub const DEFAULT: StreamConfig = StreamConfig {
        sample_rate: REFERENCE_SAMPLE_RATE,
        bit_depth: 24,
        channels: CHANNELS as u8,
    };

    /// The rate the pipeline actually runs at: `sample_rate` clamped to
    /// [`MAX_SAMPLE_RATE`].
    pub const fn effective_rate(&self) -> u32 {
        if self.sample_rate > MAX_SAMPLE_RATE {
            MAX_SAMPLE_RATE
        } else {
            self.sample_rate
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Query for the currently negotiated stream format.
pub trait ConfigSource {
    /// The format the host most recently selected.
    fn current_config(&self) -> StreamConfig;
}

impl ConfigSource for StreamConfig {
    fn current_config(&self) -> StreamConfig {
        *self
    }
}

impl<C: ConfigSource + ?Sized> ConfigSource for &C {
    fn current_config(&self) -> StreamConfig {
        (**self).current_config()
    }
}

/// Push one received OUT packet into the host→device ring.
///
/// Returns the number of samples queued. Trailing bytes that do not form a
/// whole container are ignored. The packet is pushed whole or not at all:
/// its full length is checked against the free space before anything is
/// queued, so packets longer than [`MAX_PACKET_SAMPLES`] are decoded in
/// chunks without being cut short. On `Err` the packet has been dropped.
pub fn receive_packet<const N: usize>(
    ring: &SampleRing<N>,
    bytes: &[u8],
) -> Result<usize, CapacityError> {
    let total = bytes.len() / BYTES_PER_SAMPLE;
    if total == 0 {
        return Err(CapacityError::EmptyRequest);
    }

    // Only this producer shrinks the free space, so it can only grow
    // between this check and the pushes below.
    let free = ring.capacity_free();
    if total > free {
        #[cfg(feature = "tracing")]
        tracing::trace!(samples = total, free, "rx packet dropped");
        return Err(CapacityError::Overflow {
            requested: total,
            free,
        });
    }

    let mut samples = [Sample::SILENCE; MAX_PACKET_SAMPLES];
    for words in bytes[..total * BYTES_PER_SAMPLE].chunks(MAX_PACKET_BYTES) {
        let count = words.len() / BYTES_PER_SAMPLE;
        for (slot, chunk) in samples
            .iter_mut()
            .zip(words.chunks_exact(BYTES_PER_SAMPLE))
        {
            let mut word = [0u8; BYTES_PER_SAMPLE];
            word.copy_from_slice(chunk);
            *slot = Sample::from_le_bytes(word);
        }
        ring.push(&samples[..count])?;
    }
    Ok(total)
}

/// Fill one IN packet for the current SOF tick from the device→host ring.
///
/// Returns the number of bytes written to `bytes`. The frame count comes from
/// `pacer` at [`StreamConfig::effective_rate`]; shortfalls are padded as
/// [`SofPacer::fill`] describes. A buffer of [`MAX_PACKET_BYTES`] always
/// holds a full tick.
pub fn transmit_packet<const N: usize>(
    pacer: &mut SofPacer,
    ring: &SampleRing<N>,
    config: &StreamConfig,
    bytes: &mut [u8],
) -> usize {
    let mut samples = [Sample::SILENCE; MAX_PACKET_SAMPLES];
    let room = (bytes.len() / BYTES_PER_SAMPLE).min(MAX_PACKET_SAMPLES);
    let written = pacer.fill(ring, config.effective_rate(), &mut samples[..room]);

    for (chunk, sample) in bytes
        .chunks_exact_mut(BYTES_PER_SAMPLE)
        .zip(&samples[..written])
    {
        chunk.copy_from_slice(&sample.to_le_bytes());
    }
    written * BYTES_PER_SAMPLE
}
