/// Interleaved channels per frame (left, right).
pub const CHANNELS: usize = 2;

/// Sample rate the delay tables are tuned for, in Hz.
pub const REFERENCE_SAMPLE_RATE: u32 = 48_000;

/// Frames per processing quantum (1 ms at the reference rate).
pub const FRAME_LENGTH: usize = 48;

/// Sample containers per processing quantum.
pub const QUANTUM_SAMPLES: usize = FRAME_LENGTH * CHANNELS;

/// Processing quanta held by each ring buffer.
pub const RING_QUANTA: usize = 8;

/// Ring buffer size in sample containers. One slot is never filled.
pub const RING_CAPACITY: usize = RING_QUANTA * QUANTUM_SAMPLES;

/// USB start-of-frame cadence in Hz.
pub const USB_SOF_HZ: u32 = 1000;

/// Highest stream rate the pipeline adopts, in Hz. Faster negotiated rates
/// are clamped to it.
pub const MAX_SAMPLE_RATE: u32 = 96_000;

/// Largest packet one SOF tick may carry at [`MAX_SAMPLE_RATE`]: one spare
/// frame absorbs the fractional remainder at rates that don't divide evenly
/// by the SOF rate.
pub const MAX_PACKET_SAMPLES: usize =
    ((MAX_SAMPLE_RATE / USB_SOF_HZ) as usize + 1) * CHANNELS;
