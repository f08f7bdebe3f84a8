//! Sample transport between the USB endpoints and the audio task.
//!
//! ## Components
//!
//! | Item | Producer | Consumer | Description |
//! |------|----------|----------|-------------|
//! | [`SampleRing`] (rx) | USB OUT ISR | [`AudioTask`](crate::task::AudioTask) | Host → device audio |
//! | [`SampleRing`] (tx) | [`AudioTask`](crate::task::AudioTask) | USB IN ISR | Device → host audio |
//!
//! ## Utilities
//!
//! - [`usb`]: Packet encode/decode and the negotiated [`StreamConfig`]
//! - [`ring`]: Lock-free single-producer single-consumer sample ring
//!
//! ## Packet layout
//!
//! Both endpoints carry interleaved stereo frames of little-endian 32-bit
//! containers:
//! - Each container holds one channel's Q15 sample in its upper 16 bits
//! - A 48 kHz stream moves 48 frames (384 bytes) per USB frame
//! - Fractional rates alternate packet sizes, e.g. 44 or 45 frames at 44.1 kHz
//! - Rates above [`MAX_SAMPLE_RATE`](crate::constants::MAX_SAMPLE_RATE) are
//!   clamped to it, so no packet exceeds [`MAX_PACKET_BYTES`](usb::MAX_PACKET_BYTES)

pub mod ring;
pub mod usb;

pub use ring::SampleRing;
pub use usb::{ConfigSource, StreamConfig};
