//! # usb-audio-fx
//!
//! A `no_std`, zero-allocation audio effect pipeline for USB audio class
//! devices, written in pure Rust. The host streams stereo audio to the
//! device, a fixed-point effect processes it in 1 ms quanta, and the result
//! streams back, all without locks or heap use.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Format | [`sample`] / [`dsp`] | 32-bit sample container, saturating Q15 math, delay lines |
//! | Transport | [`io`] | Lock-free SPSC rings and USB packet glue |
//! | Trait | [`engine`] / [`control`] | `EffectEngine` contract and freeze/bypass input |
//! | Effects | [`effects`] | Reverb and granular freeze (feature-gated) |
//! | Scheduling | [`task`] | Cooperative audio task and SOF clock pacer |
//!
//! ## Quick start
//!
//! ```ignore
//! use usb_audio_fx::constants::RING_CAPACITY;
//! use usb_audio_fx::effects::ReverbEffect;
//! use usb_audio_fx::io::{usb, SampleRing, StreamConfig};
//! use usb_audio_fx::task::{AudioTask, SofPacer};
//!
//! static RX: SampleRing<RING_CAPACITY> = SampleRing::new();
//! static TX: SampleRing<RING_CAPACITY> = SampleRing::new();
//! // The delay arena is too large for a small stack; keep it in .bss.
//! static mut REVERB: ReverbEffect = ReverbEffect::new();
//!
//! // SAFETY: taken once at startup; the task owns the only reference.
//! let reverb = unsafe { &mut *core::ptr::addr_of_mut!(REVERB) };
//! let mut task = AudioTask::new(&RX, &TX, reverb, StreamConfig::DEFAULT);
//!
//! // OUT endpoint receive-complete ISR:
//! let _ = usb::receive_packet(&RX, packet);
//!
//! // IN endpoint, once per SOF:
//! let n = usb::transmit_packet(&mut pacer, &TX, &config, &mut in_buf);
//!
//! // Main loop:
//! loop {
//!     let _ = task.run(&usb_config, &mut button);
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `dsp` | yes | Reverb and granular effect implementations |
//! | `button` | yes | GPIO freeze button adapter (requires `embedded-hal`) |
//! | `tracing` | no | Structured logging through `tracing` |
//!
//! ## Audio parameters
//!
//! - **Quantum:** 48 frames ([`constants::FRAME_LENGTH`]), 1 ms at 48 kHz
//! - **Reference rate:** 48 000 Hz ([`constants::REFERENCE_SAMPLE_RATE`])
//! - **Sample format:** Q15 in the upper half of an `i32` container
//! - **Ring size:** 8 quanta ([`constants::RING_CAPACITY`])

#![no_std]

pub mod constants;
pub mod sample;
pub mod error;
pub mod dsp;
pub mod engine;
pub mod control;
pub mod io;
pub mod task;

#[cfg(feature = "dsp")]
pub mod effects;

pub use engine::{EffectEngine, ParamId};
pub use error::CapacityError;
pub use sample::{Frame, Sample};
