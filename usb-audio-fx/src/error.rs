//! Recoverable capacity errors reported by the ring buffers.
//!
//! Nothing on the audio path is fatal: a rejected transfer leaves the ring
//! untouched and the caller drops or retries on its next cycle.

use thiserror::Error;

/// A ring transfer that could not be satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// A push or pop of zero samples.
    #[error("transfer of zero samples")]
    EmptyRequest,
    /// A push larger than the free space.
    #[error("push of {requested} samples exceeds {free} free")]
    Overflow {
        /// Samples offered.
        requested: usize,
        /// Free slots at the time of the call.
        free: usize,
    },
    /// A pop larger than the buffered data.
    #[error("pop of {requested} samples exceeds {available} buffered")]
    Underflow {
        /// Samples asked for.
        requested: usize,
        /// Samples buffered at the time of the call.
        available: usize,
    },
}
