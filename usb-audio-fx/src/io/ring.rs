//! Lock-free single-producer single-consumer ring of sample containers.
//!
//! Decouples the USB interrupt handlers from the cooperative audio task.
//! Transfers are bulk and all-or-nothing: a push or pop either moves every
//! requested sample or leaves the ring exactly as it was.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`push()`](SampleRing::push) (the "producer").
//! - Only ONE context may call [`pop()`](SampleRing::pop) (the "consumer").
//! - Producer and consumer may run concurrently (main loop vs. USB ISR).
//!
//! # Ordering
//!
//! Each side publishes its index with `Release` only after its cell copies
//! are complete, and loads the other side's index with `Acquire` before
//! touching cells. The consumer therefore never sees a `write` index that
//! covers cells the producer hasn't finished writing, and vice versa for
//! `read`. [`size()`](SampleRing::size) and
//! [`capacity_free()`](SampleRing::capacity_free) are snapshots: they are
//! exact for the calling side's next transfer and conservative for the other.

use core::cell::UnsafeCell;
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::CapacityError;
use crate::sample::Sample;

/// A lock-free SPSC ring holding up to `N - 1` sample containers.
///
/// One slot is permanently left empty so that `read == write` always means
/// "empty" and never "full".
///
/// # Type Parameters
///
/// - `N`: Total number of slots. Usable capacity is `N - 1`. Must be ≥ 2.
pub struct SampleRing<const N: usize> {
    buffer: UnsafeCell<[Sample; N]>,
    /// Next slot to fill (only modified by the producer).
    write: AtomicUsize,
    /// Next slot to drain (only modified by the consumer).
    read: AtomicUsize,
}

// SAFETY: The SPSC contract guarantees `write` is only stored by the
// producer and `read` only by the consumer. Cells between `read` and
// `write` belong to the consumer, the rest to the producer, and the
// acquire/release pairs on the indices hand ownership across.
unsafe impl<const N: usize> Sync for SampleRing<N> {}

impl<const N: usize> SampleRing<N> {
    /// Create an empty ring.
    ///
    /// # Panics
    ///
    /// Compile-time assertion: `N` must be at least 2 (usable capacity is `N - 1`).
    pub const fn new() -> Self {
        assert!(N >= 2, "sample ring must have at least 2 slots (1 usable)");

        SampleRing {
            buffer: UnsafeCell::new([Sample::SILENCE; N]),
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
        }
    }

    /// Maximum number of samples the ring can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of buffered samples.
    pub fn size(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        Self::distance(read, write)
    }

    /// Number of samples that can be pushed right now.
    pub fn capacity_free(&self) -> usize {
        (N - 1) - self.size()
    }

    /// `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Copy all of `samples` in (producer side).
    ///
    /// Fails without side effects if `samples` is empty or larger than
    /// [`capacity_free()`](Self::capacity_free).
    pub fn push(&self, samples: &[Sample]) -> Result<(), CapacityError> {
        let n = samples.len();
        if n == 0 {
            return Err(CapacityError::EmptyRequest);
        }

        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        let free = (N - 1) - Self::distance(read, write);
        if n > free {
            return Err(CapacityError::Overflow { requested: n, free });
        }

        let first = n.min(N - write);
        let base = self.buffer.get().cast::<Sample>();
        // SAFETY: We are the sole producer. `n <= free` means the slots
        // `write..write+n` (mod N) are outside the consumer's `read..write`
        // window, and both chunks stay inside the array.
        unsafe {
            ptr::copy_nonoverlapping(samples.as_ptr(), base.add(write), first);
            ptr::copy_nonoverlapping(samples.as_ptr().add(first), base, n - first);
        }

        // Release: the cell writes above are visible before the new index.
        self.write.store((write + n) % N, Ordering::Release);
        Ok(())
    }

    /// Copy exactly `dst.len()` samples out (consumer side).
    ///
    /// Fails without side effects if `dst` is empty or longer than
    /// [`size()`](Self::size).
    pub fn pop(&self, dst: &mut [Sample]) -> Result<(), CapacityError> {
        let n = dst.len();
        if n == 0 {
            return Err(CapacityError::EmptyRequest);
        }

        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        let available = Self::distance(read, write);
        if n > available {
            return Err(CapacityError::Underflow {
                requested: n,
                available,
            });
        }

        let first = n.min(N - read);
        let base = self.buffer.get().cast::<Sample>().cast_const();
        // SAFETY: We are the sole consumer. `n <= available` means the slots
        // `read..read+n` (mod N) were published by the producer's release
        // store, which our acquire load above synchronised with.
        unsafe {
            ptr::copy_nonoverlapping(base.add(read), dst.as_mut_ptr(), first);
            ptr::copy_nonoverlapping(base, dst.as_mut_ptr().add(first), n - first);
        }

        // Release: our reads complete before the producer may reuse the slots.
        self.read.store((read + n) % N, Ordering::Release);
        Ok(())
    }

    /// Drop everything buffered. Requires exclusive access to both sides.
    pub fn clear(&mut self) {
        *self.read.get_mut() = 0;
        *self.write.get_mut() = 0;
    }

    #[inline]
    fn distance(read: usize, write: usize) -> usize {
        (write + N - read) % N
    }
}

impl<const N: usize> Default for SampleRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
