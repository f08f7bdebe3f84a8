//! Circular delay lines carved out of a caller-owned arena.
//!
//! A reverb needs a couple of dozen delay lines whose lengths depend on the
//! negotiated sample rate. Rather than allocate each one, the owning effect
//! keeps a single `[i16; N]` arena and hands out [`DelayLine`] windows into it
//! through a [`DelayArena`] bump cursor. A line stores only its window and
//! cursor, so rebuilding for a new rate is a matter of re-carving.

use super::q15::Q15;

/// A circular delay line occupying `len` samples of an arena starting at `offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelayLine {
    offset: usize,
    len: usize,
    pos: usize,
}

impl DelayLine {
    /// A zero-length line. Reads return silence and writes are discarded.
    pub const EMPTY: DelayLine = DelayLine {
        offset: 0,
        len: 0,
        pos: 0,
    };

    /// Delay length in samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` for a line with no storage.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current cursor within the line.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read the oldest sample, the one written `len` ticks ago.
    #[inline]
    pub fn read(&self, arena: &[i16]) -> Q15 {
        if self.len == 0 {
            return Q15::ZERO;
        }
        arena.get(self.offset + self.pos).copied().map_or(Q15::ZERO, Q15)
    }

    /// Overwrite the sample under the cursor and advance, wrapping at `len`.
    #[inline]
    pub fn write_advance(&mut self, arena: &mut [i16], value: Q15) {
        if self.len == 0 {
            return;
        }
        if let Some(slot) = arena.get_mut(self.offset + self.pos) {
            *slot = value.raw();
        }
        self.pos += 1;
        if self.pos == self.len {
            self.pos = 0;
        }
    }

    /// Read the delayed sample, store `value` in its place and advance.
    #[inline]
    pub fn exchange(&mut self, arena: &mut [i16], value: Q15) -> Q15 {
        let delayed = self.read(arena);
        self.write_advance(arena, value);
        delayed
    }

    /// Zero this line's window and rewind the cursor.
    pub fn clear(&mut self, arena: &mut [i16]) {
        let end = (self.offset + self.len).min(arena.len());
        if let Some(window) = arena.get_mut(self.offset..end) {
            window.fill(0);
        }
        self.pos = 0;
    }
}

/// Bump allocator handing out consecutive [`DelayLine`] windows.
#[derive(Debug)]
pub struct DelayArena {
    next: usize,
    capacity: usize,
}

impl DelayArena {
    /// Start carving an arena of `capacity` samples.
    pub const fn new(capacity: usize) -> Self {
        DelayArena { next: 0, capacity }
    }

    /// Carve a line of `len` samples. Returns `None` once the arena is exhausted.
    pub fn carve(&mut self, len: usize) -> Option<DelayLine> {
        let end = self.next.checked_add(len)?;
        if end > self.capacity {
            return None;
        }
        let line = DelayLine {
            offset: self.next,
            len,
            pos: 0,
        };
        self.next = end;
        Some(line)
    }

    /// Samples carved so far.
    pub fn used(&self) -> usize {
        self.next
    }
}
