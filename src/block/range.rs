//! Block Range Calculator
//!
//! Maps a byte range to the inclusive range of block sequence numbers
//! it touches.

use super::{Spans, BLOCK_SIZE_U64};

/// Inclusive range of block sequence numbers covering a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    /// First block touched (`floor(offset / BLOCK_SIZE)`)
    pub first: u64,

    /// Last block touched (`ceil((offset + size) / BLOCK_SIZE) - 1`)
    pub last: u64,
}

impl BlockRange {
    /// Compute the blocks covering `[offset, offset + size)`
    ///
    /// # Panics
    /// If `size == 0` or `offset + size` overflows. Callers bounds-check
    /// before asking for a range, so either case is a bug.
    pub fn new(offset: u64, size: u64) -> Self {
        assert!(size > 0, "block range of an empty byte range");
        let end = offset
            .checked_add(size)
            .expect("block range end overflows u64");

        let first = offset / BLOCK_SIZE_U64;
        let last = end.div_ceil(BLOCK_SIZE_U64) - 1;
        debug_assert!(last >= first);

        Self { first, last }
    }

    /// Number of blocks in the range (always > 0)
    pub fn count(&self) -> u64 {
        self.last - self.first + 1
    }

    /// Whether `seq` falls inside the range
    pub fn contains(&self, seq: u64) -> bool {
        (self.first..=self.last).contains(&seq)
    }

    /// Iterate the sequence numbers in ascending order
    pub fn seqs(&self) -> std::ops::RangeInclusive<u64> {
        self.first..=self.last
    }

    /// Per-block copy spans for the byte range `[offset, offset + size)`
    ///
    /// See [`BlockSpan`](super::BlockSpan) for the meaning of each field.
    pub fn spans(offset: u64, size: u64) -> Spans {
        Spans::new(Self::new(offset, size), offset, size)
    }
}
