//! Block Spans
//!
//! The slice of each block that intersects a byte range, and where that
//! slice sits in the caller's contiguous buffer.

use super::{BlockRange, BLOCK_SIZE_U64};

/// One block's share of a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Block sequence number
    pub seq: u64,

    /// Start of the intersecting bytes inside the block
    pub block_offset: usize,

    /// Start of the same bytes inside the caller's buffer
    pub buf_offset: usize,

    /// Number of intersecting bytes
    pub len: usize,
}

impl BlockSpan {
    /// Whether the span covers the whole block
    pub fn is_full_block(&self) -> bool {
        self.block_offset == 0 && self.len as u64 == BLOCK_SIZE_U64
    }
}

/// Iterator over the spans of a byte range, in ascending `seq` order
#[derive(Debug, Clone)]
pub struct Spans {
    range: BlockRange,
    next_seq: u64,
    start: u64,
    end: u64,
}

impl Spans {
    pub(super) fn new(range: BlockRange, offset: u64, size: u64) -> Self {
        Self {
            range,
            next_seq: range.first,
            start: offset,
            end: offset + size,
        }
    }

    /// The block range being walked
    pub fn range(&self) -> BlockRange {
        self.range
    }
}

impl Iterator for Spans {
    type Item = BlockSpan;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_seq > self.range.last {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;

        let block_start = seq * BLOCK_SIZE_U64;
        let block_end = block_start + BLOCK_SIZE_U64;

        // Intersection of [block_start, block_end) with [start, end)
        let from = self.start.max(block_start);
        let to = self.end.min(block_end);

        Some(BlockSpan {
            seq,
            block_offset: (from - block_start) as usize,
            buf_offset: (from - self.start) as usize,
            len: (to - from) as usize,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.range.last + 1).saturating_sub(self.next_seq) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Spans {}
