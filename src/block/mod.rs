//! Block Module
//!
//! Pure arithmetic mapping byte ranges onto fixed-size blocks.
//!
//! ## Layout
//! ```text
//!  byte offset:  0          512        1024       1536
//!                ├──────────┼──────────┼──────────┤
//!  seq:          │    0     │    1     │    2     │
//!                └──────────┴──────────┴──────────┘
//!  write(300, 900 bytes)   ▲──────────────────▲
//!                         300               1200
//!  → first = 0, last = 2, count = 3
//!    seq 0: block[300..512]  ← data[0..212]
//!    seq 1: block[0..512]    ← data[212..724]
//!    seq 2: block[0..176]    ← data[724..900]
//! ```
//!
//! No I/O happens here; the reader and writer use these helpers so the
//! offset arithmetic lives in exactly one place.

mod range;
mod span;

pub use range::BlockRange;
pub use span::{BlockSpan, Spans};

/// Size of one block in bytes. Every stored block row is exactly this long.
pub const BLOCK_SIZE: usize = 512;

/// `BLOCK_SIZE` as u64, for offset arithmetic
pub(crate) const BLOCK_SIZE_U64: u64 = BLOCK_SIZE as u64;
