//! Reader
//!
//! Bounds check, block fetch, and reassembly into one contiguous buffer.

use bytes::{Bytes, BytesMut};

use super::{block_params, corruption, FileContext};
use crate::block::{BlockRange, BLOCK_SIZE};
use crate::db::schema::SELECT_BLOCKS;
use crate::db::Row;
use crate::error::{Result, SqlFileError};

impl FileContext {
    /// Read `[offset, offset + size)`
    ///
    /// Steps:
    /// 1. Resolve file metadata
    /// 2. Reject ranges past the end of file (no block query)
    /// 3. Fetch the covering blocks in seq order
    /// 4. Check the rows match what the size implies
    /// 5. Copy each block's intersecting span into the output
    pub(crate) fn read(&self, offset: u64, size: u64) -> Result<Bytes> {
        let file = self.meta.resolve(self.db.as_ref())?;

        let out_of_range = || SqlFileError::OutOfRange {
            offset,
            size,
            file_size: file.size,
        };
        let end = offset.checked_add(size).ok_or_else(out_of_range)?;
        if end > file.size {
            return Err(out_of_range());
        }
        if size == 0 {
            return Ok(Bytes::new());
        }

        let len = usize::try_from(size).map_err(|_| SqlFileError::InvalidRange { offset, len: size })?;
        let spans = BlockRange::spans(offset, size);
        let range = spans.range();

        let rows = self.db.all(SELECT_BLOCKS, &block_params(file.id, range))?;
        if rows.len() as u64 != range.count() {
            return Err(corruption(
                self.path(),
                format!(
                    "expected {} blocks in [{}, {}] for size {}, found {}",
                    range.count(),
                    range.first,
                    range.last,
                    file.size,
                    rows.len()
                ),
            ));
        }

        tracing::trace!(
            "read {:?}: offset={} size={} blocks=[{}, {}]",
            self.path(),
            offset,
            size,
            range.first,
            range.last
        );

        let mut out = BytesMut::zeroed(len);
        for (mut row, span) in rows.into_iter().zip(spans) {
            let (seq, block) = decode_block(self.path(), &mut row)?;
            if seq != span.seq {
                return Err(corruption(
                    self.path(),
                    format!("expected block {}, found block {}", span.seq, seq),
                ));
            }

            let src = &block[span.block_offset..span.block_offset + span.len];
            out[span.buf_offset..span.buf_offset + span.len].copy_from_slice(src);
        }

        Ok(out.freeze())
    }
}

/// Decode a `(seq, data)` block row, checking the block length
pub(super) fn decode_block(path: &str, row: &mut Row) -> Result<(u64, Vec<u8>)> {
    let seq = row.get_i64("seq")?;
    let seq = u64::try_from(seq).map_err(|_| corruption(path, format!("negative block seq {}", seq)))?;

    let data = row.take_blob("data")?;
    if data.len() != BLOCK_SIZE {
        return Err(corruption(
            path,
            format!("block {} is {} bytes, expected {}", seq, data.len(), BLOCK_SIZE),
        ));
    }

    Ok((seq, data))
}
