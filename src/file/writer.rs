//! Writer
//!
//! Read-modify-write overlay of blocks, gap filling, and size bookkeeping.
//! Only the handle's writer thread calls into this module.

use std::collections::HashMap;

use super::reader::decode_block;
use super::{block_params, corruption, FileContext, MAX_FILE_SIZE};
use crate::block::{BlockRange, BLOCK_SIZE};
use crate::db::schema::{SELECT_BLOCKS, UPDATE_FILE_SIZE, UPSERT_BLOCK};
use crate::db::{Statement, Value};
use crate::error::{Result, SqlFileError};

impl FileContext {
    /// Apply one write
    ///
    /// Steps:
    /// 1. Resolve file metadata
    /// 2. Gap policy: a write starting past EOF is extended backwards with
    ///    zeros so it starts at EOF, leaving no block holes. Gaps larger
    ///    than `max_gap_bytes` are rejected before any block query
    /// 3. Fetch whichever covering blocks already exist
    /// 4. Overlay the data onto each block (existing bytes or zeros)
    /// 5. Upsert the blocks and, if the file grew, its size, in one batch
    /// 6. Raise the cached size once the batch has committed
    ///
    /// An empty write is a no-op and does not extend the file.
    pub(crate) fn exec_write(&self, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let end = offset
            .checked_add(data.len() as u64)
            .filter(|&end| end <= MAX_FILE_SIZE)
            .ok_or(SqlFileError::InvalidRange {
                offset,
                len: data.len() as u64,
            })?;

        let file = self.meta.resolve(self.db.as_ref())?;

        // Gap policy: start at EOF and zero-fill up to `offset`. The zeros
        // are produced per block, never as one buffer.
        let gap = offset.saturating_sub(file.size);
        if gap > self.max_gap_bytes {
            return Err(SqlFileError::GapTooLarge {
                offset,
                file_size: file.size,
                limit: self.max_gap_bytes,
            });
        }
        if gap > 0 {
            tracing::trace!("write {:?}: zero-filling {} bytes from {}", self.path(), gap, file.size);
        }
        let start = offset - gap;
        let gap = usize::try_from(gap).map_err(|_| SqlFileError::InvalidRange {
            offset,
            len: data.len() as u64,
        })?;

        let spans = BlockRange::spans(start, end - start);
        let range = spans.range();

        let mut existing = HashMap::new();
        for mut row in self.db.all(SELECT_BLOCKS, &block_params(file.id, range))? {
            let (seq, block) = decode_block(self.path(), &mut row)?;
            if !range.contains(seq) {
                return Err(corruption(
                    self.path(),
                    format!("block {} returned for range [{}, {}]", seq, range.first, range.last),
                ));
            }
            existing.insert(seq, block);
        }
        let reused = existing.len();

        let mut statements = Vec::with_capacity(spans.len() + 1);
        for span in spans {
            let mut block = existing
                .remove(&span.seq)
                .unwrap_or_else(|| vec![0u8; BLOCK_SIZE]);
            let target = &mut block[span.block_offset..span.block_offset + span.len];

            // Bytes of the span before `gap` are zero fill, the rest is data
            let zeros = gap.saturating_sub(span.buf_offset).min(span.len);
            target[..zeros].fill(0);
            let data_from = (span.buf_offset + zeros).saturating_sub(gap);
            target[zeros..].copy_from_slice(&data[data_from..data_from + (span.len - zeros)]);

            statements.push(Statement::new(
                UPSERT_BLOCK,
                vec![
                    Value::Integer(file.id),
                    Value::Integer(span.seq as i64),
                    Value::Blob(block),
                ],
            ));
        }

        let grows = end > file.size;
        if grows {
            statements.push(Statement::new(
                UPDATE_FILE_SIZE,
                vec![Value::Integer(file.id), Value::Integer(end as i64)],
            ));
        }

        self.db.run_batch(&statements)?;

        if grows {
            self.meta.update_size(end);
        }

        tracing::trace!(
            "write {:?}: offset={} len={} blocks=[{}, {}] reused={} size={}",
            self.path(),
            start,
            end - start,
            range.first,
            range.last,
            reused,
            file.size.max(end)
        );

        Ok(())
    }
}
