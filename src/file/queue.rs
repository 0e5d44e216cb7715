//! Write Serialization Queue
//!
//! A FIFO channel drained by one writer thread per file handle.
//!
//! ## State Machine
//! ```text
//!   ┌──────┐  dequeue write  ┌─────────┐
//!   │ Idle │ ──────────────► │ Writing │
//!   └──────┘ ◄────────────── └─────────┘
//!             result sent to ticket
//! ```
//! At most one write is in flight per handle. A failed write is reported
//! on its own ticket and the worker moves on to the next entry.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam::channel::{self, Receiver, Sender};

use super::FileContext;
use crate::error::{Result, SqlFileError};

/// Completion handle for one queued write
#[derive(Debug)]
#[must_use = "a write's outcome is only reported through its ticket"]
pub struct WriteTicket {
    done: Receiver<Result<()>>,
}

impl WriteTicket {
    /// Block until the write has been applied and return its outcome
    pub fn wait(self) -> Result<()> {
        self.done.recv().unwrap_or(Err(SqlFileError::WriterClosed))
    }

    /// The outcome, if the write has already been applied
    pub fn try_wait(&self) -> Option<Result<()>> {
        match self.done.try_recv() {
            Ok(result) => Some(result),
            Err(channel::TryRecvError::Empty) => None,
            Err(channel::TryRecvError::Disconnected) => Some(Err(SqlFileError::WriterClosed)),
        }
    }
}

enum WriteCommand {
    Write {
        offset: u64,
        data: Bytes,
        done: Sender<Result<()>>,
    },
    /// Answered once every command queued before it has been handled
    Barrier { done: Sender<()> },
}

#[derive(Default)]
struct QueueState {
    /// Writes submitted but not yet completed
    pending: AtomicUsize,

    /// Idle (false) / Writing (true)
    writing: AtomicBool,
}

/// Owns the channel sender and the writer thread
pub(super) struct WriteQueue {
    sender: Option<Sender<WriteCommand>>,
    worker: Option<JoinHandle<()>>,
    state: Arc<QueueState>,
}

impl WriteQueue {
    /// Spawn the writer thread
    ///
    /// `capacity == 0` makes the queue unbounded; otherwise `submit` blocks
    /// while `capacity` writes are waiting.
    pub(super) fn start(ctx: Arc<FileContext>, capacity: usize) -> Result<Self> {
        let (sender, receiver) = if capacity == 0 {
            channel::unbounded()
        } else {
            channel::bounded(capacity)
        };

        let state = Arc::new(QueueState::default());
        let worker_state = Arc::clone(&state);

        let worker = thread::Builder::new()
            .name(format!("sqlfile-writer:{}", ctx.path()))
            .spawn(move || run_writer(ctx, receiver, worker_state))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            state,
        })
    }

    /// Append a write to the queue
    pub(super) fn submit(&self, offset: u64, data: Bytes) -> Result<WriteTicket> {
        let sender = self.sender.as_ref().ok_or(SqlFileError::WriterClosed)?;
        let (done_tx, done_rx) = channel::bounded(1);

        self.state.pending.fetch_add(1, Ordering::SeqCst);
        let command = WriteCommand::Write {
            offset,
            data,
            done: done_tx,
        };
        if sender.send(command).is_err() {
            self.state.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(SqlFileError::WriterClosed);
        }

        Ok(WriteTicket { done: done_rx })
    }

    /// Block until everything queued so far has been handled
    pub(super) fn flush(&self) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(SqlFileError::WriterClosed)?;
        let (done_tx, done_rx) = channel::bounded(1);

        sender
            .send(WriteCommand::Barrier { done: done_tx })
            .map_err(|_| SqlFileError::WriterClosed)?;
        done_rx.recv().map_err(|_| SqlFileError::WriterClosed)
    }

    pub(super) fn pending(&self) -> usize {
        self.state.pending.load(Ordering::SeqCst)
    }

    pub(super) fn is_writing(&self) -> bool {
        self.state.writing.load(Ordering::SeqCst)
    }

    /// Close the channel and wait for the worker to drain it
    pub(super) fn shutdown(&mut self) -> Result<()> {
        // Dropping the only sender ends the worker's receive loop
        self.sender.take();

        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| {
                tracing::error!("Writer thread panicked");
                SqlFileError::WriterClosed
            })?;
        }
        Ok(())
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Worker loop: one command at a time, in arrival order
fn run_writer(ctx: Arc<FileContext>, receiver: Receiver<WriteCommand>, state: Arc<QueueState>) {
    tracing::debug!("Writer for {:?} started", ctx.path());

    for command in receiver.iter() {
        match command {
            WriteCommand::Write { offset, data, done } => {
                state.writing.store(true, Ordering::SeqCst);
                let result = ctx.exec_write(offset, &data);
                if let Err(ref e) = result {
                    tracing::warn!(
                        "Write of {} bytes at {} to {:?} failed: {}",
                        data.len(),
                        offset,
                        ctx.path(),
                        e
                    );
                }
                state.writing.store(false, Ordering::SeqCst);
                state.pending.fetch_sub(1, Ordering::SeqCst);

                // The submitter may have dropped its ticket
                let _ = done.send(result);
            }
            WriteCommand::Barrier { done } => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Writer for {:?} stopped", ctx.path());
}
