//! Bounded batch production under a per-call soft deadline.

use crate::error::Error;
use crate::source::LineSource;
use futures::StreamExt;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep};
use tracing::debug;

/// Time budget given to every [`BatchProducer::next_batch`] call.
pub const DEFAULT_BATCH_BUDGET: Duration = Duration::from_millis(30);

/// Status code reported to the host for a successful or partial fill.
pub const STATUS_SUCCESS: i32 = 0;
/// Status code reported to the host for an unrecoverable error.
pub const STATUS_FAILURE: i32 = 1;
/// Status code reported to the host when the budget ran out.
pub const STATUS_TIMEOUT: i32 = -1;

/// A reusable write target for one event.
///
/// Slots belong to the caller and are handed back and forth across calls.
/// Anything past the filled prefix of a batch is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSlot {
    data: Vec<u8>,
}

impl EventSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `count` empty slots.
    pub fn batch(count: usize) -> Vec<EventSlot> {
        vec![EventSlot::default(); count]
    }

    /// Replaces the slot contents, reusing its allocation.
    pub fn write(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// How a batch call ended.
#[derive(Debug)]
pub enum BatchStatus {
    /// Every offered slot was filled.
    Complete,
    /// The budget ran out first. Not an error: the file was idle.
    TimedOut,
    /// The session hit an unrecoverable error. The filled prefix is valid.
    Failed(Error),
}

impl BatchStatus {
    /// The numeric status of the host batch protocol.
    pub fn code(&self) -> i32 {
        match self {
            BatchStatus::Complete => STATUS_SUCCESS,
            BatchStatus::TimedOut => STATUS_TIMEOUT,
            BatchStatus::Failed(_) => STATUS_FAILURE,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BatchStatus::TimedOut)
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            BatchStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of one [`BatchProducer::next_batch`] call.
#[derive(Debug)]
pub struct BatchResult {
    /// Number of leading slots that were written.
    pub filled: usize,
    pub status: BatchStatus,
}

impl BatchResult {
    pub fn into_parts(self) -> (usize, BatchStatus) {
        (self.filled, self.status)
    }
}

enum FillState {
    Filling,
    Full,
    TimedOut,
    Failed(Error),
}

/// Drives one tail session, packing appended lines into caller slots.
pub struct BatchProducer {
    source: LineSource,
    budget: Duration,
    deadline: Pin<Box<Sleep>>,
}

impl BatchProducer {
    /// Must be called from within a tokio runtime.
    pub fn new(source: LineSource) -> Self {
        Self::with_budget(source, DEFAULT_BATCH_BUDGET)
    }

    pub fn with_budget(source: LineSource, budget: Duration) -> Self {
        Self {
            source,
            budget,
            deadline: Box::pin(tokio::time::sleep(budget)),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    /// Fills a prefix of `slots` with lines appended to the file.
    ///
    /// Returns as soon as every slot is filled, the source fails, or the
    /// budget measured from this call's start runs out, whichever is first.
    /// Lines already queued win over an expired deadline.
    pub async fn next_batch(&mut self, slots: &mut [EventSlot]) -> BatchResult {
        self.deadline
            .as_mut()
            .reset(Instant::now() + self.budget);

        let mut filled = 0;
        let mut state = FillState::Filling;

        let status = loop {
            state = match state {
                FillState::Filling if filled == slots.len() => FillState::Full,
                FillState::Filling => tokio::select! {
                    biased;

                    notification = self.source.next() => match notification {
                        Some(Ok(line)) => {
                            slots[filled].write(&line);
                            filled += 1;
                            FillState::Filling
                        }
                        Some(Err(e)) => FillState::Failed(e),
                        None => FillState::Failed(Error::SessionClosed),
                    },

                    _ = self.deadline.as_mut() => FillState::TimedOut,
                },
                FillState::Full => break BatchStatus::Complete,
                FillState::TimedOut => break BatchStatus::TimedOut,
                FillState::Failed(e) => break BatchStatus::Failed(e),
            };
        };

        debug!(
            path = %self.source.path().display(),
            filled,
            offered = slots.len(),
            status = status.code(),
            "batch produced"
        );

        BatchResult { filled, status }
    }

    /// Ends the session. Idempotent.
    pub fn close(&mut self) {
        self.source.close();
    }
}
