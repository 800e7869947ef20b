//! A shell history event source.
//!
//! Follows an append-only history file, turns each newly appended line into
//! an event, and hands events to a polling consumer in bounded batches. Every
//! batch call returns within a fixed soft deadline, reporting a timeout as an
//! ordinary status rather than an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use history_tail::{BashPlugin, BatchStatus, EventSlot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let plugin = BashPlugin::init("")?;
//!     let mut producer = plugin.open("").await?;
//!     let mut slots = EventSlot::batch(16);
//!
//!     loop {
//!         let result = producer.next_batch(&mut slots).await;
//!         for slot in &slots[..result.filled] {
//!             println!("{}", String::from_utf8_lossy(slot.as_bytes()));
//!         }
//!         if let BatchStatus::Failed(e) = result.status {
//!             return Err(e.into());
//!         }
//!     }
//! }
//! ```

mod batch;
mod config;
mod error;
mod plugin;
mod reader;
mod source;
mod watcher;

#[cfg(test)]
mod test_helpers;

pub use batch::{
    BatchProducer, BatchResult, BatchStatus, DEFAULT_BATCH_BUDGET, EventSlot, STATUS_FAILURE,
    STATUS_SUCCESS, STATUS_TIMEOUT,
};
pub use config::{Config, DEFAULT_HISTORY_FILE};
pub use error::{Error, Result};
pub use plugin::{BashPlugin, ExtractRequest, FieldEntry, PluginInfo, Registrar, SHELL_COMMAND_FIELD};
pub use source::{DEFAULT_POLL_INTERVAL, LineNotification, LineSource};

use std::path::Path;

/// Opens a batch session on `path` with the default budget.
///
/// ```rust,no_run
/// use history_tail::{EventSlot, tail_history};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut producer = tail_history("/home/alice/.bash_history").await?;
///     let mut slots = EventSlot::batch(8);
///     let result = producer.next_batch(&mut slots).await;
///     println!("{} new commands", result.filled);
///     Ok(())
/// }
/// ```
pub async fn tail_history<P: AsRef<Path>>(path: P) -> Result<BatchProducer> {
    let source = LineSource::open(path).await?;
    Ok(BatchProducer::new(source))
}
