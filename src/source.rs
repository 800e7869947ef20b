//! Live tail of a growing file exposed as an ordered stream of lines.

use crate::error::{Error, Result};
use crate::reader::TailCursor;
use crate::watcher::{FileWatcher, is_event_relevant_to_file};
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fallback re-read interval for platforms or filesystems that drop
/// watcher events.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One appended line as raw bytes, or the terminal error that ended the tail.
pub type LineNotification = Result<Vec<u8>>;

/// A live cursor into an append-only file.
///
/// Only lines appended after [`LineSource::open`] are delivered, in file
/// order and exactly once. After a terminal error or [`LineSource::close`]
/// the stream ends.
pub struct LineSource {
    path: PathBuf,
    receiver: mpsc::UnboundedReceiver<LineNotification>,
    shutdown_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<JoinHandle<()>>,
}

impl LineSource {
    /// Opens a tail positioned at the current end of `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_poll_interval(path, DEFAULT_POLL_INTERVAL).await
    }

    pub async fn open_with_poll_interval<P: AsRef<Path>>(
        path: P,
        poll_interval: Duration,
    ) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let path_str = file_path.display().to_string();

        // Watch first so nothing appended between positioning and watching is missed.
        let mut watcher = FileWatcher::new(&file_path).map_err(|e| Error::open(&path_str, e))?;
        watcher
            .start_watching()
            .map_err(|e| Error::open(&path_str, e))?;
        let cursor = TailCursor::at_end(&file_path)
            .await
            .map_err(|e| Error::open(&path_str, e))?;

        info!(path = %path_str, offset = cursor.position(), "opened history tail");

        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task_handle = tokio::spawn(tail_task(
            file_path.clone(),
            cursor,
            watcher,
            poll_interval,
            tx,
            shutdown_rx,
        ));

        Ok(LineSource {
            path: file_path,
            receiver: rx,
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
        })
    }

    /// A source fed directly from a channel, with no file behind it.
    #[cfg(test)]
    pub(crate) fn from_receiver(receiver: mpsc::UnboundedReceiver<LineNotification>) -> Self {
        LineSource {
            path: PathBuf::from("<channel>"),
            receiver,
            shutdown_tx: None,
            task_handle: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops the tail and discards any undelivered notifications. Idempotent.
    pub fn close(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task_handle) = self.task_handle.take() {
            task_handle.abort();
            debug!(path = %self.path.display(), "closed history tail");
        }

        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }

    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Drop for LineSource {
    fn drop(&mut self) {
        self.close();
    }
}

impl Stream for LineSource {
    type Item = LineNotification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// Background task: re-reads the file on relevant watcher events and on
/// every poll tick, forwarding complete lines until an error or shutdown.
async fn tail_task(
    file_path: PathBuf,
    mut cursor: TailCursor,
    mut watcher: FileWatcher,
    poll_interval: Duration,
    tx: mpsc::UnboundedSender<LineNotification>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        let should_read = tokio::select! {
            _ = shutdown_rx.recv() => break,

            event = watcher.next_event() => match event {
                Some(Ok(event)) => is_event_relevant_to_file(&event, &file_name),
                Some(Err(e)) => {
                    warn!(path = %file_path.display(), error = %e, "history watcher failed");
                    let _ = tx.send(Err(Error::Watcher(e)));
                    break;
                }
                None => break,
            },

            _ = poll.tick() => true,
        };

        if !should_read {
            continue;
        }

        match cursor.read_new_lines(&file_path).await {
            Ok(lines) => {
                for line in lines {
                    if tx.send(Ok(line)).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(path = %file_path.display(), error = %e, "history tail read failed");
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}
