//! Append-aware reading of a growing file.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Read position into a file plus the bytes of a line that has not been
/// terminated yet.
#[derive(Debug, Default)]
pub(crate) struct TailCursor {
    position: u64,
    partial: Vec<u8>,
}

impl TailCursor {
    /// Positions a cursor at the current end of `file_path`.
    pub(crate) async fn at_end(file_path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(file_path).await?;
        if !metadata.is_file() {
            return Err(Error::InvalidPath {
                message: format!("{} is not a regular file", file_path.display()),
            });
        }

        Ok(Self {
            position: metadata.len(),
            partial: Vec::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn at(position: u64) -> Self {
        Self {
            position,
            partial: Vec::new(),
        }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// Reads everything appended since the last call and returns the newly
    /// completed lines in file order. Lines are raw bytes; history files are
    /// not guaranteed to be UTF-8.
    pub(crate) async fn read_new_lines(&mut self, file_path: &Path) -> Result<Vec<Vec<u8>>> {
        let mut file = match File::open(file_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::FileNotFound {
                    path: file_path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let current_size = file.metadata().await?.len();

        if detect_file_truncation(current_size, self.position) {
            return Err(Error::Truncated {
                path: file_path.display().to_string(),
                position: self.position,
                size: current_size,
            });
        }

        let bytes_to_read = match calculate_bytes_to_read(current_size, self.position) {
            Some(bytes) => bytes,
            None => return Ok(Vec::new()),
        };

        file.seek(std::io::SeekFrom::Start(self.position)).await?;

        let mut new_content = Vec::with_capacity(bytes_to_read as usize);
        let read = file
            .take(bytes_to_read)
            .read_to_end(&mut new_content)
            .await?;

        // A writer may be mid-append; only count what we actually got.
        self.position += read as u64;

        Ok(split_complete_lines(&mut self.partial, &new_content))
    }
}

/// Appends `content` to `partial` and drains every newline-terminated line.
/// Whatever follows the last newline stays in `partial`.
fn split_complete_lines(partial: &mut Vec<u8>, content: &[u8]) -> Vec<Vec<u8>> {
    partial.extend_from_slice(content);

    let Some(last_newline) = partial.iter().rposition(|&b| b == b'\n') else {
        return Vec::new();
    };

    let complete: Vec<u8> = partial.drain(..=last_newline).collect();
    complete[..complete.len() - 1]
        .split(|&b| b == b'\n')
        .map(|line| {
            line.strip_suffix(b"\r").unwrap_or(line).to_vec()
        })
        .collect()
}

/// Detect if the file was truncated by comparing current size with last position
fn detect_file_truncation(current_size: u64, last_position: u64) -> bool {
    current_size < last_position
}

/// Calculate bytes to read based on current size and last position
fn calculate_bytes_to_read(current_size: u64, last_position: u64) -> Option<u64> {
    if current_size <= last_position {
        None
    } else {
        Some(current_size - last_position)
    }
}
