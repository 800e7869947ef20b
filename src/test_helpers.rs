//! Test utilities for creating temporary history files.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) struct TempHistoryFile {
    path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TempHistoryFile {
    /// Create a new, empty history file in a fresh temporary directory
    pub(crate) fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join(".bash_history");

        File::create(&path)?;

        Ok(Self {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a history file that already holds one line
    pub(crate) fn with_content(line: &str) -> std::io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append_line(line)?;
        Ok(temp_file)
    }

    /// Append a newline-terminated line
    pub(crate) fn append_line(&self, line: &str) -> std::io::Result<()> {
        self.append_raw(&format!("{}\n", line))
    }

    /// Append bytes exactly as given, without a terminator
    pub(crate) fn append_raw(&self, content: &str) -> std::io::Result<()> {
        self.append_bytes(content.as_bytes())
    }

    /// Append arbitrary bytes, which need not be valid UTF-8
    pub(crate) fn append_bytes(&self, content: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(content)?;
        file.flush()?;
        Ok(())
    }

    /// Truncate the file (simulate `history -c && history -w`)
    pub(crate) fn truncate(&self) -> std::io::Result<()> {
        File::create(&self.path)?;
        Ok(())
    }

    pub(crate) fn remove(&self) -> std::io::Result<()> {
        fs::remove_file(&self.path)
    }

    pub(crate) fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_history_file_creation() {
        let temp_file = TempHistoryFile::new().unwrap();
        assert!(temp_file.path().exists());
        assert_eq!(temp_file.path().parent(), Some(temp_file.dir()));
    }

    #[test]
    fn test_append_line_and_raw() {
        let temp_file = TempHistoryFile::with_content("ls").unwrap();
        temp_file.append_raw("pw").unwrap();
        temp_file.append_raw("d\n").unwrap();

        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "ls\npwd\n");
    }

    #[test]
    fn test_truncate_and_remove() {
        let temp_file = TempHistoryFile::with_content("initial").unwrap();
        temp_file.truncate().unwrap();
        assert!(fs::read_to_string(temp_file.path()).unwrap().is_empty());

        temp_file.remove().unwrap();
        assert!(!temp_file.path().exists());
    }
}
