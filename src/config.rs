//! Source configuration, given to the plugin as a JSON blob.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// History file name used when the configuration does not name a path.
pub const DEFAULT_HISTORY_FILE: &str = ".bash_history";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(rename = "Path", alias = "path")]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: PathBuf,
}

impl Config {
    /// Parses `text`, defaulting the path to `$HOME/.bash_history`.
    pub fn parse(text: &str) -> Result<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::parse_with_home(text, home.as_deref())
    }

    /// Like [`Config::parse`] with an explicit home directory.
    pub fn parse_with_home(text: &str, home: Option<&Path>) -> Result<Self> {
        let raw: RawConfig = if text.is_empty() {
            RawConfig::default()
        } else {
            serde_json::from_str(text)?
        };

        let path = match raw.path {
            Some(path) if path.as_os_str().is_empty() => {
                return Err(Error::InvalidPath {
                    message: "configured Path is empty".to_string(),
                });
            }
            Some(path) => path,
            None => match home {
                Some(home) if !home.as_os_str().is_empty() => home.join(DEFAULT_HISTORY_FILE),
                _ => {
                    return Err(Error::InvalidPath {
                        message: "no Path configured and home directory is unknown".to_string(),
                    });
                }
            },
        };

        Ok(Config { path })
    }
}
