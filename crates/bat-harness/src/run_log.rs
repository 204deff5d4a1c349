//! Append-only JSONL log of suite run events.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bat_core::RunEvent;

#[derive(Debug, thiserror::Error)]
pub enum RunLogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize run event: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to append to log file {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonlRunLog {
    pub root: PathBuf,
    pub file: PathBuf,
}

impl JsonlRunLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let file = root.join("run.jsonl");
        Self { root, file }
    }

    pub fn ensure_layout(&self) -> Result<(), RunLogError> {
        fs::create_dir_all(&self.root).map_err(|source| RunLogError::CreateDir {
            path: self.root.clone(),
            source,
        })
    }

    pub fn append(&self, event: &RunEvent) -> Result<(), RunLogError> {
        self.ensure_layout()?;
        let line =
            serde_json::to_string(event).map_err(|source| RunLogError::Serialize { source })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .map_err(|source| RunLogError::Append {
                path: self.file.clone(),
                source,
            })?;

        file.write_all(line.as_bytes())
            .map_err(|source| RunLogError::Append {
                path: self.file.clone(),
                source,
            })?;
        file.write_all(b"\n").map_err(|source| RunLogError::Append {
            path: self.file.clone(),
            source,
        })?;
        Ok(())
    }

    pub fn log_path(&self) -> &Path {
        self.file.as_path()
    }
}
