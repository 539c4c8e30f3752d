use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    /// Config directory cannot be created or written to.
    #[error("Config directory not writable: {0}")]
    DirectoryNotWritable(PathBuf),
    /// File contents are not a valid config tree.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serialising the in-memory value failed.
    #[error("Failed to serialise config: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
