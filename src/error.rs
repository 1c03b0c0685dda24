use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("Invalid key format (expected 32 raw bytes or 64 hex characters)")]
    InvalidKeyFormat,

    #[error("Overwrite of existing archive declined")]
    Declined,

    #[error("Failed to transform {}: {message}", path.display())]
    Transform { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

impl From<tempfile::PersistError> for SealError {
    fn from(err: tempfile::PersistError) -> Self {
        SealError::Io(err.error)
    }
}

/// Validation failures for the run configuration. Raised before any
/// filesystem mutation happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse configuration: {0}")]
    Parse(String),

    #[error("no \"archive\" option, specify where to save the encrypted directory")]
    MissingArchive,

    #[error("unexpected type of \"{option}\" option, {expected} needed")]
    BadType {
        option: &'static str,
        expected: &'static str,
    },

    #[error("\"except\" entry {entry} is not a relative path string")]
    BadExceptEntry { entry: String },

    #[error("select directory '{0}' is not an absolute path")]
    SelectNotAbsolute(String),

    #[error("archive directory '{0}' is not an absolute path")]
    ArchiveNotAbsolute(String),

    #[error("select directory '{0}' is not a directory")]
    SelectNotDirectory(String),

    #[error("select directory and archive directory cannot be the same path: '{0}'")]
    SelectEqualsArchive(String),

    #[error("archive directory '{archive}' lies inside select directory '{select}'")]
    ArchiveInsideSelect { select: String, archive: String },

    #[error("select directory '{select}' lies inside archive directory '{archive}'")]
    SelectInsideArchive { select: String, archive: String },
}

pub type Result<T> = std::result::Result<T, SealError>;
