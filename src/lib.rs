//! # srcseal
//!
//! Clone a project tree and encrypt its Python sources in place, so the
//! project can be distributed without exposing plaintext source.
//!
//! ## Quick Start
//!
//! ```bash
//! cat > seal.json << 'EOF'
//! {
//!     "select": "/home/dev/project",
//!     "archive": "/home/dev/project-sealed",
//!     "except": ["vendor", "setup.py"]
//! }
//! EOF
//!
//! srcseal seal.json --key-file project.key
//! ```
//!
//! Without `--key-file` a fresh key is generated and written next to the
//! archive as `<archive>.key`.
//!
//! ## What Happens to Each File
//!
//! | File | Result |
//! |---|---|
//! | `*.py` | Sealed with AES-256-GCM, same path, same permissions |
//! | `*.pyc`, `*.pyo` | Deleted |
//! | Anything else | Copied unchanged |
//! | Under an `except` path | Copied unchanged |
//! | Symlink | Copied as a link, never followed or sealed |
//!
//! The selected directory itself is never modified. If the archive already
//! exists the operator is asked before it is replaced.
//!
//! ## Crash Safety
//!
//! Each source is sealed into a temporary sibling which is renamed over the
//! original only after sealing succeeded. A file that fails to seal stays
//! plaintext, the run carries on with the remaining files, and the process
//! exits non-zero at the end.
//!
//! ## Single Files
//!
//! ```bash
//! srcseal-file module.py module.sealed.py --key-file project.key
//! srcseal-file --decrypt module.sealed.py module.py --key-file project.key
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - JSON run configuration and validation
//! - [`walker`] - Symlink-refusing tree enumeration
//! - [`exclude`] - Exclusion by filesystem identity
//! - [`archive`] - Clone and seal pipeline
//! - [`transform`] - File-level sealing primitive
//! - [`progress`] - Progress events and the terminal bar
//! - [`crypto`] / [`key`] - AES-256-GCM key and key files
//! - [`prompt`] - Overwrite confirmation
//! - [`error`] - Error types

pub mod archive;
pub mod config;
pub mod crypto;
pub mod error;
pub mod exclude;
pub mod key;
pub mod progress;
pub mod prompt;
pub mod transform;
pub mod walker;

pub use archive::{Archiver, ExtensionPolicy, RunSummary};
pub use config::RunConfig;
pub use crypto::CryptoKey;
pub use error::{ConfigError, Result, SealError};
pub use key::KeyFile;
pub use progress::{BarSink, ProgressEvent, ProgressSink, TransformOutcome};
pub use transform::{AesTransform, ByteTransform, XorTransform};
