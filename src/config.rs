//! # Run Configuration
//!
//! The run is described by a JSON document:
//!
//! ```json
//! {
//!     "select": "/home/dev/project",
//!     "archive": "/home/dev/project-sealed",
//!     "except": ["vendor", "scripts/setup.py"]
//! }
//! ```
//!
//! `select` and `archive` are absolute paths. `except` is optional and lists
//! paths relative to the archive root that are left untouched. Other keys
//! are ignored.
//!
//! Validation is pure and runs to completion before anything on disk is
//! touched. The first failing check wins, in this order: missing archive,
//! option types, except entries, absoluteness, select existence, then
//! select/archive equality and nesting. Equality and nesting compare the
//! paths after folding `.` and `..` components.

use crate::error::ConfigError;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Validated, immutable options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    select_dir: PathBuf,
    archive_dir: PathBuf,
    exclude_patterns: Vec<PathBuf>,
}

impl RunConfig {
    /// Read and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut options) = value else {
            return Err(ConfigError::Parse(
                "top level must be a JSON object".into(),
            ));
        };

        if !options.contains_key("archive") {
            return Err(ConfigError::MissingArchive);
        }
        let select = as_string(options.get("select"), "select")?;
        let archive = as_string(options.get("archive"), "archive")?;
        let exclude_patterns = match options.remove("except") {
            Some(except) => parse_except(except)?,
            None => Vec::new(),
        };

        if !Path::new(&select).is_absolute() {
            return Err(ConfigError::SelectNotAbsolute(select));
        }
        if !Path::new(&archive).is_absolute() {
            return Err(ConfigError::ArchiveNotAbsolute(archive));
        }
        if !Path::new(&select).is_dir() {
            return Err(ConfigError::SelectNotDirectory(select));
        }

        let select_dir = normalize(Path::new(&select));
        let archive_dir = normalize(Path::new(&archive));
        if select_dir == archive_dir {
            return Err(ConfigError::SelectEqualsArchive(select));
        }
        if archive_dir.starts_with(&select_dir) {
            return Err(ConfigError::ArchiveInsideSelect { select, archive });
        }
        // Replacing the archive would delete the project being cloned.
        if select_dir.starts_with(&archive_dir) {
            return Err(ConfigError::SelectInsideArchive { select, archive });
        }

        Ok(Self {
            select_dir,
            archive_dir,
            exclude_patterns,
        })
    }

    pub fn select_dir(&self) -> &Path {
        &self.select_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Exclusion paths, relative to the archive root, in configured order.
    pub fn exclude_patterns(&self) -> &[PathBuf] {
        &self.exclude_patterns
    }
}

/// Fold `.` and `..` out of an absolute path without touching the
/// filesystem. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn as_string(value: Option<&Value>, option: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(ConfigError::BadType {
            option,
            expected: "string",
        }),
    }
}

fn parse_except(value: Value) -> Result<Vec<PathBuf>, ConfigError> {
    let Value::Array(entries) = value else {
        return Err(ConfigError::BadExceptEntry {
            entry: value.to_string(),
        });
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(s) if is_relative_entry(&s) => Ok(PathBuf::from(s)),
            other => Err(ConfigError::BadExceptEntry {
                entry: other.to_string(),
            }),
        })
        .collect()
}

fn is_relative_entry(entry: &str) -> bool {
    !entry.is_empty()
        && !entry.starts_with(std::path::is_separator)
        && Path::new(entry).is_relative()
}
