//! # Exclusions
//!
//! Removes from a candidate set every file reachable from the configured
//! exclusion paths. Files are matched by filesystem identity, so a file
//! reached through a differently spelled path (`vendor/../vendor/x.py`,
//! `./vendor/x.py`) still matches.

use crate::walker::{walk, CandidateSet};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Token naming the underlying file rather than the path spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileIdentity {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    Canonical(PathBuf),
}

impl FileIdentity {
    pub fn of(path: &Path) -> io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let meta = fs::symlink_metadata(path)?;
            Ok(FileIdentity::Inode {
                dev: meta.dev(),
                ino: meta.ino(),
            })
        }
        #[cfg(not(unix))]
        {
            Ok(FileIdentity::Canonical(fs::canonicalize(path)?))
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExclusionReport {
    /// Candidates removed from the set.
    pub removed: usize,
    /// Patterns that named nothing under the archive.
    pub missing: Vec<PathBuf>,
}

/// Drop from `candidates` every file found under `archive_dir/<pattern>`.
///
/// Patterns naming nothing are ignored.
pub fn resolve_exclusions(
    archive_dir: &Path,
    candidates: &mut CandidateSet,
    patterns: &[PathBuf],
) -> ExclusionReport {
    let mut report = ExclusionReport::default();
    let mut excluded = HashSet::new();

    for pattern in patterns {
        let root = archive_dir.join(pattern);
        if fs::symlink_metadata(&root).is_err() {
            debug!(pattern = %pattern.display(), "exclusion names nothing, ignoring");
            report.missing.push(pattern.clone());
            continue;
        }

        for file in &walk(&root).candidates {
            if let Ok(identity) = FileIdentity::of(&file.path) {
                excluded.insert(identity);
            }
        }
    }

    if excluded.is_empty() {
        return report;
    }

    let before = candidates.len();
    candidates.retain(|file| match FileIdentity::of(&file.path) {
        Ok(identity) => !excluded.contains(&identity),
        Err(_) => true,
    });
    report.removed = before - candidates.len();

    debug!(removed = report.removed, "applied exclusions");
    report
}
