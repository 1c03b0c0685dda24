//! # Archive Pipeline
//!
//! Turns a copy of the selected tree into a sealed archive:
//!
//! ```text
//! confirm overwrite → clone select → walk archive → apply exclusions → transform each file
//! ```
//!
//! Nothing under the selected directory is ever modified. Each source file
//! is written to a temporary sibling first and renamed over the original
//! only after the transform succeeded, so an interrupted run leaves every
//! file either plaintext or fully sealed.

use crate::config::RunConfig;
use crate::error::{Result, SealError};
use crate::exclude::resolve_exclusions;
use crate::progress::{ProgressEvent, ProgressSink, TransformOutcome};
use crate::transform::ByteTransform;
use crate::walker::{walk, CandidateFile};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Which extensions are sealed and which are deleted.
#[derive(Debug, Clone)]
pub struct ExtensionPolicy {
    pub source: Vec<String>,
    pub compiled: Vec<String>,
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self {
            source: vec!["py".into()],
            compiled: vec!["pyc".into(), "pyo".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Seal,
    Delete,
    Keep,
}

impl ExtensionPolicy {
    fn action(&self, file: &CandidateFile) -> Action {
        match file.extension.as_deref() {
            Some(ext) if self.compiled.iter().any(|c| c == ext) => Action::Delete,
            Some(ext) if self.source.iter().any(|s| s == ext) => Action::Seal,
            _ => Action::Keep,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub encrypted: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
    /// Candidates dropped by exclusion paths.
    pub excluded: usize,
    /// Entries the walk refused (symlinks, special files, unreadable).
    pub walk_skipped: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, path: &Path, outcome: &TransformOutcome) {
        match outcome {
            TransformOutcome::Encrypted => self.encrypted += 1,
            TransformOutcome::Deleted => self.deleted += 1,
            TransformOutcome::Skipped => self.skipped += 1,
            TransformOutcome::Failed(err) => self.failed.push((path.to_path_buf(), err.clone())),
        }
    }
}

pub struct Archiver<'a, T: ByteTransform> {
    config: &'a RunConfig,
    transform: &'a T,
    policy: ExtensionPolicy,
}

impl<'a, T: ByteTransform> Archiver<'a, T> {
    pub fn new(config: &'a RunConfig, transform: &'a T) -> Self {
        Self {
            config,
            transform,
            policy: ExtensionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExtensionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Full run: prepare the archive, then seal it.
    ///
    /// `confirm` is asked before an existing archive is removed; declining
    /// yields [`SealError::Declined`] with nothing changed.
    pub fn run(
        &self,
        confirm: impl FnOnce(&Path) -> Result<bool>,
        sink: &mut impl ProgressSink,
    ) -> Result<RunSummary> {
        prepare_archive(self.config, confirm)?;
        Ok(self.seal(sink))
    }

    /// Seal the already cloned archive in place.
    pub fn seal(&self, sink: &mut impl ProgressSink) -> RunSummary {
        let archive_dir = self.config.archive_dir();
        let mut summary = RunSummary::default();

        let report = walk(archive_dir);
        let mut candidates = report.candidates;
        summary.walk_skipped = report.skipped.len();

        let exclusions =
            resolve_exclusions(archive_dir, &mut candidates, self.config.exclude_patterns());
        summary.excluded = exclusions.removed;

        let total = candidates.len();
        info!(total, excluded = summary.excluded, "sealing archive");
        sink.start(total);

        for (i, file) in candidates.iter().enumerate() {
            let outcome = self.process(file);
            summary.record(&file.path, &outcome);
            sink.event(&ProgressEvent {
                index: i + 1,
                total,
                path: file.path.clone(),
                outcome,
            });
        }

        sink.finish();
        summary
    }

    fn process(&self, file: &CandidateFile) -> TransformOutcome {
        let result = match self.policy.action(file) {
            Action::Keep => return TransformOutcome::Skipped,
            Action::Delete => fs::remove_file(&file.path)
                .map(|_| TransformOutcome::Deleted)
                .map_err(SealError::from),
            Action::Seal => {
                seal_in_place(self.transform, &file.path).map(|_| TransformOutcome::Encrypted)
            }
        };

        result.unwrap_or_else(|err| {
            debug!(path = %file.path.display(), error = %err, "transform failed");
            TransformOutcome::Failed(err.to_string())
        })
    }
}

/// Write-then-replace: transform `path` into a temporary sibling, then
/// rename it over `path`. On failure the temporary is removed and `path`
/// is untouched.
pub fn seal_in_place(transform: &impl ByteTransform, path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| SealError::Other(format!("{} has no parent", path.display())))?;
    let name = path.file_name().unwrap_or_default().to_string_lossy();

    let temp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;

    transform
        .encrypt(path, temp.path())
        .map_err(|err| SealError::Transform {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let permissions = fs::metadata(path)?.permissions();
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path)?;
    Ok(())
}

/// Make room for the archive and clone the selected tree into it.
pub fn prepare_archive(
    config: &RunConfig,
    confirm: impl FnOnce(&Path) -> Result<bool>,
) -> Result<()> {
    let archive_dir = config.archive_dir();

    if let Ok(meta) = fs::symlink_metadata(archive_dir) {
        if !confirm(archive_dir)? {
            return Err(SealError::Declined);
        }
        info!(archive = %archive_dir.display(), "removing existing archive");
        if meta.is_dir() {
            fs::remove_dir_all(archive_dir)?;
        } else {
            fs::remove_file(archive_dir)?;
        }
    }

    if let Some(parent) = archive_dir.parent() {
        fs::create_dir_all(parent)?;
    }
    clone_tree(config.select_dir(), archive_dir)
}

/// Recursive copy of `src` into a new directory `dst`. Symlinks are copied
/// as links, never followed.
pub fn clone_tree(src: &Path, dst: &Path) -> Result<()> {
    // Parents are yielded before their contents.
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let from = entry.path();
        let to = if entry.depth() == 0 {
            dst.to_path_buf()
        } else {
            let relative = from
                .strip_prefix(src)
                .map_err(|err| SealError::Other(err.to_string()))?;
            dst.join(relative)
        };
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            copy_symlink(from, &to)?;
        } else if file_type.is_dir() {
            fs::create_dir(&to)?;
            copy_dir_permissions(from, &to)?;
            debug!(from = %from.display(), to = %to.display(), "cloned directory");
        } else if file_type.is_file() {
            fs::copy(from, &to)?;
        } else {
            warn!(path = %from.display(), "not copying special file");
        }
    }

    Ok(())
}

fn copy_dir_permissions(src: &Path, dst: &Path) -> Result<()> {
    let mut permissions = fs::metadata(src)?.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Owner must be able to create and rename entries while sealing.
        permissions.set_mode(permissions.mode() | 0o700);
    }
    #[cfg(not(unix))]
    permissions.set_readonly(false);
    fs::set_permissions(dst, permissions)?;
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, _to: &Path) -> Result<()> {
    warn!(path = %from.display(), "not copying symlink");
    Ok(())
}
