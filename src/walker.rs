//! # Tree Walking
//!
//! Depth-first enumeration of the regular files under a root. Symlinks are
//! never followed, whether they point at files or directories, so a walk
//! cannot leave the tree or loop. Children are visited in `read_dir` order.
//!
//! Traversal is delegated to [`walkdir`]; this module decides what each
//! entry means for sealing.

use std::collections::HashSet;
use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Symlink,
    Directory,
    Other,
}

impl From<FileType> for EntryKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub extension: Option<String>,
}

impl CandidateFile {
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_owned);
        Self {
            path,
            kind,
            extension,
        }
    }
}

/// Files in discovery order, without duplicate paths.
#[derive(Debug, Default, Clone)]
pub struct CandidateSet {
    files: Vec<CandidateFile>,
    seen: HashSet<PathBuf>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `file` unless its path is already present. Returns whether it
    /// was inserted.
    pub fn insert(&mut self, file: CandidateFile) -> bool {
        if !self.seen.insert(file.path.clone()) {
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&CandidateFile) -> bool) {
        let seen = &mut self.seen;
        self.files.retain(|file| {
            let kept = keep(file);
            if !kept {
                seen.remove(&file.path);
            }
            kept
        });
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateFile> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a CandidateFile;
    type IntoIter = std::slice::Iter<'a, CandidateFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Symlink,
    UnsupportedType,
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub candidates: CandidateSet,
    pub skipped: Vec<SkippedEntry>,
}

/// Walk everything reachable from `root` without following symlinks.
///
/// A missing root yields an empty report. A root that is a regular file
/// yields just that file.
pub fn walk(root: &Path) -> WalkReport {
    let mut report = WalkReport::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                record_error(&mut report, root, err);
                continue;
            }
        };

        let path = entry.path();
        match EntryKind::from(entry.file_type()) {
            EntryKind::RegularFile => {
                report
                    .candidates
                    .insert(CandidateFile::new(path.to_path_buf(), EntryKind::RegularFile));
            }
            EntryKind::Directory => {}
            EntryKind::Symlink => skip(&mut report, path, SkipReason::Symlink),
            EntryKind::Other => skip(&mut report, path, SkipReason::UnsupportedType),
        }
    }

    report
}

fn record_error(report: &mut WalkReport, root: &Path, err: walkdir::Error) {
    let missing_root = err.depth() == 0
        && err
            .io_error()
            .is_some_and(|io| io.kind() == io::ErrorKind::NotFound);
    if missing_root {
        debug!(root = %root.display(), "walk root does not exist");
        return;
    }

    let path = err.path().unwrap_or(root).to_path_buf();
    skip(report, &path, SkipReason::Unreadable(err.to_string()));
}

fn skip(report: &mut WalkReport, path: &Path, reason: SkipReason) {
    match &reason {
        SkipReason::Symlink => debug!(path = %path.display(), "skipping symlink"),
        SkipReason::UnsupportedType => {
            warn!(path = %path.display(), "skipping unexpected file type")
        }
        SkipReason::Unreadable(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable entry")
        }
    }
    report.skipped.push(SkippedEntry {
        path: path.to_path_buf(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout(root: &Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).unwrap();
        }
    }

    fn paths(report: &WalkReport) -> HashSet<PathBuf> {
        report.candidates.iter().map(|c| c.path.clone()).collect()
    }

    #[test]
    fn test_walk_collects_nested_files() {
        let temp = TempDir::new().unwrap();
        layout(temp.path(), &["a.py", "pkg/b.py", "pkg/deep/c.txt", "d.pyc"]);
        fs::create_dir(temp.path().join("empty")).unwrap();

        let report = walk(temp.path());

        let expected: HashSet<PathBuf> = ["a.py", "pkg/b.py", "pkg/deep/c.txt", "d.pyc"]
            .iter()
            .map(|f| temp.path().join(f))
            .collect();
        assert_eq!(paths(&report), expected);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_walk_is_depth_first() {
        let temp = TempDir::new().unwrap();
        layout(temp.path(), &["x/one.py", "x/two.py", "y/three.py"]);

        let report = walk(temp.path());
        let order: Vec<_> = report.candidates.iter().map(|c| c.path.clone()).collect();

        // Files of one directory are contiguous in the listing.
        let pos = |name: &str| order.iter().position(|p| p.ends_with(name)).unwrap();
        assert_eq!(pos("x/one.py").abs_diff(pos("x/two.py")), 1);
    }

    #[test]
    fn test_candidate_extension() {
        let file = CandidateFile::new(PathBuf::from("/a/b.tar.gz"), EntryKind::RegularFile);
        assert_eq!(file.extension.as_deref(), Some("gz"));

        let file = CandidateFile::new(PathBuf::from("/a/Makefile"), EntryKind::RegularFile);
        assert_eq!(file.extension, None);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let report = walk(&temp.path().join("nope"));
        assert!(report.candidates.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_file_root_yields_itself() {
        let temp = TempDir::new().unwrap();
        layout(temp.path(), &["only.py"]);

        let report = walk(&temp.path().join("only.py"));
        assert_eq!(report.candidates.len(), 1);
        assert!(report.candidates.contains(&temp.path().join("only.py")));
    }

    #[test]
    fn test_candidate_set_rejects_duplicates() {
        let mut set = CandidateSet::new();
        let file = CandidateFile::new(PathBuf::from("/x/a.py"), EntryKind::RegularFile);

        assert!(set.insert(file.clone()));
        assert!(!set.insert(file.clone()));
        assert_eq!(set.len(), 1);

        set.retain(|_| false);
        assert!(set.is_empty());
        assert!(set.insert(file));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        layout(outside.path(), &["secret.py", "lib/inner.py"]);
        layout(temp.path(), &["real.py"]);

        symlink(outside.path().join("secret.py"), temp.path().join("link.py")).unwrap();
        symlink(outside.path().join("lib"), temp.path().join("linkdir")).unwrap();
        symlink(temp.path(), temp.path().join("loop")).unwrap();

        let report = walk(temp.path());

        assert_eq!(paths(&report), HashSet::from([temp.path().join("real.py")]));
        assert_eq!(report.skipped.len(), 3);
        assert!(report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::Symlink));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_root_is_skipped() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        layout(temp.path(), &["dir/a.py"]);
        symlink(temp.path().join("dir"), temp.path().join("alias")).unwrap();

        let report = walk(&temp.path().join("alias"));
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::Symlink);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        layout(temp.path(), &["ok.py", "locked/hidden.py"]);
        let locked = temp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user.
        let readable = fs::read_dir(&locked).is_ok();
        let report = walk(temp.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert_eq!(paths(&report), HashSet::from([temp.path().join("ok.py")]));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, locked);
        assert!(matches!(report.skipped[0].reason, SkipReason::Unreadable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_unsupported() {
        use std::process::Command;

        let temp = TempDir::new().unwrap();
        layout(temp.path(), &["ok.py"]);
        let fifo = temp.path().join("pipe.py");
        let status = Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        let report = walk(temp.path());

        assert_eq!(paths(&report), HashSet::from([temp.path().join("ok.py")]));
        assert_eq!(
            report.skipped,
            vec![SkippedEntry {
                path: fifo,
                reason: SkipReason::UnsupportedType,
            }]
        );
    }
}
