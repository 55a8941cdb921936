//! Snapshot sources: the flat list of tracked files an analysis runs over.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BulkheadError, Result};
use crate::fs::FileSystem;

/// Number of leading bytes inspected when sniffing for binary content.
pub const BINARY_SNIFF_LEN: usize = 8000;

/// A tracked file in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// Whether the contents are binary.
    pub is_binary: bool,
}

impl SnapshotFile {
    /// Create a snapshot entry.
    pub fn new(path: impl Into<String>, is_binary: bool) -> Self {
        Self {
            path: path.into(),
            is_binary,
        }
    }
}

/// Something that can list the files of a repository at one point in time.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotSource {
    /// List every tracked file with its binary flag.
    fn files(&self) -> Result<Vec<SnapshotFile>>;
    /// Short description of the snapshot for logs and reports.
    fn describe(&self) -> String;
}

/// Returns true if the bytes look like binary content (contain a NUL byte).
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

/// Snapshot of the files currently on disk.
pub struct WorkingTreeSnapshot<F: FileSystem> {
    fs: F,
    root: PathBuf,
}

impl<F: FileSystem> WorkingTreeSnapshot<F> {
    /// Create a snapshot of `root` using the given filesystem.
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }
}

impl<F: FileSystem> SnapshotSource for WorkingTreeSnapshot<F> {
    fn files(&self) -> Result<Vec<SnapshotFile>> {
        let paths = self.fs.list_files(&self.root)?;
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            let relative = relative.to_string_lossy().replace('\\', "/");
            let prefix = self.fs.read_prefix(&path, BINARY_SNIFF_LEN)?;
            files.push(SnapshotFile::new(relative, looks_binary(&prefix)));
        }
        Ok(files)
    }

    fn describe(&self) -> String {
        format!("working tree at {}", self.root.display())
    }
}

/// Snapshot of a git revision, read with the `git` binary.
#[derive(Debug, Clone)]
pub struct GitSnapshot {
    repo: PathBuf,
    revision: String,
}

impl GitSnapshot {
    /// Create a snapshot of `revision` in the repository at `repo`.
    pub fn new(repo: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            revision: revision.into(),
        }
    }

    /// Revision this snapshot reads.
    pub fn revision(&self) -> &str {
        &self.revision
    }
}

impl SnapshotSource for GitSnapshot {
    fn files(&self) -> Result<Vec<SnapshotFile>> {
        let commit = format!("{}^{{commit}}", self.revision);
        let output = git_output(&self.repo, &["rev-parse", "--verify", "--quiet", &commit])?;
        if !output.status.success() {
            // `--quiet` silences unknown revisions; anything on stderr is another failure.
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("cannot resolve revision {}", self.revision)
            } else {
                stderr.trim().to_string()
            };
            return Err(BulkheadError::git("rev-parse", message));
        }

        let empty_tree = run_git(&self.repo, &["hash-object", "-t", "tree", "--stdin"])?;
        let empty_tree = String::from_utf8_lossy(&empty_tree).trim().to_string();

        // Diffing against the empty tree lists every tracked file once, and
        // numstat reports `-` counts for blobs git considers binary.
        let numstat = run_git(
            &self.repo,
            &[
                "diff",
                "--numstat",
                "--no-renames",
                "--no-ext-diff",
                "--no-textconv",
                "-z",
                &empty_tree,
                &self.revision,
            ],
        )?;

        let files = parse_numstat(&numstat);
        debug!(
            "{} tracked files at {} in {}",
            files.len(),
            self.revision,
            self.repo.display()
        );
        Ok(files)
    }

    fn describe(&self) -> String {
        format!("{} at {}", self.repo.display(), self.revision)
    }
}

fn git_output(repo: &Path, args: &[&str]) -> Result<Output> {
    let operation = args.first().copied().unwrap_or("git");
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| BulkheadError::git(operation, err.to_string()))
}

fn run_git(repo: &Path, args: &[&str]) -> Result<Vec<u8>> {
    let operation = args.first().copied().unwrap_or("git");
    let output = git_output(repo, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        return Err(BulkheadError::git(operation, message));
    }

    Ok(output.stdout)
}

/// Parse `git diff --numstat -z` output into snapshot entries.
pub fn parse_numstat(output: &[u8]) -> Vec<SnapshotFile> {
    String::from_utf8_lossy(output)
        .split('\0')
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let mut fields = record.trim_start_matches('\n').splitn(3, '\t');
            let added = fields.next()?;
            let deleted = fields.next()?;
            let path = fields.next()?;
            if path.is_empty() {
                return None;
            }
            Some(SnapshotFile::new(path, added == "-" && deleted == "-"))
        })
        .collect()
}
