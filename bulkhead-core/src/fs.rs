//! Filesystem abstractions used by working-tree snapshots.

use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{BulkheadError, Result};

const GIT_DIR: &str = ".git";

/// Abstraction over filesystem access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// List the files under `root` that git would consider for tracking.
    ///
    /// `.gitignore` rules apply and the `.git` directory is skipped; other
    /// dot-files are listed.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
    /// Read at most `limit` bytes from the start of a file.
    fn read_prefix(&self, path: &Path, limit: usize) -> Result<Vec<u8>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .ignore(false)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != GIT_DIR)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(walk_error)?;
            if entry.file_type().is_some_and(|file_type| file_type.is_file()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> Result<Vec<u8>> {
        let file = std::fs::File::open(path)?;
        let mut buffer = Vec::with_capacity(limit.min(64 * 1024));
        file.take(limit as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

fn walk_error(error: ignore::Error) -> BulkheadError {
    let message = error.to_string();
    match error.into_io_error() {
        Some(io) => BulkheadError::Io(io),
        None => BulkheadError::Other(message),
    }
}
