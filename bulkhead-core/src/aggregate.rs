//! Grouping of snapshot files into per-directory extension histograms.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::domain::{DirectoryEntropyStats, NO_EXTENSION, ROOT_DIR};
use crate::project::ProjectMarkers;
use crate::snapshot::SnapshotFile;

/// Group non-binary files by containing directory.
///
/// Each record's histogram sums to its file count. Entropy and level are left
/// unset for the later passes.
pub fn aggregate_directories<'a, I>(files: I) -> BTreeMap<String, DirectoryEntropyStats>
where
    I: IntoIterator<Item = &'a SnapshotFile>,
{
    let mut directories: BTreeMap<String, DirectoryEntropyStats> = BTreeMap::new();
    let mut warned_root_collision = false;

    for file in files {
        if file.is_binary {
            debug!("skipping binary file {}", file.path);
            continue;
        }
        let path = normalize_path(&file.path);
        if path.is_empty() {
            warn!("skipping snapshot entry with empty path");
            continue;
        }

        let directory = containing_directory(&path);
        if directory == ROOT_DIR && path.contains('/') && !warned_root_collision {
            warn!(
                "files under a top-level `{ROOT_DIR}/` directory are merged into the repository root record"
            );
            warned_root_collision = true;
        }
        let extension = extension_token(&path);
        directories
            .entry(directory.clone())
            .or_insert_with(|| DirectoryEntropyStats::new(directory))
            .record(&extension);
    }

    directories
}

impl ProjectMarkers {
    /// Collect extensions, base-names and directory names from a snapshot.
    ///
    /// Binary files count as markers too; only their contents are ignored
    /// elsewhere.
    pub fn from_files<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a SnapshotFile>,
    {
        let mut markers = Self::new();
        for file in files {
            let path = normalize_path(&file.path);
            let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let Some(name) = segments.pop() else {
                continue;
            };
            markers.add_file_name(name);
            markers.add_extension(&extension_token(name));
            for directory in segments {
                markers.add_directory(directory);
            }
        }
        markers
    }
}

/// Normalize a repository-relative path to `/` separators without leading `./` or `/`.
pub fn normalize_path(path: &str) -> String {
    let mut out = path.trim().replace('\\', "/");
    loop {
        if let Some(rest) = out.strip_prefix("./") {
            out = rest.to_string();
        } else if let Some(rest) = out.strip_prefix('/') {
            out = rest.to_string();
        } else {
            break;
        }
    }
    out
}

/// Directory containing `path`, or [`ROOT_DIR`] for top-level files.
///
/// A real top-level directory named `root` maps to the same key.
pub fn containing_directory(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() && dir != "." => dir.to_string(),
        _ => ROOT_DIR.to_string(),
    }
}

/// Lower-cased extension of the base name, or [`NO_EXTENSION`].
///
/// Dot-files such as `.gitignore` have no extension.
pub fn extension_token(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}
