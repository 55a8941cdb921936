#![deny(missing_docs)]
//! Bulkhead core library.
//!
//! Measures how mixed the file types inside each directory of a repository
//! are, using Shannon entropy over extension frequencies, and classifies
//! directories as well-bounded or boundary-eroded.

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod domain;
pub mod entropy;
pub mod error;
pub mod fs;
pub mod project;
pub mod report;
pub mod snapshot;

pub use aggregate::aggregate_directories;
pub use analyzer::{EntropyAnalyzer, analyze_snapshot, detect_snapshot_project};
pub use classify::{Classification, ThresholdLadder, ThresholdTier, classify};
pub use domain::{
    DirectoryEntropyAnalysis, DirectoryEntropyStats, EntropyLevel, FileExtensionHistogram,
    NO_EXTENSION, ROOT_DIR,
};
pub use entropy::{entropy_of_counts, shannon_entropy};
pub use error::{BulkheadError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use project::{
    ProjectKind, ProjectMarkers, ProjectType, detect_project_type, is_expected_file_type,
};
pub use report::{
    CloneStatus, RepoEntropyReport, RepoProjectReport, assemble_report, average_entropy,
    render_entropy_markdown, render_json, render_project_markdown, render_schema,
};
pub use snapshot::{GitSnapshot, SnapshotFile, SnapshotSource, WorkingTreeSnapshot};
