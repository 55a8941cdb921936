//! Domain entities for Bulkhead.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classify::Classification;
use crate::project::ProjectType;

/// Directory key used for files at the top level of the repository.
///
/// Files directly inside a real top-level `root/` directory share this key,
/// so they are counted with the top-level files and use the root thresholds.
pub const ROOT_DIR: &str = "root";

/// Histogram key used for files without an extension.
pub const NO_EXTENSION: &str = "no-extension";

/// Per-directory count of files by lower-cased extension.
///
/// Zero counts are never stored, so the sum of all counts is always the
/// number of files recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, usize>")]
pub struct FileExtensionHistogram(BTreeMap<String, usize>);

impl From<BTreeMap<String, usize>> for FileExtensionHistogram {
    fn from(counts: BTreeMap<String, usize>) -> Self {
        counts.into_iter().collect()
    }
}

impl FileExtensionHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more file with the given extension token.
    pub fn record(&mut self, extension: &str) {
        self.record_many(extension, 1);
    }

    /// Count `count` more files with the given extension token.
    pub fn record_many(&mut self, extension: &str, count: usize) {
        if count == 0 {
            return;
        }
        *self.0.entry(extension.to_lowercase()).or_insert(0) += count;
    }

    /// Total number of files recorded.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Number of distinct extensions recorded.
    pub fn distinct(&self) -> usize {
        self.0.len()
    }

    /// Count for a single extension, zero when absent.
    pub fn count(&self, extension: &str) -> usize {
        self.0
            .get(&extension.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Returns true if no files were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(extension, count)` pairs in extension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + Clone + '_ {
        self.0.iter().map(|(ext, count)| (ext.as_str(), *count))
    }

    /// The most frequent extension; ties resolve to the first in extension order.
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (ext, count) in self.iter() {
            match best {
                Some((_, top)) if top >= count => {}
                _ => best = Some((ext, count)),
            }
        }
        best.map(|(ext, _)| ext)
    }
}

impl<S: AsRef<str>> FromIterator<(S, usize)> for FileExtensionHistogram {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (ext, count) in iter {
            histogram.record_many(ext.as_ref(), count);
        }
        histogram
    }
}

/// Qualitative band a directory's entropy falls into.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum EntropyLevel {
    /// Single-purpose directory.
    Low,
    /// Mixed, worth keeping an eye on.
    Medium,
    /// Boundaries are eroding.
    High,
    /// Boundaries have eroded; only reachable below the root.
    Critical,
}

impl EntropyLevel {
    /// Returns true for the levels that call for a refactor.
    pub fn needs_attention(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    /// Label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for EntropyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entropy statistics for one directory of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntropyStats {
    /// Directory path relative to the repository, or `root`.
    pub path: String,
    /// Number of non-binary files directly inside the directory.
    pub file_count: usize,
    /// File count per extension.
    #[schema(value_type = Object)]
    pub extensions: FileExtensionHistogram,
    /// Shannon entropy of the extension distribution, in bits.
    pub entropy: f64,
    /// Assigned level, absent until classified.
    pub level: Option<EntropyLevel>,
    /// Canned hint for the assigned level.
    pub recommendation: String,
    /// Language of the dominant extension, when recognised.
    pub primary_language: Option<String>,
}

impl DirectoryEntropyStats {
    /// Create an empty, unclassified record for a directory.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_count: 0,
            extensions: FileExtensionHistogram::new(),
            entropy: 0.0,
            level: None,
            recommendation: String::new(),
            primary_language: None,
        }
    }

    /// Count a file with the given extension token.
    pub fn record(&mut self, extension: &str) {
        self.extensions.record(extension);
        self.file_count += 1;
    }

    /// Number of distinct file types in the directory.
    pub fn distinct_types(&self) -> usize {
        self.extensions.distinct()
    }

    /// Returns true for the repository root record.
    pub fn is_root(&self) -> bool {
        self.path == ROOT_DIR
    }

    /// Store the classifier's verdict.
    pub fn apply(&mut self, classification: Classification) {
        self.level = Some(classification.level);
        self.recommendation = classification.recommendation;
    }

    /// Level label, or `Unclassified` before classification.
    pub fn level_label(&self) -> &'static str {
        self.level.map(EntropyLevel::as_str).unwrap_or("Unclassified")
    }
}

/// Result of one directory-entropy analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntropyAnalysis {
    /// Human-readable description of the requested time window.
    pub time_window: String,
    /// Project archetype detected for the snapshot.
    pub project_type: ProjectType,
    /// Number of directories analyzed, including medium ones.
    pub total_dirs: usize,
    /// Mean entropy across all directories.
    pub avg_entropy: f64,
    /// High and critical directories, entropy descending.
    pub high_entropy_dirs: Vec<DirectoryEntropyStats>,
    /// Low directories, entropy descending.
    pub low_entropy_dirs: Vec<DirectoryEntropyStats>,
}

impl DirectoryEntropyAnalysis {
    /// Keep only the first `limit` entries of each bucket.
    pub fn truncate(&mut self, limit: usize) {
        self.high_entropy_dirs.truncate(limit);
        self.low_entropy_dirs.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_ignores_zero_counts_and_lowercases() {
        let histogram: FileExtensionHistogram = [("GO", 2), ("py", 0), ("go", 1)]
            .into_iter()
            .collect();

        assert_eq!(histogram.count("go"), 3);
        assert_eq!(histogram.count("py"), 0);
        assert_eq!(histogram.distinct(), 1);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn dominant_prefers_highest_count_then_name() {
        let histogram: FileExtensionHistogram =
            [("rs", 2), ("md", 2), ("toml", 1)].into_iter().collect();
        assert_eq!(histogram.dominant(), Some("md"));
        assert_eq!(FileExtensionHistogram::new().dominant(), None);
    }

    #[test]
    fn stats_record_keeps_file_count_in_sync() {
        let mut stats = DirectoryEntropyStats::new("src");
        stats.record("rs");
        stats.record("rs");
        stats.record("toml");

        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.file_count, stats.extensions.total());
        assert_eq!(stats.distinct_types(), 2);
        assert_eq!(stats.level_label(), "Unclassified");
        assert!(!stats.is_root());
    }

    #[test]
    fn level_attention_covers_high_and_critical() {
        assert!(EntropyLevel::Critical.needs_attention());
        assert!(EntropyLevel::High.needs_attention());
        assert!(!EntropyLevel::Medium.needs_attention());
        assert!(!EntropyLevel::Low.needs_attention());
        assert_eq!(EntropyLevel::Critical.to_string(), "Critical");
    }

    #[test]
    fn histogram_serializes_as_plain_map() {
        let histogram: FileExtensionHistogram = [("go", 2)].into_iter().collect();
        let json = serde_json::to_string(&histogram).expect("json");
        assert_eq!(json, r#"{"go":2}"#);
    }

    #[test]
    fn histogram_deserialization_drops_zero_counts() {
        let histogram: FileExtensionHistogram =
            serde_json::from_str(r#"{"GO":2,"md":0,"rs":1}"#).expect("json");
        assert_eq!(histogram.distinct(), 2);
        assert_eq!(histogram.count("go"), 2);
        assert_eq!(histogram.count("md"), 0);
        assert_eq!(histogram.total(), 3);
        assert!(histogram.iter().all(|(_, count)| count >= 1));
    }
}
