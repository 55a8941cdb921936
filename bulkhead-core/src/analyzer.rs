//! End-to-end directory entropy analysis over a snapshot.

use log::{debug, info};
use tokei::LanguageType;

use crate::aggregate::aggregate_directories;
use crate::classify::ThresholdLadder;
use crate::domain::{DirectoryEntropyAnalysis, DirectoryEntropyStats, FileExtensionHistogram};
use crate::entropy::shannon_entropy;
use crate::error::Result;
use crate::project::{ProjectMarkers, ProjectType, detect_project_type};
use crate::report::{assemble_report, average_entropy};
use crate::snapshot::{SnapshotFile, SnapshotSource};

/// Runs the aggregation, entropy, classification and assembly passes.
#[derive(Debug, Clone, Default)]
pub struct EntropyAnalyzer {
    ladder: ThresholdLadder,
}

impl EntropyAnalyzer {
    /// Create an analyzer with the standard threshold ladder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with a custom threshold ladder.
    pub fn with_ladder(ladder: ThresholdLadder) -> Self {
        Self { ladder }
    }

    /// The ladder used for classification.
    pub fn ladder(&self) -> &ThresholdLadder {
        &self.ladder
    }

    /// Read a snapshot and analyze it.
    pub fn analyze<S: SnapshotSource + ?Sized>(
        &self,
        source: &S,
        time_window: &str,
    ) -> Result<DirectoryEntropyAnalysis> {
        let files = source.files()?;
        info!("analyzing {} ({} files)", source.describe(), files.len());
        Ok(self.analyze_files(&files, time_window))
    }

    /// Analyze an already materialized file listing.
    pub fn analyze_files(
        &self,
        files: &[SnapshotFile],
        time_window: &str,
    ) -> DirectoryEntropyAnalysis {
        let project = detect_project_type(&ProjectMarkers::from_files(files));
        info!("detected project type: {}", project.name);

        let mut directories: Vec<DirectoryEntropyStats> =
            aggregate_directories(files).into_values().collect();
        for stats in directories.iter_mut() {
            stats.entropy = shannon_entropy(&stats.extensions);
            stats.primary_language = primary_language(&stats.extensions);
        }

        let avg_entropy = average_entropy(&directories);
        for stats in directories.iter_mut() {
            let classification =
                self.ladder
                    .classify(stats.entropy, avg_entropy, &stats.path, &project);
            stats.apply(classification);
            debug!(
                "{}: {} files, {} types, entropy {:.3} ({})",
                stats.path,
                stats.file_count,
                stats.distinct_types(),
                stats.entropy,
                stats.level_label()
            );
        }

        let analysis = assemble_report(time_window, project, directories);
        info!(
            "{} directories, average entropy {:.3}, {} need attention",
            analysis.total_dirs,
            analysis.avg_entropy,
            analysis.high_entropy_dirs.len()
        );
        analysis
    }
}

/// Analyze a file listing with the standard ladder.
pub fn analyze_snapshot(files: &[SnapshotFile], time_window: &str) -> DirectoryEntropyAnalysis {
    EntropyAnalyzer::new().analyze_files(files, time_window)
}

/// Detect the project archetype of a snapshot without running the analysis.
pub fn detect_snapshot_project<S: SnapshotSource + ?Sized>(source: &S) -> Result<ProjectType> {
    let files = source.files()?;
    Ok(detect_project_type(&ProjectMarkers::from_files(&files)))
}

fn primary_language(histogram: &FileExtensionHistogram) -> Option<String> {
    histogram
        .dominant()
        .and_then(LanguageType::from_file_extension)
        .map(|language| language.name().to_string())
}
