//! Report assembly and formatting utilities for Bulkhead outputs.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DirectoryEntropyAnalysis, DirectoryEntropyStats, EntropyLevel};
use crate::project::{ProjectKind, ProjectType};

/// Arithmetic mean of directory entropies, `0.0` when there are none.
pub fn average_entropy(directories: &[DirectoryEntropyStats]) -> f64 {
    if directories.is_empty() {
        return 0.0;
    }
    let total: f64 = directories.iter().map(|stats| stats.entropy).sum();
    total / directories.len() as f64
}

/// Build the analysis result from classified directories.
///
/// Directories are sorted by entropy, highest first (ties keep their input
/// order). High and critical ones go to the high bucket, low ones to the low
/// bucket; medium directories are counted and averaged but not listed.
pub fn assemble_report(
    time_window: &str,
    project_type: ProjectType,
    mut directories: Vec<DirectoryEntropyStats>,
) -> DirectoryEntropyAnalysis {
    let total_dirs = directories.len();
    let avg_entropy = average_entropy(&directories);

    directories.sort_by(|a, b| b.entropy.total_cmp(&a.entropy));

    let mut high_entropy_dirs = Vec::new();
    let mut low_entropy_dirs = Vec::new();
    for stats in directories {
        match stats.level {
            Some(level) if level.needs_attention() => high_entropy_dirs.push(stats),
            Some(EntropyLevel::Low) => low_entropy_dirs.push(stats),
            _ => {}
        }
    }

    DirectoryEntropyAnalysis {
        time_window: time_window.to_string(),
        project_type,
        total_dirs,
        avg_entropy,
        high_entropy_dirs,
        low_entropy_dirs,
    }
}

/// Status of a repository clone or local load operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum CloneStatus {
    /// Clone operation has not started.
    Pending,
    /// Repository was cloned successfully.
    Cloned,
    /// Repository was loaded from a local path.
    Local,
    /// Clone or load failed with an error message.
    Failed(String),
}

/// Directory entropy report for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoEntropyReport {
    /// Repository source (URL or path).
    pub source: String,
    /// Local path used for analysis.
    pub path: PathBuf,
    /// Clone status.
    pub clone_status: CloneStatus,
    /// Description of the snapshot that was read.
    pub snapshot: Option<String>,
    /// Analysis result, when the snapshot could be read.
    pub analysis: Option<DirectoryEntropyAnalysis>,
    /// Errors encountered during analysis.
    pub errors: Vec<String>,
}

impl RepoEntropyReport {
    /// Create a new report for a repository.
    pub fn new(source: String, path: PathBuf) -> Self {
        Self {
            source,
            path,
            clone_status: CloneStatus::Pending,
            snapshot: None,
            analysis: None,
            errors: Vec::new(),
        }
    }

    /// Create a report for a failed repository.
    pub fn failed(source: String, path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            clone_status: CloneStatus::Failed(error.into()),
            ..Self::new(source, path)
        }
    }
}

/// Project detection report for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoProjectReport {
    /// Repository source (URL or path).
    pub source: String,
    /// Local path used for detection.
    pub path: PathBuf,
    /// Clone status.
    pub clone_status: CloneStatus,
    /// Detected archetype.
    pub project_type: Option<ProjectType>,
    /// Errors encountered during detection.
    pub errors: Vec<String>,
}

impl RepoProjectReport {
    /// Create a new detection report.
    pub fn new(source: String, path: PathBuf) -> Self {
        Self {
            source,
            path,
            clone_status: CloneStatus::Pending,
            project_type: None,
            errors: Vec::new(),
        }
    }

    /// Create a detection report for a failed repository.
    pub fn failed(source: String, path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            clone_status: CloneStatus::Failed(error.into()),
            ..Self::new(source, path)
        }
    }
}

/// Render a list of entropy reports as Markdown.
pub fn render_entropy_markdown(reports: &[RepoEntropyReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Bulkhead Directory Entropy Report\n");
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.source);
        append_clone_status(&mut output, &report.clone_status, &report.path);
        match &report.analysis {
            Some(analysis) => {
                append_summary(&mut output, analysis, report.snapshot.as_deref());
                append_directory_table(
                    &mut output,
                    "High entropy directories",
                    &analysis.high_entropy_dirs,
                    "No directories need attention.",
                );
                append_directory_table(
                    &mut output,
                    "Low entropy directories",
                    &analysis.low_entropy_dirs,
                    "No well organized directories found.",
                );
            }
            None => {
                let _ = writeln!(output, "### Summary\nAnalysis unavailable.\n");
            }
        }
        append_errors(&mut output, "Analysis errors", &report.errors);
        let _ = writeln!(output);
    }
    output
}

/// Render a list of project detection reports as Markdown.
pub fn render_project_markdown(reports: &[RepoProjectReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Bulkhead Project Detection Report\n");
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.source);
        append_clone_status(&mut output, &report.clone_status, &report.path);
        match &report.project_type {
            Some(project) => {
                let _ = writeln!(output, "### Project type");
                let _ = writeln!(output, "- Name: {}", project.name);
                let _ = writeln!(output, "- Description: {}", project.description);
                let _ = writeln!(
                    output,
                    "- Root extensions: {}",
                    project.root_extensions.join(", ")
                );
                for (directory, extensions) in &project.directory_expectations {
                    let expected = if extensions.is_empty() {
                        "any".to_string()
                    } else {
                        extensions.join(", ")
                    };
                    let _ = writeln!(output, "- `{directory}/`: {expected}");
                }
                let _ = writeln!(output);
            }
            None => {
                let _ = writeln!(output, "### Project type\nDetection unavailable.\n");
            }
        }
        append_errors(&mut output, "Detection errors", &report.errors);
        let _ = writeln!(output);
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Render the JSON schemas of the analysis types, keyed by schema name.
pub fn render_schema() -> Result<String, serde_json::Error> {
    let schemas: BTreeMap<_, _> = [
        DirectoryEntropyAnalysis::schema(),
        DirectoryEntropyStats::schema(),
        EntropyLevel::schema(),
        ProjectType::schema(),
        ProjectKind::schema(),
    ]
    .into_iter()
    .collect();
    serde_json::to_string_pretty(&schemas)
}

fn append_clone_status(output: &mut String, status: &CloneStatus, path: &PathBuf) {
    let _ = writeln!(output, "- Path: `{}`", path.display());
    match status {
        CloneStatus::Cloned => {
            let _ = writeln!(output, "- Status: cloned");
        }
        CloneStatus::Local => {
            let _ = writeln!(output, "- Status: local");
        }
        CloneStatus::Pending => {
            let _ = writeln!(output, "- Status: pending");
        }
        CloneStatus::Failed(error) => {
            let _ = writeln!(output, "- Status: failed ({error})");
        }
    }
    let _ = writeln!(output);
}

fn append_summary(output: &mut String, analysis: &DirectoryEntropyAnalysis, snapshot: Option<&str>) {
    let _ = writeln!(output, "### Summary");
    if let Some(snapshot) = snapshot {
        let _ = writeln!(output, "- Snapshot: {snapshot}");
    }
    let _ = writeln!(
        output,
        "- Project type: {} ({})",
        analysis.project_type.name, analysis.project_type.description
    );
    let _ = writeln!(output, "- Time window: {}", analysis.time_window);
    let _ = writeln!(output, "- Directories analyzed: {}", analysis.total_dirs);
    let _ = writeln!(
        output,
        "- Average entropy: {:.2} bits",
        analysis.avg_entropy
    );
    let _ = writeln!(output);
}

fn append_directory_table(
    output: &mut String,
    title: &str,
    directories: &[DirectoryEntropyStats],
    empty_message: &str,
) {
    if directories.is_empty() {
        let _ = writeln!(output, "### {title}\n{empty_message}\n");
        return;
    }
    let _ = writeln!(output, "### {title}");
    let _ = writeln!(
        output,
        "| Directory | Files | Types | Entropy | Level | Recommendation |"
    );
    let _ = writeln!(output, "| --- | ---: | ---: | ---: | --- | --- |");
    for stats in directories {
        let _ = writeln!(
            output,
            "| `{}` | {} | {} | {:.2} | {} | {} |",
            escape_cell(&stats.path),
            stats.file_count,
            stats.distinct_types(),
            stats.entropy,
            stats.level_label(),
            escape_cell(&stats.recommendation)
        );
    }
    let _ = writeln!(output);
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn append_errors(output: &mut String, title: &str, errors: &[String]) {
    if errors.is_empty() {
        let _ = writeln!(output, "### {title}\nNo errors reported.\n");
        return;
    }
    let _ = writeln!(output, "### {title}");
    for error in errors {
        let _ = writeln!(output, "- {error}");
    }
    let _ = writeln!(output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::domain::ROOT_DIR;

    fn classified(path: &str, entropy: f64, level: EntropyLevel) -> DirectoryEntropyStats {
        let mut stats = DirectoryEntropyStats::new(path);
        stats.record("rs");
        stats.entropy = entropy;
        stats.apply(Classification {
            level,
            recommendation: format!("{level} hint"),
        });
        stats
    }

    fn generic() -> ProjectType {
        ProjectKind::Generic.project_type()
    }

    #[test]
    fn partitions_by_level_and_drops_medium() {
        let directories = vec![
            classified("a", 1.7, EntropyLevel::High),
            classified("b", 0.2, EntropyLevel::Low),
            classified("c", 1.0, EntropyLevel::Medium),
        ];

        let analysis = assemble_report("all time", generic(), directories);

        assert_eq!(analysis.total_dirs, 3);
        assert_eq!(analysis.high_entropy_dirs.len(), 1);
        assert_eq!(analysis.high_entropy_dirs[0].path, "a");
        assert_eq!(analysis.low_entropy_dirs.len(), 1);
        assert_eq!(analysis.low_entropy_dirs[0].path, "b");
        assert!((analysis.avg_entropy - (1.7 + 0.2 + 1.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn buckets_are_sorted_by_entropy_descending() {
        let directories = vec![
            classified("h1", 1.6, EntropyLevel::High),
            classified("c1", 2.4, EntropyLevel::Critical),
            classified("l1", 0.1, EntropyLevel::Low),
            classified("h2", 1.9, EntropyLevel::High),
            classified("l2", 0.7, EntropyLevel::Low),
            classified(ROOT_DIR, 0.0, EntropyLevel::Low),
        ];

        let analysis = assemble_report("all time", generic(), directories);

        let high: Vec<&str> = analysis
            .high_entropy_dirs
            .iter()
            .map(|stats| stats.path.as_str())
            .collect();
        assert_eq!(high, vec!["c1", "h2", "h1"]);
        let low: Vec<&str> = analysis
            .low_entropy_dirs
            .iter()
            .map(|stats| stats.path.as_str())
            .collect();
        assert_eq!(low, vec!["l2", "l1", ROOT_DIR]);
        for bucket in [&analysis.high_entropy_dirs, &analysis.low_entropy_dirs] {
            assert!(bucket.windows(2).all(|pair| pair[0].entropy >= pair[1].entropy));
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let directories = vec![
            classified("first", 0.0, EntropyLevel::Low),
            classified("second", 0.0, EntropyLevel::Low),
        ];
        let analysis = assemble_report("all time", generic(), directories);
        assert_eq!(analysis.low_entropy_dirs[0].path, "first");
        assert_eq!(analysis.low_entropy_dirs[1].path, "second");
    }

    #[test]
    fn unclassified_directories_are_counted_only() {
        let directories = vec![DirectoryEntropyStats::new("pending")];
        let analysis = assemble_report("all time", generic(), directories);
        assert_eq!(analysis.total_dirs, 1);
        assert!(analysis.high_entropy_dirs.is_empty());
        assert!(analysis.low_entropy_dirs.is_empty());
    }

    #[test]
    fn truncate_keeps_top_entries() {
        let directories = vec![
            classified("a", 2.5, EntropyLevel::Critical),
            classified("b", 1.6, EntropyLevel::High),
            classified("c", 0.3, EntropyLevel::Low),
            classified("d", 0.1, EntropyLevel::Low),
        ];
        let mut analysis = assemble_report("all time", generic(), directories);
        analysis.truncate(1);

        assert_eq!(analysis.high_entropy_dirs.len(), 1);
        assert_eq!(analysis.high_entropy_dirs[0].path, "a");
        assert_eq!(analysis.low_entropy_dirs[0].path, "c");
        assert_eq!(analysis.total_dirs, 4);
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_entropy(&[]), 0.0);
    }

    fn sample_report() -> RepoEntropyReport {
        let mut report = RepoEntropyReport::new(
            "https://example.com/repo.git".to_string(),
            PathBuf::from("/tmp/repo"),
        );
        report.clone_status = CloneStatus::Cloned;
        report.snapshot = Some("/tmp/repo at HEAD".to_string());
        report.analysis = Some(assemble_report(
            "last 30 days",
            ProjectKind::Go.project_type(),
            vec![
                classified("pkg|odd", 2.2, EntropyLevel::Critical),
                classified("cmd", 0.0, EntropyLevel::Low),
            ],
        ));
        report.errors = vec!["partial listing".to_string()];
        report
    }

    #[test]
    fn renders_entropy_markdown() {
        let output = render_entropy_markdown(&[sample_report()]);
        assert!(output.contains("Bulkhead Directory Entropy Report"));
        assert!(output.contains("Status: cloned"));
        assert!(output.contains("Project type: Go"));
        assert!(output.contains("Time window: last 30 days"));
        assert!(output.contains("Average entropy: 1.10 bits"));
        assert!(output.contains("| `pkg\\|odd` | 1 | 1 | 2.20 | Critical | Critical hint |"));
        assert!(output.contains("| `cmd` | 1 | 1 | 0.00 | Low | Low hint |"));
        assert!(output.contains("partial listing"));
    }

    #[test]
    fn renders_markdown_for_failed_reports() {
        let report = RepoEntropyReport::failed(
            "repo".to_string(),
            PathBuf::from("/tmp/repo"),
            "boom",
        );
        let output = render_entropy_markdown(&[report]);
        assert!(output.contains("Status: failed (boom)"));
        assert!(output.contains("Analysis unavailable."));
        assert!(output.contains("No errors reported."));
    }

    #[test]
    fn renders_project_markdown() {
        let mut report = RepoProjectReport::new("repo".to_string(), PathBuf::from("/tmp/repo"));
        report.clone_status = CloneStatus::Local;
        report.project_type = Some(ProjectKind::Rust.project_type());
        let output = render_project_markdown(&[report]);
        assert!(output.contains("Bulkhead Project Detection Report"));
        assert!(output.contains("Status: local"));
        assert!(output.contains("- Name: Rust"));
        assert!(output.contains("- `src/`: rs"));
        assert!(output.contains("- `crates/`: any"));
    }

    #[test]
    fn renders_json_payload() {
        let json = render_json(&vec![sample_report()]).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert!(parsed.is_array());
        assert_eq!(parsed[0]["cloneStatus"]["status"], "cloned");
        let analysis = &parsed[0]["analysis"];
        assert_eq!(analysis["totalDirs"], 2);
        assert_eq!(analysis["projectType"]["kind"], "go");
        assert_eq!(analysis["highEntropyDirs"][0]["level"], "Critical");
        assert_eq!(analysis["highEntropyDirs"][0]["extensions"]["rs"], 1);
    }

    #[test]
    fn renders_schema_for_analysis_types() {
        let json = render_schema().expect("schema");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        for name in [
            "DirectoryEntropyAnalysis",
            "DirectoryEntropyStats",
            "EntropyLevel",
            "ProjectType",
            "ProjectKind",
        ] {
            assert!(parsed.get(name).is_some(), "missing schema {name}");
        }
    }
}
