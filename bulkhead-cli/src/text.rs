//! Plain-text rendering for terminal output.

use std::fmt::Write;

use bulkhead_core::{
    CloneStatus, DirectoryEntropyStats, EntropyLevel, RepoEntropyReport, RepoProjectReport,
};

const PATH_HEADER: &str = "DIRECTORY";

pub(crate) fn render_entropy_text(reports: &[RepoEntropyReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let _ = writeln!(output, "Source: {}", report.source);
        let _ = writeln!(output, "Path: {}", report.path.display());
        if !append_status(&mut output, &report.clone_status) {
            continue;
        }

        match &report.analysis {
            Some(analysis) => {
                if let Some(snapshot) = &report.snapshot {
                    let _ = writeln!(output, "Snapshot: {snapshot}");
                }
                let _ = writeln!(
                    output,
                    "Project type: {} ({})",
                    analysis.project_type.name, analysis.project_type.description
                );
                let _ = writeln!(output, "Time window: {}", analysis.time_window);
                let _ = writeln!(output, "Directories analyzed: {}", analysis.total_dirs);
                let _ = writeln!(output, "Average entropy: {:.2} bits", analysis.avg_entropy);
                append_table(
                    &mut output,
                    "High entropy directories (need attention)",
                    &analysis.high_entropy_dirs,
                );
                append_table(
                    &mut output,
                    "Low entropy directories (well organized)",
                    &analysis.low_entropy_dirs,
                );
            }
            None => {
                let _ = writeln!(output, "Analysis: unavailable");
            }
        }

        append_errors(&mut output, "Analysis errors", &report.errors);
        let _ = writeln!(output);
    }
    output
}

pub(crate) fn render_project_text(reports: &[RepoProjectReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let _ = writeln!(output, "Source: {}", report.source);
        let _ = writeln!(output, "Path: {}", report.path.display());
        if !append_status(&mut output, &report.clone_status) {
            continue;
        }

        match &report.project_type {
            Some(project) => {
                let _ = writeln!(output, "Project type: {}", project.name);
                let _ = writeln!(output, "Description: {}", project.description);
                let _ = writeln!(
                    output,
                    "Root extensions: {}",
                    project.root_extensions.join(", ")
                );
                let _ = writeln!(output, "Conventional directories:");
                for (directory, extensions) in &project.directory_expectations {
                    if extensions.is_empty() {
                        let _ = writeln!(output, "- {directory}/: any");
                    } else {
                        let _ = writeln!(output, "- {directory}/: {}", extensions.join(", "));
                    }
                }
            }
            None => {
                let _ = writeln!(output, "Project type: unavailable");
            }
        }

        append_errors(&mut output, "Detection errors", &report.errors);
        let _ = writeln!(output);
    }
    output
}

/// Writes the status line; returns false when there is nothing more to show.
fn append_status(output: &mut String, status: &CloneStatus) -> bool {
    match status {
        CloneStatus::Cloned => {
            let _ = writeln!(output, "Status: cloned");
            true
        }
        CloneStatus::Local => {
            let _ = writeln!(output, "Status: local");
            true
        }
        CloneStatus::Failed(error) => {
            let _ = writeln!(output, "Status: failed ({error})");
            let _ = writeln!(output);
            false
        }
        CloneStatus::Pending => {
            let _ = writeln!(output, "Status: pending");
            let _ = writeln!(output);
            false
        }
    }
}

fn append_table(output: &mut String, title: &str, directories: &[DirectoryEntropyStats]) {
    if directories.is_empty() {
        let _ = writeln!(output, "{title}: none");
        return;
    }

    let width = directories
        .iter()
        .map(|stats| stats.path.chars().count())
        .max()
        .unwrap_or(0)
        .max(PATH_HEADER.len());

    let _ = writeln!(output, "{title}:");
    let _ = writeln!(
        output,
        "   {PATH_HEADER:<width$}  {:>5}  {:>5}  {:>7}  {:<8}  RECOMMENDATION",
        "FILES", "TYPES", "ENTROPY", "LEVEL"
    );
    for stats in directories {
        let _ = writeln!(
            output,
            "{} {:<width$}  {:>5}  {:>5}  {:>7.3}  {:<8}  {}",
            marker(stats.level),
            stats.path,
            stats.file_count,
            stats.distinct_types(),
            stats.entropy,
            stats.level_label(),
            stats.recommendation
        );
    }
}

fn marker(level: Option<EntropyLevel>) -> &'static str {
    match level {
        Some(EntropyLevel::Critical) => "🔴",
        Some(EntropyLevel::High) => "🟠",
        Some(EntropyLevel::Medium) => "🟡",
        Some(EntropyLevel::Low) => "🟢",
        None => "⚪",
    }
}

fn append_errors(output: &mut String, title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    let _ = writeln!(output, "{title}:");
    for error in errors {
        let _ = writeln!(output, "- {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::{render_entropy_text, render_project_text};
    use bulkhead_core::{
        CloneStatus, ProjectKind, RepoEntropyReport, RepoProjectReport, SnapshotFile,
        analyze_snapshot,
    };
    use std::path::PathBuf;

    fn analyzed_report() -> RepoEntropyReport {
        let files = vec![
            SnapshotFile::new("go.mod", false),
            SnapshotFile::new("cmd/app/main.go", false),
            SnapshotFile::new("pkg/mixed/a.go", false),
            SnapshotFile::new("pkg/mixed/b.md", false),
            SnapshotFile::new("pkg/mixed/c.yaml", false),
            SnapshotFile::new("pkg/mixed/d.sh", false),
        ];
        let mut report = RepoEntropyReport::new("local".to_string(), PathBuf::from("/tmp/a"));
        report.clone_status = CloneStatus::Local;
        report.snapshot = Some("/tmp/a at HEAD".to_string());
        report.analysis = Some(analyze_snapshot(&files, "last 30 days"));
        report
    }

    #[test]
    fn render_entropy_text_covers_branches() {
        let report_a = analyzed_report();

        let mut report_b = RepoEntropyReport::new("cloned".to_string(), PathBuf::from("/tmp/b"));
        report_b.clone_status = CloneStatus::Cloned;
        report_b.errors = vec!["git diff failed".to_string()];

        let mut report_failed =
            RepoEntropyReport::new("failed".to_string(), PathBuf::from("/tmp/c"));
        report_failed.clone_status = CloneStatus::Failed("oops".to_string());

        let report_pending = RepoEntropyReport::new("pending".to_string(), PathBuf::from("/tmp/d"));

        let output = render_entropy_text(&[report_a, report_b, report_failed, report_pending]);

        assert!(output.contains("Status: local"));
        assert!(output.contains("Snapshot: /tmp/a at HEAD"));
        assert!(output.contains("Project type: Go"));
        assert!(output.contains("Time window: last 30 days"));
        assert!(output.contains("High entropy directories (need attention):"));
        assert!(output.contains("🔴 pkg/mixed"));
        assert!(output.contains("2.000"));
        assert!(output.contains("Critical"));
        assert!(output.contains("🟢 cmd/app"));
        assert!(output.contains("Analysis: unavailable"));
        assert!(output.contains("Analysis errors:"));
        assert!(output.contains("- git diff failed"));
        assert!(output.contains("Status: failed (oops)"));
        assert!(output.contains("Status: pending"));
    }

    #[test]
    fn empty_buckets_render_none() {
        let files = vec![
            SnapshotFile::new("src/a.rs", false),
            SnapshotFile::new("src/b.toml", false),
        ];
        let mut report = RepoEntropyReport::new("local".to_string(), PathBuf::from("/tmp/a"));
        report.clone_status = CloneStatus::Local;
        report.analysis = Some(analyze_snapshot(&files, "all time"));

        let output = render_entropy_text(&[report]);
        assert!(output.contains("High entropy directories (need attention): none"));
        assert!(output.contains("Low entropy directories (well organized): none"));
        assert!(output.contains("Directories analyzed: 1"));
    }

    #[test]
    fn render_project_text_lists_conventions() {
        let mut report = RepoProjectReport::new("local".to_string(), PathBuf::from("/tmp/a"));
        report.clone_status = CloneStatus::Local;
        report.project_type = Some(ProjectKind::Python.project_type());

        let mut missing = RepoProjectReport::new("none".to_string(), PathBuf::from("/tmp/b"));
        missing.clone_status = CloneStatus::Cloned;
        missing.errors = vec!["io error: missing".to_string()];

        let output = render_project_text(&[report, missing]);
        assert!(output.contains("Project type: Python"));
        assert!(output.contains("- notebooks/: ipynb"));
        assert!(output.contains("- data/: any"));
        assert!(output.contains("Project type: unavailable"));
        assert!(output.contains("Detection errors:"));
    }
}
