#![deny(missing_docs)]
//! Bulkhead command-line interface.
//!
//! Measures directory entropy and detects project archetypes for one or many
//! repositories, cloned or local.

mod text;
mod window;

use bulkhead_core::{
    CloneStatus, EntropyAnalyzer, GitSnapshot, RepoEntropyReport, RepoProjectReport,
    SnapshotSource, StdFileSystem, ThresholdLadder, WorkingTreeSnapshot, detect_snapshot_project,
    render_entropy_markdown, render_json, render_project_markdown, render_schema,
};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use text::{render_entropy_text, render_project_text};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use window::TimeWindow;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "bulkhead", version, about = "Bulkhead directory entropy analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(&["file", "url", "dir", "path"])
))]
struct RepoSourceArgs {
    /// File containing repository URLs (one per line).
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Single repository URL to clone.
    #[arg(long)]
    url: Option<String>,
    /// Directory containing repositories to analyze locally.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Local repository path to analyze.
    #[arg(long)]
    path: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct CloneArgs {
    /// Output directory to clone into.
    #[arg(short, long, env = "BULKHEAD_OUTPUT", default_value = "bulkhead-batch")]
    output: PathBuf,
    /// Maximum number of repositories processed at once.
    #[arg(short = 'j', long, env = "BULKHEAD_CONCURRENCY", default_value_t = 5)]
    concurrency: usize,
}

#[derive(Args, Clone)]
struct SnapshotArgs {
    /// Git revision to read when the snapshot comes from git.
    #[arg(long, env = "BULKHEAD_REV", default_value = "HEAD")]
    rev: String,
    /// Where the file listing is read from.
    #[arg(long, value_enum, env = "BULKHEAD_SNAPSHOT", default_value_t = SnapshotKind::Git)]
    snapshot: SnapshotKind,
}

#[derive(Args, Clone)]
struct AnalysisArgs {
    /// Time window label for the report, e.g. 30d, 2w, 6m or 1y.
    #[arg(long, env = "BULKHEAD_SINCE", default_value = "all")]
    since: TimeWindow,
    /// Keep at most this many directories in each bucket.
    #[arg(long, env = "BULKHEAD_LIMIT")]
    limit: Option<usize>,
    /// Built-in threshold ladder.
    #[arg(long, value_enum, env = "BULKHEAD_LADDER", default_value_t = LadderPreset::Standard)]
    ladder: LadderPreset,
    /// JSON file with a custom threshold ladder; overrides --ladder.
    #[arg(long, env = "BULKHEAD_THRESHOLDS")]
    thresholds: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, env = "BULKHEAD_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum SnapshotKind {
    /// Tracked files of a git revision.
    Git,
    /// Files currently on disk.
    Worktree,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum LadderPreset {
    Standard,
    Strict,
}

impl LadderPreset {
    fn ladder(self) -> ThresholdLadder {
        match self {
            Self::Standard => ThresholdLadder::standard(),
            Self::Strict => ThresholdLadder::strict(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Measure directory entropy for repositories from a URL, file, directory, or local path.
    Entropy {
        #[command(flatten)]
        source: RepoSourceArgs,
        #[command(flatten)]
        clone: CloneArgs,
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Detect the project archetype of repositories.
    Detect {
        #[command(flatten)]
        source: RepoSourceArgs,
        #[command(flatten)]
        clone: CloneArgs,
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Print the JSON schema of the report types.
    Schema {
        /// Write the schema to a file instead of stdout.
        #[arg(long = "report-output")]
        report_output: Option<PathBuf>,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("BULKHEAD_LOG", "warn"))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Entropy {
            source,
            clone,
            snapshot,
            analysis,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            let job = EntropyJob {
                analyzer: EntropyAnalyzer::with_ladder(load_ladder(&analysis).await?),
                snapshot,
                window: analysis.since,
                limit: analysis.limit,
            };
            run_entropy(source, clone.output, clone.concurrency, job, report).await?
        }
        Commands::Detect {
            source,
            clone,
            snapshot,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            run_detect(source, clone.output, clone.concurrency, snapshot, report).await?
        }
        Commands::Schema { report_output } => {
            emit_output(report_output.as_deref(), render_schema()?).await?
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

/// Everything one entropy task needs besides its target.
struct EntropyJob {
    analyzer: EntropyAnalyzer,
    snapshot: SnapshotArgs,
    window: TimeWindow,
    limit: Option<usize>,
}

async fn load_ladder(args: &AnalysisArgs) -> CliResult<ThresholdLadder> {
    match &args.thresholds {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let ladder = ThresholdLadder::from_json(&json)?;
            info!("loaded threshold ladder from {}", path.display());
            Ok(ladder)
        }
        None => Ok(args.ladder.ladder()),
    }
}

async fn run_entropy(
    source: BatchSource,
    clone_output: PathBuf,
    concurrency: usize,
    job: EntropyJob,
    report: OutputArgs,
) -> CliResult<()> {
    let targets = load_repo_targets(source, &clone_output).await?;
    if targets.is_empty() {
        println!("No repositories found to analyze.");
        return Ok(());
    }
    prepare_clone_output(&targets, &clone_output).await?;

    let job = Arc::new(job);
    let mut reports = run_targets(
        targets,
        concurrency,
        move |target| entropy_target(target, job.clone()),
        entropy_report_from_task_error,
    )
    .await?;
    reports.sort_by(|a, b| a.source.cmp(&b.source));

    emit_entropy_reports(&reports, &report).await
}

async fn run_detect(
    source: BatchSource,
    clone_output: PathBuf,
    concurrency: usize,
    snapshot: SnapshotArgs,
    report: OutputArgs,
) -> CliResult<()> {
    let targets = load_repo_targets(source, &clone_output).await?;
    if targets.is_empty() {
        println!("No repositories found to inspect.");
        return Ok(());
    }
    prepare_clone_output(&targets, &clone_output).await?;

    let snapshot = Arc::new(snapshot);
    let mut reports = run_targets(
        targets,
        concurrency,
        move |target| detect_target(target, snapshot.clone()),
        project_report_from_task_error,
    )
    .await?;
    reports.sort_by(|a, b| a.source.cmp(&b.source));

    emit_project_reports(&reports, &report).await
}

async fn prepare_clone_output(targets: &[RepoTarget], clone_output: &Path) -> CliResult<()> {
    if targets
        .iter()
        .any(|target| matches!(target, RepoTarget::Clone { .. }))
    {
        tokio::fs::create_dir_all(clone_output).await?;
    }
    Ok(())
}

/// Runs one task per target, at most `concurrency` at a time.
async fn run_targets<R, F, Fut>(
    targets: Vec<RepoTarget>,
    concurrency: usize,
    task: F,
    on_task_error: fn(JoinError) -> R,
) -> CliResult<Vec<R>>
where
    R: Send + 'static,
    F: Fn(RepoTarget) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let concurrency = if concurrency == 0 { 1 } else { concurrency };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for target in targets {
        let permit = semaphore.clone().acquire_owned().await?;
        let future = task(target);
        tasks.spawn(async move {
            let _permit = permit;
            future.await
        });
    }

    let mut reports = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => {
                warn!("repository task failed: {err}");
                reports.push(on_task_error(err));
            }
        }
    }
    Ok(reports)
}

fn resolve_source_args(source: &RepoSourceArgs) -> CliResult<BatchSource> {
    if let Some(file) = source.file.clone() {
        return Ok(BatchSource::File(file));
    }
    if let Some(url) = source.url.clone() {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err("url cannot be empty".into());
        }
        return Ok(BatchSource::Url(trimmed.to_string()));
    }
    if let Some(dir) = source.dir.clone() {
        return Ok(BatchSource::Dir(dir));
    }
    if let Some(path) = source.path.clone() {
        return Ok(BatchSource::Path(path));
    }
    Err("no repository source provided".into())
}

async fn load_repo_urls(path: &Path) -> CliResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let urls = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    Ok(urls)
}

async fn load_repo_paths_from_dir(path: &Path) -> CliResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut repos = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_dir() {
            continue;
        }
        let entry_path = entry.path();
        if is_hidden_path(&entry_path) {
            continue;
        }
        repos.push(entry_path);
    }
    repos.sort();
    Ok(repos)
}

fn is_hidden_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

async fn load_repo_targets(source: BatchSource, output: &Path) -> CliResult<Vec<RepoTarget>> {
    match source {
        BatchSource::File(file) => {
            let urls = load_repo_urls(&file).await?;
            Ok(urls
                .into_iter()
                .map(|url| RepoTarget::Clone {
                    dest: output.join(repo_dir_name(&url)),
                    url,
                })
                .collect())
        }
        BatchSource::Url(url) => Ok(vec![RepoTarget::Clone {
            dest: output.join(repo_dir_name(&url)),
            url,
        }]),
        BatchSource::Dir(dir) => {
            let paths = load_repo_paths_from_dir(&dir).await?;
            Ok(paths
                .into_iter()
                .map(|path| RepoTarget::Local { path })
                .collect())
        }
        BatchSource::Path(path) => Ok(vec![RepoTarget::Local { path }]),
    }
}

enum BatchSource {
    File(PathBuf),
    Url(String),
    Dir(PathBuf),
    Path(PathBuf),
}

enum RepoTarget {
    Clone { url: String, dest: PathBuf },
    Local { path: PathBuf },
}

/// A target after cloning or locating it on disk.
struct PreparedRepo {
    source: String,
    path: PathBuf,
    status: CloneStatus,
}

impl PreparedRepo {
    fn is_ready(&self) -> bool {
        matches!(self.status, CloneStatus::Cloned | CloneStatus::Local)
    }
}

async fn prepare_target(target: RepoTarget) -> PreparedRepo {
    match target {
        RepoTarget::Clone { url, dest } => {
            if dest.exists() {
                let status =
                    CloneStatus::Failed(format!("destination exists: {}", dest.display()));
                return PreparedRepo {
                    source: url,
                    path: dest,
                    status,
                };
            }
            info!("cloning {url} into {}", dest.display());
            let status = match clone_repo(&url, &dest).await {
                Ok(()) => CloneStatus::Cloned,
                Err(err) => {
                    warn!("clone of {url} failed: {err}");
                    CloneStatus::Failed(err.to_string())
                }
            };
            PreparedRepo {
                source: url,
                path: dest,
                status,
            }
        }
        RepoTarget::Local { path } => {
            let status = if path.is_dir() {
                CloneStatus::Local
            } else {
                CloneStatus::Failed(format!("path not found: {}", path.display()))
            };
            PreparedRepo {
                source: path.display().to_string(),
                path,
                status,
            }
        }
    }
}

async fn entropy_target(target: RepoTarget, job: Arc<EntropyJob>) -> RepoEntropyReport {
    let prepared = prepare_target(target).await;
    let ready = prepared.is_ready();
    let mut report = RepoEntropyReport::new(prepared.source, prepared.path);
    report.clone_status = prepared.status;
    if ready {
        populate_entropy(&mut report, job).await;
    }
    report
}

async fn detect_target(target: RepoTarget, snapshot: Arc<SnapshotArgs>) -> RepoProjectReport {
    let prepared = prepare_target(target).await;
    let ready = prepared.is_ready();
    let mut report = RepoProjectReport::new(prepared.source, prepared.path);
    report.clone_status = prepared.status;
    if ready {
        populate_project(&mut report, &snapshot).await;
    }
    report
}

fn snapshot_source(path: &Path, snapshot: &SnapshotArgs) -> Box<dyn SnapshotSource + Send> {
    match snapshot.snapshot {
        SnapshotKind::Git => Box::new(GitSnapshot::new(path, snapshot.rev.clone())),
        SnapshotKind::Worktree => Box::new(WorkingTreeSnapshot::new(StdFileSystem::new(), path)),
    }
}

async fn populate_entropy(report: &mut RepoEntropyReport, job: Arc<EntropyJob>) {
    let source = snapshot_source(&report.path, &job.snapshot);
    report.snapshot = Some(source.describe());

    let limit = job.limit;
    let result = tokio::task::spawn_blocking(move || {
        job.analyzer
            .analyze(source.as_ref(), &job.window.to_string())
    })
    .await;

    match result {
        Ok(Ok(mut analysis)) => {
            if let Some(limit) = limit {
                analysis.truncate(limit);
            }
            report.analysis = Some(analysis);
        }
        Ok(Err(err)) => {
            warn!("analysis of {} failed: {err}", report.source);
            report.errors.push(format!("snapshot: {err}"));
        }
        Err(err) => report.errors.push(format!("analysis task: {err}")),
    }
}

async fn populate_project(report: &mut RepoProjectReport, snapshot: &SnapshotArgs) {
    let source = snapshot_source(&report.path, snapshot);
    let result = tokio::task::spawn_blocking(move || detect_snapshot_project(source.as_ref())).await;

    match result {
        Ok(Ok(project)) => report.project_type = Some(project),
        Ok(Err(err)) => {
            warn!("detection for {} failed: {err}", report.source);
            report.errors.push(format!("snapshot: {err}"));
        }
        Err(err) => report.errors.push(format!("detection task: {err}")),
    }
}

async fn clone_repo(url: &str, dest: &Path) -> CliResult<()> {
    let status = Command::new("git")
        .arg("clone")
        .arg("--quiet")
        .arg(url)
        .arg(dest)
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("git clone failed with status {status}").into())
    }
}

fn repo_dir_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last_segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let last_segment = last_segment.rsplit(':').next().unwrap_or(last_segment);
    last_segment.trim_end_matches(".git").to_string()
}

fn entropy_report_from_task_error(error: JoinError) -> RepoEntropyReport {
    RepoEntropyReport::failed("unknown".to_string(), PathBuf::from("."), error.to_string())
}

fn project_report_from_task_error(error: JoinError) -> RepoProjectReport {
    RepoProjectReport::failed("unknown".to_string(), PathBuf::from("."), error.to_string())
}

async fn emit_entropy_reports(reports: &[RepoEntropyReport], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_entropy_text(reports),
        OutputFormat::Markdown => render_entropy_markdown(reports),
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output.report_output.as_deref(), contents).await
}

async fn emit_project_reports(reports: &[RepoProjectReport], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_project_text(reports),
        OutputFormat::Markdown => render_project_markdown(reports),
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output.report_output.as_deref(), contents).await
}

async fn emit_output(destination: Option<&Path>, contents: String) -> CliResult<()> {
    if let Some(path) = destination {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}
