//! Per-job isolation: resolve, run, and clean up each unit of work, recording
//! a structured report for every job instead of stopping at the first
//! failure.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use prettytable::row;
use prettytable::Table;
use serde::Serialize;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::cancel::CancellationToken;
use crate::errors::JobError;
use crate::input::JobInput;
use crate::resolve::ResolvedInput;
use crate::resolve::Resolver;
use crate::run::model::ModelSpec;
use crate::run::outputs::JobOutput;
use crate::run::Runner;
use crate::utils::display::PercentageFormat;
use crate::utils::fs::is_within;

//==========//
// Pipeline //
//==========//

/// What happens to a job's working directory after a successful run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cleanup {
    /// Remove the working directory if it lies under the scratch root.
    RemoveWorkDir,

    /// Leave everything in place.
    Keep,
}

/// A successfully completed job.
#[derive(Debug)]
pub struct Completed {
    /// The staged input.
    pub resolved: ResolvedInput,

    /// The outputs written for it.
    pub output: JobOutput,
}

/// Resolves, basecalls, and cleans up one unit of work at a time.
pub struct Pipeline<'a> {
    resolver: Resolver<'a>,
    runner: Runner<'a>,
    model: ModelSpec,
    cleanup: Cleanup,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    /// Creates a new pipeline. Dry runs never clean up.
    pub fn new(
        resolver: Resolver<'a>,
        runner: Runner<'a>,
        model: ModelSpec,
        cleanup: Cleanup,
        dry_run: bool,
    ) -> Self {
        Pipeline {
            resolver: resolver.dry_run(dry_run),
            runner: runner.dry_run(dry_run),
            model,
            cleanup,
            dry_run,
        }
    }

    /// Runs one job to completion.
    pub fn run_job(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> Result<Completed, JobError> {
        let resolved = self.resolver.resolve(reference, cancel)?;
        let output = self.runner.run(&resolved, &self.model, cancel)?;

        if self.cleanup == Cleanup::RemoveWorkDir {
            self.clean_up(&resolved);
        }

        Ok(Completed { resolved, output })
    }

    /// Runs one job, converting its outcome into a [`JobReport`].
    pub fn process(&self, reference: &str, cancel: &CancellationToken) -> JobReport {
        let result = self.run_job(reference, cancel);
        if let Err(err) = &result {
            error!("{}: {}", reference, err);
        }

        JobReport::new(reference, result)
    }

    fn clean_up(&self, resolved: &ResolvedInput) {
        let scratch_root = self.resolver.scratch_root();
        let work_dir = match resolved.work_dir() {
            Some(dir) if is_within(&resolved.staged_path, scratch_root) => dir,
            _ => {
                info!(
                    "{} is not under {}; cleaning it up is the caller's responsibility",
                    resolved.staged_path.display(),
                    scratch_root.display()
                );
                return;
            }
        };

        if self.dry_run {
            info!("dry run: would remove {}", work_dir.display());
            return;
        }

        info!("removing {}", work_dir.display());
        if let Err(err) = fs::remove_dir_all(work_dir) {
            warn!("could not remove {}: {}", work_dir.display(), err);
        }
    }
}

//=========//
// Reports //
//=========//

/// Whether a job succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The job completed.
    Succeeded,

    /// The job was abandoned.
    Failed,
}

/// A structured record of one job.
#[derive(Debug, Serialize)]
pub struct JobReport {
    /// The input reference as given.
    pub reference: String,

    /// The unit name, when the reference could be parsed.
    pub unit: Option<String>,

    /// Whether the job succeeded.
    pub status: JobStatus,

    /// The path that was (or would have been) basecalled.
    pub staged_path: Option<PathBuf>,

    /// The outputs written.
    pub output: Option<JobOutput>,

    /// A short name for the kind of failure.
    pub error_kind: Option<&'static str>,

    /// A description of the failure.
    pub error: Option<String>,
}

impl JobReport {
    /// Builds a report from the outcome of a job.
    pub fn new(reference: &str, result: Result<Completed, JobError>) -> Self {
        match result {
            Ok(Completed { resolved, output }) => JobReport {
                reference: reference.to_string(),
                unit: Some(resolved.input.identity.full_name),
                status: JobStatus::Succeeded,
                staged_path: Some(resolved.staged_path),
                output: Some(output),
                error_kind: None,
                error: None,
            },
            Err(err) => JobReport {
                reference: reference.to_string(),
                unit: reference
                    .parse::<JobInput>()
                    .ok()
                    .map(|input| input.identity.full_name),
                status: JobStatus::Failed,
                staged_path: None,
                output: None,
                error_kind: Some(err.kind()),
                error: Some(err.to_string()),
            },
        }
    }

    /// Whether the job succeeded.
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

/// The aggregate outcome of a batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    /// Number of jobs that succeeded.
    pub succeeded: usize,

    /// Number of jobs that failed.
    pub failed: usize,

    /// One report per job, in input order.
    pub jobs: Vec<JobReport>,
}

impl BatchSummary {
    /// Adds a job's report.
    pub fn push(&mut self, report: JobReport) {
        if report.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        self.jobs.push(report);
    }

    /// Total number of jobs.
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// Renders the summary as a table.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Unit", "Status", "Detail"]);

        for job in &self.jobs {
            let unit = job.unit.as_deref().unwrap_or(&job.reference);
            match job.status {
                JobStatus::Succeeded => {
                    let detail = job
                        .output
                        .as_ref()
                        .map(|output| output.bam_path.display().to_string())
                        .unwrap_or_default();
                    table.add_row(row![unit, "succeeded", detail]);
                }
                JobStatus::Failed => {
                    let detail = job.error.as_deref().unwrap_or_default();
                    table.add_row(row![unit, "failed", detail]);
                }
            }
        }

        table
    }

    /// Prints the summary table followed by the totals.
    pub fn print(&self) {
        self.table().printstd();
        println!();
        println!(
            "{} succeeded ({}), {} failed ({})",
            self.succeeded,
            PercentageFormat(self.succeeded as u64, self.total() as u64),
            self.failed,
            PercentageFormat(self.failed as u64, self.total() as u64),
        );
    }

    /// Writes the summary, including every job report, as JSON.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Processes every reference in order, continuing past failed jobs. Stops
/// early only when `cancel` is triggered.
pub fn run_batch(
    pipeline: &Pipeline<'_>,
    references: &[String],
    cancel: &CancellationToken,
    show_progress: bool,
) -> BatchSummary {
    let pb = if show_progress {
        ProgressBar::new(references.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.cyan.bold} {spinner:.green} [{elapsed_precise}] [{bar}] {pos}/{len} {msg}")
            .progress_chars("=> "),
    );
    pb.set_prefix("Basecalling");

    let mut summary = BatchSummary::default();
    for reference in references {
        if cancel.is_cancelled() {
            warn!("cancelled with {} jobs remaining", references.len() - summary.total());
            break;
        }

        pb.set_message(reference.clone());
        summary.push(pipeline.process(reference, cancel));
        pb.inc(1);
    }

    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.green.bold} {msg:.white.bold} [{elapsed_precise}] [{bar}] {pos}/{len}")
            .progress_chars("=> "),
    );
    pb.set_prefix("✓");
    pb.finish_with_message("Finished");

    summary
}
