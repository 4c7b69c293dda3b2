//! The job runner: invokes the basecaller on a staged input and writes the
//! alignment, the gzipped sequencing summary, and a per-job log.

pub mod model;
pub mod outputs;
pub mod version;

use std::fmt::Display;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flate2::write::GzEncoder;
use flate2::Compression;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::errors::JobError;
use crate::resolve::ResolvedInput;
use crate::run::model::ModelSpec;
use crate::run::outputs::JobOutput;
use crate::run::version::VersionString;
use crate::tools::Basecaller;
use crate::utils::args::CompressionStrategy;
use crate::utils::display::ByteCount;
use crate::utils::process::CommandLine;

//=========//
// Job log //
//=========//

/// A plain text, append-only log for one job. Every line is prefixed with an
/// RFC 3339 timestamp. The basecaller's own diagnostics are appended to the
/// same file.
#[derive(Debug)]
pub struct JobLog {
    path: PathBuf,
    file: File,
}

impl JobLog {
    /// Opens (or creates) the log at `path` for appending.
    pub fn open(path: &Path) -> Result<Self, JobError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| JobError::io(format!("opening log {}", path.display()), err))?;

        Ok(JobLog {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Appends one timestamped line.
    pub fn line<D: Display>(&mut self, message: D) -> Result<(), JobError> {
        writeln!(self.file, "[{}] {}", timestamp(), message)
            .map_err(|err| JobError::io(format!("writing log {}", self.path.display()), err))
    }

    /// A second handle to the log, handed to the basecaller as its standard
    /// error.
    pub fn handle(&self) -> Result<File, JobError> {
        self.file
            .try_clone()
            .map_err(|err| JobError::io(format!("duplicating log {}", self.path.display()), err))
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("unknown time"))
}

//========//
// Runner //
//========//

/// Invokes the basecaller for staged inputs.
pub struct Runner<'a> {
    basecaller: &'a dyn Basecaller,
    output_dir: PathBuf,
    devices: String,
    basecaller_args: Vec<String>,
    compression: CompressionStrategy,
    dry_run: bool,
}

impl<'a> Runner<'a> {
    /// Creates a runner writing into `output_dir` on all CUDA devices, with
    /// no extra arguments.
    pub fn new<P: Into<PathBuf>>(basecaller: &'a dyn Basecaller, output_dir: P) -> Self {
        Runner {
            basecaller,
            output_dir: output_dir.into(),
            devices: String::from("cuda:all"),
            basecaller_args: Vec::new(),
            compression: CompressionStrategy::default(),
            dry_run: false,
        }
    }

    /// Creates a runner configured from a [`Config`].
    pub fn from_config(basecaller: &'a dyn Basecaller, config: &Config) -> Self {
        Runner::new(basecaller, config.output_dir.clone())
            .devices(config.devices.clone())
            .basecaller_args(config.basecaller_args.clone())
            .compression(config.compression)
    }

    /// Sets the devices passed to `-x`.
    pub fn devices<S: Into<String>>(mut self, devices: S) -> Self {
        self.devices = devices.into();
        self
    }

    /// Sets extra arguments passed through to the basecaller.
    pub fn basecaller_args(mut self, args: Vec<String>) -> Self {
        self.basecaller_args = args;
        self
    }

    /// Sets the compression strategy for the sequencing summary.
    pub fn compression(mut self, compression: CompressionStrategy) -> Self {
        self.compression = compression;
        self
    }

    /// When set, commands are logged but never executed.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The directory outputs are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Builds the basecalling command for a staged input.
    ///
    /// `<bin> basecaller|duplex <model> <input> --recursive [extra] -x <devices>`
    pub fn command(&self, staged: &Path, model: &ModelSpec) -> CommandLine {
        CommandLine::new(self.basecaller.program())
            .arg(model.mode.subcommand())
            .arg(model.model_argument())
            .arg(staged)
            .arg("--recursive")
            .args(&self.basecaller_args)
            .arg("-x")
            .arg(&self.devices)
    }

    /// Basecalls one staged input.
    pub fn run(
        &self,
        resolved: &ResolvedInput,
        model: &ModelSpec,
        cancel: &CancellationToken,
    ) -> Result<JobOutput, JobError> {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let reported = self.basecaller.version(cancel).map_err(JobError::basecall)?;
        let version = VersionString::new(&reported, model);
        debug!("basecaller version: {} (key {})", reported.trim(), version);

        let unit = &resolved.input.identity.full_name;
        let output = JobOutput::derive(&self.output_dir, unit, &version);

        fs::create_dir_all(&self.output_dir).map_err(|err| {
            JobError::io(
                format!("creating output directory {}", self.output_dir.display()),
                err,
            )
        })?;

        let mut log = JobLog::open(&output.log_path)?;
        log.line(format!("start: {}", unit))?;

        let command = self.command(&resolved.staged_path, model);
        log.line(format!("command: {}", command))?;

        let result = if self.dry_run {
            info!("dry run: would run {}", command);
            info!("dry run: would write {}", output.bam_path.display());
            log.line(format!("dry run: would write {}", output.bam_path.display()))
        } else {
            self.execute(&command, &output, &log, cancel)
        };

        if let Err(err) = &result {
            log.line(format!("error: {}", err))?;
        }

        log.line(format!("end: {}", unit))?;
        result.map(|_| output)
    }

    fn execute(
        &self,
        command: &CommandLine,
        output: &JobOutput,
        log: &JobLog,
        cancel: &CancellationToken,
    ) -> Result<(), JobError> {
        info!("basecalling into {}", output.bam_path.display());

        let bam = File::create(&output.bam_path).map_err(|err| {
            JobError::io(format!("creating {}", output.bam_path.display()), err)
        })?;
        self.basecaller
            .basecall(command, bam, log.handle()?, cancel)
            .map_err(JobError::basecall)?;

        let bam_bytes = fs::metadata(&output.bam_path).map(|m| m.len()).unwrap_or(0);
        info!(
            "wrote {} ({})",
            output.bam_path.display(),
            ByteCount(bam_bytes)
        );

        self.write_summary(output, cancel)
    }

    fn write_summary(&self, output: &JobOutput, cancel: &CancellationToken) -> Result<(), JobError> {
        let summary_err =
            |err: std::io::Error| JobError::io(format!("writing {}", output.summary_path.display()), err);

        let file = File::create(&output.summary_path).map_err(summary_err)?;
        let mut encoder = GzEncoder::new(file, Compression::from(self.compression));

        self.basecaller
            .summary(&output.bam_path, &mut encoder, cancel)
            .map_err(JobError::basecall)?;
        encoder.finish().map_err(summary_err)?;

        info!("wrote {}", output.summary_path.display());
        Ok(())
    }
}
