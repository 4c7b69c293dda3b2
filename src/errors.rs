//! Error types shared across the `dorado-batch` subcommands.
//!
//! Errors come in two flavours. [`ConfigError`]s are detected once, up front,
//! and are fatal to the whole process. [`JobError`]s belong to a single unit of
//! work: they abandon that unit but never its siblings.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

//============//
// Exit codes //
//============//

/// Process exit codes used by the `dorado-batch` binary. When a basecaller
/// invocation fails in `array` mode, its own exit code is propagated instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    /// Everything succeeded.
    Success = 0,

    /// A configuration error, a missing binary, or at least one failed job.
    Failure = 1,
}

/// Picks the process exit code for an error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<JobError>())
        .and_then(JobError::exit_code)
        .unwrap_or(ExitCode::Failure as i32)
}

//======================//
// Configuration errors //
//======================//

/// Errors detected while building the run configuration. These are checked
/// before any job starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The basecaller could not be found at the resolved location, or it is
    /// not executable.
    #[error("basecaller binary not found or not executable: {}", .0.display())]
    BinaryNotFound(PathBuf),

    /// The file listing the inputs does not exist.
    #[error("input list does not exist: {}", .0.display())]
    MissingInputList(PathBuf),

    /// The file listing the inputs could not be read.
    #[error("could not read input list {}: {source}", path.display())]
    ReadInputList {
        /// Path to the input list.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The input list has no usable entries.
    #[error("input list contains no entries: {}", .0.display())]
    EmptyInputList(PathBuf),

    /// No task index was provided for an array task.
    #[error("no task index provided: pass --task-index or set SLURM_ARRAY_TASK_ID")]
    MissingTaskIndex,

    /// The task index is not a positive integer.
    #[error("invalid task index `{0}`: expected a positive integer")]
    InvalidTaskIndex(String),

    /// The task index does not select a line of the input list.
    #[error("task index {index} is out of range for {} ({lines} lines)", path.display())]
    TaskIndexOutOfRange {
        /// The 1-based task index.
        index: usize,
        /// Path to the input list.
        path: PathBuf,
        /// Number of lines in the input list.
        lines: usize,
    },

    /// The task index selects a blank or commented line.
    #[error("line {index} of {} does not name an input", path.display())]
    BlankTaskLine {
        /// The 1-based task index.
        index: usize,
        /// Path to the input list.
        path: PathBuf,
    },

    /// The model name is empty.
    #[error("a base model is required")]
    MissingModel,
}

//==============//
// Tool errors  //
//==============//

/// Errors raised while driving an external program.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program could not be launched at all.
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The program ran but exited unsuccessfully.
    #[error("`{program}` exited with {}", describe_exit(.code))]
    Status {
        /// Program that was launched.
        program: String,
        /// Exit code, if the program was not killed by a signal.
        code: Option<i32>,
    },

    /// The program succeeded but printed something we could not interpret.
    #[error("unexpected output from `{program}`: {message}")]
    Output {
        /// Program that was launched.
        program: String,
        /// What was wrong with the output.
        message: String,
    },

    /// An I/O error occurred while feeding or draining the program.
    #[error("I/O error while running `{program}`: {source}")]
    Io {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The program was killed because the job was cancelled.
    #[error("`{program}` was cancelled")]
    Cancelled {
        /// Program that was launched.
        program: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => String::from("a signal"),
    }
}

//============//
// Job errors //
//============//

/// The staging step that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingStep {
    /// Querying the size of the remote object.
    Query,

    /// Downloading the remote object.
    Download,

    /// Extracting an archive.
    Extract,

    /// Converting FAST5 files to POD5.
    Convert,
}

impl fmt::Display for StagingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingStep::Query => write!(f, "remote size query"),
            StagingStep::Download => write!(f, "download"),
            StagingStep::Extract => write!(f, "extraction"),
            StagingStep::Convert => write!(f, "FAST5 to POD5 conversion"),
        }
    }
}

/// Errors that abandon a single job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The reference does not name anything that could be basecalled.
    #[error("invalid input reference: `{0}`")]
    InvalidReference(String),

    /// The staged input does not exist.
    #[error("input not found after staging: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Downloading, extracting, or converting the input failed.
    #[error("{step} failed: {source}")]
    StagingIo {
        /// The step that failed.
        step: StagingStep,
        /// What went wrong.
        source: ToolError,
    },

    /// The basecaller (or its summary command) failed.
    #[error("basecalling failed: {0}")]
    BasecallExecution(#[source] ToolError),

    /// The job was cancelled by the caller.
    #[error("job was cancelled")]
    Cancelled,

    /// A filesystem operation owned by the pipeline failed.
    #[error("{context}: {source}")]
    Io {
        /// What the pipeline was doing.
        context: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl JobError {
    /// Wraps a failed staging step. Cancellation is reported as such rather
    /// than as a staging failure.
    pub fn staging(step: StagingStep, source: ToolError) -> Self {
        match source {
            ToolError::Cancelled { .. } => JobError::Cancelled,
            source => JobError::StagingIo { step, source },
        }
    }

    /// Wraps a failed basecaller invocation.
    pub fn basecall(source: ToolError) -> Self {
        match source {
            ToolError::Cancelled { .. } => JobError::Cancelled,
            source => JobError::BasecallExecution(source),
        }
    }

    /// Wraps an I/O error with a short description of the operation.
    pub fn io<C: Into<String>>(context: C, source: io::Error) -> Self {
        JobError::Io {
            context: context.into(),
            source,
        }
    }

    /// A short, stable name for the kind of error, used in job reports.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::InvalidReference(_) => "invalid_reference",
            JobError::InputNotFound(_) => "input_not_found",
            JobError::StagingIo { .. } => "staging_io",
            JobError::BasecallExecution(_) => "basecall_execution",
            JobError::Cancelled => "cancelled",
            JobError::Io { .. } => "io",
        }
    }

    /// The basecaller's exit code, if this error came from a basecaller that
    /// exited unsuccessfully.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            JobError::BasecallExecution(ToolError::Status { code, .. }) => *code,
            _ => None,
        }
    }
}
