//! Run configuration, built once at process start from parsed arguments and
//! the environment, then threaded explicitly through the resolver and runner.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::ConfigError;
use crate::run::model::Mode;
use crate::run::model::ModelSpec;
use crate::utils::args::BasecallArgs;
use crate::utils::args::CompressionStrategy;
use crate::utils::args::StagingArgs;

/// Marks a comment line in an input list.
const COMMENT_PREFIX: char = '#';

/// Configuration for staging inputs.
#[derive(Clone, Debug)]
pub struct StagingConfig {
    /// Directory that remote and archived inputs are staged under.
    pub scratch_root: PathBuf,

    /// Object storage client.
    pub aws: PathBuf,

    /// Archive tool.
    pub tar: PathBuf,

    /// FAST5 to POD5 converter.
    pub pod5: PathBuf,
}

impl From<&StagingArgs> for StagingConfig {
    fn from(args: &StagingArgs) -> Self {
        StagingConfig {
            scratch_root: args.scratch.clone().unwrap_or_else(std::env::temp_dir),
            aws: args.aws.clone(),
            tar: args.tar.clone(),
            pod5: args.pod5.clone(),
        }
    }
}

/// Everything needed to stage and basecall a batch of inputs.
#[derive(Clone, Debug)]
pub struct Config {
    /// Staging configuration.
    pub staging: StagingConfig,

    /// Path to the Dorado binary.
    pub dorado: PathBuf,

    /// Directory that outputs are written to.
    pub output_dir: PathBuf,

    /// Devices passed to `-x`.
    pub devices: String,

    /// Extra arguments passed to the basecaller.
    pub basecaller_args: Vec<String>,

    /// Compression strategy for the sequencing summary.
    pub compression: CompressionStrategy,

    /// The models to basecall with.
    pub model: ModelSpec,
}

impl Config {
    /// Builds and validates a [`Config`]. Fails if no model was given or if the
    /// basecaller binary is missing or not executable.
    pub fn from_args(args: &BasecallArgs, mode: Mode) -> Result<Self, ConfigError> {
        let model = ModelSpec::new(&args.model, args.mods.clone(), mode)?;

        let dorado = resolve_dorado(&args.dorado, &args.dorado_root);
        check_executable(&dorado)?;
        debug!("using basecaller: {}", dorado.display());

        Ok(Config {
            staging: StagingConfig::from(&args.staging),
            dorado,
            output_dir: args.output.clone(),
            devices: args.device.clone(),
            basecaller_args: args.basecaller_args.clone(),
            compression: args.compression_strategy,
            model,
        })
    }
}

/// Resolves the `--dorado` selection. Anything containing a path separator is
/// taken as a path to the binary; anything else names a version directory
/// under `root` (by convention, `current` is a symlink to the default).
///
/// ```
/// use std::path::Path;
/// use dorado_batch::config::resolve_dorado;
///
/// assert_eq!(
///     resolve_dorado("0.9.6", Path::new("/opt/dorado")),
///     Path::new("/opt/dorado/0.9.6/bin/dorado")
/// );
/// assert_eq!(
///     resolve_dorado("./bin/dorado", Path::new("/opt/dorado")),
///     Path::new("./bin/dorado")
/// );
/// ```
pub fn resolve_dorado(selection: &str, root: &Path) -> PathBuf {
    if selection.contains(std::path::MAIN_SEPARATOR) || selection.contains('/') {
        PathBuf::from(selection)
    } else {
        root.join(selection).join("bin").join("dorado")
    }
}

/// Ensures `path` is an existing, executable file.
pub fn check_executable(path: &Path) -> Result<(), ConfigError> {
    let not_found = || ConfigError::BinaryNotFound(path.to_path_buf());

    let metadata = fs::metadata(path).map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(not_found());
        }
    }

    Ok(())
}

fn read_list(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::MissingInputList(path.to_path_buf()),
        _ => ConfigError::ReadInputList {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn is_entry(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(COMMENT_PREFIX)
}

/// Reads a list of input references, one per line. Blank lines and lines
/// starting with `#` are skipped.
pub fn read_input_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let contents = read_list(path)?;
    let entries = contents
        .lines()
        .filter(|line| is_entry(line))
        .map(|line| line.trim().to_string())
        .collect::<Vec<_>>();

    if entries.is_empty() {
        return Err(ConfigError::EmptyInputList(path.to_path_buf()));
    }

    Ok(entries)
}

/// Parses a 1-based task index, as given on the command line or by the
/// scheduler.
pub fn parse_task_index(value: Option<&str>) -> Result<usize, ConfigError> {
    let value = value.map(str::trim).ok_or(ConfigError::MissingTaskIndex)?;
    match value.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(ConfigError::InvalidTaskIndex(value.to_string())),
    }
}

/// Selects the input reference for one array task. The 1-based `index`
/// selects a raw line of the file, the way a scheduler's array index would.
pub fn select_task_line(path: &Path, index: usize) -> Result<String, ConfigError> {
    let contents = read_list(path)?;
    let lines = contents.lines().collect::<Vec<_>>();

    let line = index
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .ok_or_else(|| ConfigError::TaskIndexOutOfRange {
            index,
            path: path.to_path_buf(),
            lines: lines.len(),
        })?;

    if !is_entry(line) {
        return Err(ConfigError::BlankTaskLine {
            index,
            path: path.to_path_buf(),
        });
    }

    Ok(line.trim().to_string())
}
