//! Utilities related to the parsing of arguments.

use std::fmt::Display;
use std::path::PathBuf;

use clap::Args;
use flate2::Compression;

//======================//
// Compression Strategy //
//======================//

/// An enum representing the compression strategy to follow when writing the
/// gzipped sequencing summary.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum CompressionStrategy {
    /// Compress the file as much as possible (maximum gzip compression).
    Best,

    /// Balance the compression level and the speed of the compression process.
    #[default]
    Balanced,

    /// Compress the file as quickly as possible (minimum gzip compression without
    /// turning off compression altogether).
    Fastest,
}

impl Display for CompressionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Balanced => write!(f, "balanced"),
            Self::Best => write!(f, "best"),
            Self::Fastest => write!(f, "fastest"),
        }
    }
}

impl From<CompressionStrategy> for Compression {
    fn from(strategy: CompressionStrategy) -> Self {
        match strategy {
            CompressionStrategy::Balanced => Compression::new(6),
            CompressionStrategy::Best => Compression::best(),
            CompressionStrategy::Fastest => Compression::fast(),
        }
    }
}

//===========================//
// Shared basecall arguments //
//===========================//

/// Arguments shared by every subcommand that basecalls.
#[derive(Args, Clone, Debug)]
pub struct BasecallArgs {
    /// Base model to basecall with (a model name such as `sup@v5.0.0`, or a
    /// path to a model directory).
    #[arg(short, long, value_name = "MODEL")]
    pub model: String,

    /// Modified base models, comma separated.
    #[arg(long = "mod", value_name = "MODEL,...", value_delimiter = ',')]
    pub mods: Vec<String>,

    /// Dorado version to use (a directory under the Dorado root), or a path to
    /// a Dorado binary.
    #[arg(long, value_name = "VERSION|PATH", default_value = "current")]
    pub dorado: String,

    /// Directory holding one directory per installed Dorado version.
    #[arg(
        long,
        value_name = "PATH",
        env = "DORADO_ROOT",
        default_value = "/opt/dorado"
    )]
    pub dorado_root: PathBuf,

    /// Base directory that BAMs, summaries, and logs are written to.
    #[arg(short, long, visible_alias = "project", value_name = "PATH")]
    pub output: PathBuf,

    /// Devices passed to the basecaller's `-x` option.
    #[arg(short = 'x', long, value_name = "DEVICES", default_value = "cuda:all")]
    pub device: String,

    /// Extra argument passed through to the basecaller (may be repeated).
    #[arg(long = "basecaller-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub basecaller_args: Vec<String>,

    /// Compression strategy for the gzipped sequencing summary.
    #[arg(long, default_value_t = CompressionStrategy::Balanced)]
    pub compression_strategy: CompressionStrategy,

    /// Where and how inputs are staged.
    #[command(flatten)]
    pub staging: StagingArgs,
}

/// Arguments controlling how inputs are staged.
#[derive(Args, Clone, Debug)]
pub struct StagingArgs {
    /// Scratch directory that remote and archived inputs are staged under.
    /// Defaults to the system temporary directory.
    #[arg(long, value_name = "PATH", env = "DORADO_BATCH_SCRATCH")]
    pub scratch: Option<PathBuf>,

    /// Object storage client used to query and download remote inputs.
    #[arg(long, value_name = "PATH", default_value = "aws")]
    pub aws: PathBuf,

    /// Archive tool used to extract tarballs.
    #[arg(long, value_name = "PATH", default_value = "tar")]
    pub tar: PathBuf,

    /// Converter used to turn FAST5 directories into a single POD5 file.
    #[arg(long, value_name = "PATH", default_value = "pod5")]
    pub pod5: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_strategy_levels() {
        assert_eq!(Compression::from(CompressionStrategy::Best), Compression::best());
        assert_eq!(Compression::from(CompressionStrategy::Fastest), Compression::fast());
        assert_eq!(Compression::from(CompressionStrategy::Balanced).level(), 6);
    }
}
