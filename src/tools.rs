//! The external programs that `dorado-batch` drives.
//!
//! Each collaborator sits behind a trait so that the resolver and the runner
//! can be exercised without the real programs installed. The process-backed
//! implementations live in the submodules.

pub mod aws;
pub mod dorado;
pub mod pod5;
pub mod tar;

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::errors::ToolError;
use crate::input::kind::ArchiveFormat;
use crate::utils::process::CommandLine;

/// Object storage holding remote input archives.
pub trait ObjectStore: Send + Sync {
    /// Returns the size in bytes of the object at `uri`.
    fn object_size(&self, uri: &str, cancel: &CancellationToken) -> Result<u64, ToolError>;

    /// Downloads the object at `uri` into `dest_dir`, returning the path of the
    /// downloaded file.
    fn download(
        &self,
        uri: &str,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ToolError>;
}

/// A tool that unpacks tarballs.
pub trait Archiver: Send + Sync {
    /// Extracts `archive` into `dest_dir`.
    fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}

/// A tool that converts legacy FAST5 files into a single POD5 file.
pub trait SignalConverter: Send + Sync {
    /// Converts `inputs` into one POD5 file at `output`.
    fn convert(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}

/// The basecaller.
pub trait Basecaller: Send + Sync {
    /// Path of the basecaller binary, used to build command lines.
    fn program(&self) -> &Path;

    /// Queries the basecaller for its version, exactly as it reports it
    /// (including any build metadata).
    fn version(&self, cancel: &CancellationToken) -> Result<String, ToolError>;

    /// Runs a basecalling command, writing the alignment stream to `bam` and
    /// diagnostics to `log`.
    fn basecall(
        &self,
        command: &CommandLine,
        bam: File,
        log: File,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;

    /// Writes the sequencing summary of `bam` into `sink`.
    fn summary(
        &self,
        bam: &Path,
        sink: &mut dyn Write,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}

/// The full set of collaborators used by one pipeline.
pub struct Toolbox {
    /// Object storage client.
    pub store: Box<dyn ObjectStore>,

    /// Archive tool.
    pub archiver: Box<dyn Archiver>,

    /// FAST5 to POD5 converter.
    pub converter: Box<dyn SignalConverter>,

    /// The basecaller.
    pub basecaller: Box<dyn Basecaller>,
}

impl Toolbox {
    /// Builds the process-backed toolbox described by a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Toolbox {
            store: Box::new(aws::AwsCli::new(config.staging.aws.clone())),
            archiver: Box::new(tar::TarTool::new(config.staging.tar.clone())),
            converter: Box::new(pod5::Pod5Tool::new(config.staging.pod5.clone())),
            basecaller: Box::new(dorado::Dorado::new(config.dorado.clone())),
        }
    }
}
