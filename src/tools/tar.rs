//! Archive extraction through `tar`.

use std::path::Path;
use std::path::PathBuf;

use crate::cancel::CancellationToken;
use crate::errors::ToolError;
use crate::input::kind::ArchiveFormat;
use crate::tools::Archiver;
use crate::utils::process::CommandLine;

/// Extracts archives with `tar`.
pub struct TarTool {
    program: PathBuf,
}

impl TarTool {
    /// Creates a new [`TarTool`] that launches `program`.
    pub fn new(program: PathBuf) -> Self {
        TarTool { program }
    }

    /// The command that extracts `archive` into `dest_dir`.
    pub fn extract_command(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        dest_dir: &Path,
    ) -> CommandLine {
        let flags = match format {
            ArchiveFormat::Tar => "-xf",
            ArchiveFormat::TarGz => "-xzf",
        };

        CommandLine::new(&self.program)
            .arg(flags)
            .arg(archive)
            .arg("-C")
            .arg(dest_dir)
    }
}

impl Archiver for TarTool {
    fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.extract_command(archive, format, dest_dir).run(cancel)
    }
}
