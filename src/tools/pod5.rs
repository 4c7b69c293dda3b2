//! FAST5 to POD5 conversion through the `pod5` command line tool.

use std::path::Path;
use std::path::PathBuf;

use crate::cancel::CancellationToken;
use crate::errors::ToolError;
use crate::tools::SignalConverter;
use crate::utils::process::CommandLine;

/// Converts FAST5 files with `pod5 convert fast5`.
pub struct Pod5Tool {
    program: PathBuf,
}

impl Pod5Tool {
    /// Creates a new [`Pod5Tool`] that launches `program`.
    pub fn new(program: PathBuf) -> Self {
        Pod5Tool { program }
    }

    /// The command that converts `inputs` into `output`.
    pub fn convert_command(&self, inputs: &[PathBuf], output: &Path) -> CommandLine {
        CommandLine::new(&self.program)
            .args(["convert", "fast5"])
            .args(inputs)
            .arg("--output")
            .arg(output)
            .arg("--force-overwrite")
    }
}

impl SignalConverter for Pod5Tool {
    fn convert(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.convert_command(inputs, output).run(cancel)
    }
}
