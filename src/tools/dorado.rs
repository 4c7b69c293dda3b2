//! The Dorado basecaller.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;

use crate::cancel::CancellationToken;
use crate::errors::ToolError;
use crate::tools::Basecaller;
use crate::utils::process::CommandLine;

/// Matches a semantic version with optional build metadata (`1.3.0+abc`).
const VERSION_PATTERN: &str = r"\d+\.\d+\.\d+[0-9A-Za-z.+\-]*";

/// The Dorado binary.
pub struct Dorado {
    program: PathBuf,
}

impl Dorado {
    /// Creates a new [`Dorado`] that launches `program`.
    pub fn new(program: PathBuf) -> Self {
        Dorado { program }
    }

    /// The command that prints the version.
    pub fn version_command(&self) -> CommandLine {
        CommandLine::new(&self.program).arg("--version")
    }

    /// The command that summarizes a BAM file.
    pub fn summary_command(&self, bam: &Path) -> CommandLine {
        CommandLine::new(&self.program).arg("summary").arg(bam)
    }
}

/// Pulls the version out of whatever `dorado --version` printed. Dorado has
/// printed its version to standard error in some releases and to standard
/// output in others, so callers pass both.
pub fn parse_version(output: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(VERSION_PATTERN).unwrap());
    re.find(output).map(|m| m.as_str().to_string())
}

impl Basecaller for Dorado {
    fn program(&self) -> &Path {
        &self.program
    }

    fn version(&self, cancel: &CancellationToken) -> Result<String, ToolError> {
        let command = self.version_command();
        let output = command.output(cancel)?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        parse_version(&text).ok_or_else(|| ToolError::Output {
            program: command.program_name(),
            message: format!("no version found in `{}`", text.trim()),
        })
    }

    fn basecall(
        &self,
        command: &CommandLine,
        bam: File,
        log: File,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        command.run_with(Stdio::from(bam), Stdio::from(log), cancel)
    }

    fn summary(
        &self,
        bam: &Path,
        sink: &mut dyn Write,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.summary_command(bam).stream_stdout(sink, cancel)
    }
}
