//! Object storage access through the `aws` command line client.

use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::errors::ToolError;
use crate::input::identity::basename;
use crate::tools::ObjectStore;
use crate::utils::process::CommandLine;

/// Matches one object line of `aws s3 ls`: date, time, size, key.
const LISTING_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\s+(\d+)\s+(.+)$";

/// Object storage backed by `aws s3`.
pub struct AwsCli {
    program: PathBuf,
}

impl AwsCli {
    /// Creates a new [`AwsCli`] that launches `program`.
    pub fn new(program: PathBuf) -> Self {
        AwsCli { program }
    }

    /// The command that lists an object.
    pub fn ls_command(&self, uri: &str) -> CommandLine {
        CommandLine::new(&self.program).args(["s3", "ls", uri])
    }

    /// The command that downloads an object into a directory.
    pub fn cp_command(&self, uri: &str, dest_dir: &Path) -> CommandLine {
        // A trailing separator makes `aws s3 cp` keep the object's name.
        let mut dest = dest_dir.as_os_str().to_os_string();
        dest.push("/");
        CommandLine::new(&self.program)
            .args(["s3", "cp", uri])
            .arg(dest)
    }
}

fn listing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LISTING_PATTERN).unwrap())
}

/// Finds the size of the object named `name` in the output of `aws s3 ls`.
/// Prefix lines (`PRE ...`) and objects with other names are ignored.
pub fn parse_object_size(listing: &str, name: &str) -> Option<u64> {
    let re = listing_regex();

    listing.lines().find_map(|line| {
        let captures = re.captures(line.trim())?;
        if &captures[2] != name {
            return None;
        }
        captures[1].parse().ok()
    })
}

impl ObjectStore for AwsCli {
    fn object_size(&self, uri: &str, cancel: &CancellationToken) -> Result<u64, ToolError> {
        let command = self.ls_command(uri);
        let output = command.output(cancel)?;
        let listing = String::from_utf8_lossy(&output.stdout);
        let name = basename(uri);

        let size = parse_object_size(&listing, name).ok_or_else(|| ToolError::Output {
            program: command.program_name(),
            message: format!("no object named `{}` in listing of {}", name, uri),
        })?;

        debug!("remote object {} is {} bytes", uri, size);
        Ok(size)
    }

    fn download(
        &self,
        uri: &str,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ToolError> {
        self.cp_command(uri, dest_dir).run(cancel)?;
        Ok(dest_dir.join(basename(uri)))
    }
}
