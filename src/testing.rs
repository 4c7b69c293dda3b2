//! In-memory stand-ins for the external tools, used by unit tests.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use crate::cancel::CancellationToken;
use crate::errors::ToolError;
use crate::input::identity::basename;
use crate::input::kind::ArchiveFormat;
use crate::input::JobInput;
use crate::resolve::state::StagingState;
use crate::resolve::ResolvedInput;
use crate::tools::Archiver;
use crate::tools::Basecaller;
use crate::tools::ObjectStore;
use crate::tools::SignalConverter;
use crate::utils::process::CommandLine;

fn status(program: &str, code: i32) -> ToolError {
    ToolError::Status {
        program: program.to_string(),
        code: Some(code),
    }
}

fn io(program: &str, source: std::io::Error) -> ToolError {
    ToolError::Io {
        program: program.to_string(),
        source,
    }
}

/// An object store holding a single object of a fixed size.
pub struct FakeStore {
    size: Option<u64>,
    downloads: AtomicUsize,
}

impl FakeStore {
    pub fn new(size: u64) -> Self {
        FakeStore {
            size: Some(size),
            downloads: AtomicUsize::new(0),
        }
    }

    /// A store where every object is missing.
    pub fn missing() -> Self {
        FakeStore {
            size: None,
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl ObjectStore for FakeStore {
    fn object_size(&self, _: &str, _: &CancellationToken) -> Result<u64, ToolError> {
        self.size.ok_or_else(|| status("aws", 1))
    }

    fn download(
        &self,
        uri: &str,
        dest_dir: &Path,
        _: &CancellationToken,
    ) -> Result<PathBuf, ToolError> {
        let size = self.size.ok_or_else(|| status("aws", 1))?;
        self.downloads.fetch_add(1, Ordering::SeqCst);

        let archive = dest_dir.join(basename(uri));
        fs::write(&archive, vec![0u8; size as usize]).map_err(|err| io("aws", err))?;
        Ok(archive)
    }
}

/// An archiver that writes a fixed set of files instead of unpacking.
pub struct FakeArchiver {
    entries: Vec<(&'static str, usize)>,
    extractions: AtomicUsize,
    failures: AtomicUsize,
}

impl FakeArchiver {
    pub fn new(entries: Vec<(&'static str, usize)>) -> Self {
        FakeArchiver {
            entries,
            extractions: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// An archiver whose first extraction leaves a partial file behind and
    /// exits unsuccessfully. Later extractions succeed.
    pub fn failing_once(entries: Vec<(&'static str, usize)>) -> Self {
        FakeArchiver {
            failures: AtomicUsize::new(1),
            ..Self::new(entries)
        }
    }

    pub fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

impl Archiver for FakeArchiver {
    fn extract(
        &self,
        _: &Path,
        _: ArchiveFormat,
        dest_dir: &Path,
        _: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            fs::write(dest_dir.join("partial.pod5"), b"POD").map_err(|err| io("tar", err))?;
            return Err(status("tar", 2));
        }

        for (name, size) in &self.entries {
            let path = dest_dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|err| io("tar", err))?;
            }
            fs::write(&path, vec![0u8; *size]).map_err(|err| io("tar", err))?;
        }

        Ok(())
    }
}

/// A converter that records its inputs and writes a placeholder file.
#[derive(Default)]
pub struct FakeConverter {
    fail: bool,
    inputs: Mutex<Vec<Vec<PathBuf>>>,
}

impl FakeConverter {
    /// A converter that always exits unsuccessfully, after writing a partial
    /// output.
    pub fn failing() -> Self {
        FakeConverter {
            fail: true,
            ..Default::default()
        }
    }

    pub fn inputs(&self) -> Vec<Vec<PathBuf>> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn conversions(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl SignalConverter for FakeConverter {
    fn convert(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        _: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.inputs.lock().unwrap().push(inputs.to_vec());
        fs::write(output, b"POD5").map_err(|err| io("pod5", err))?;

        if self.fail {
            return Err(status("pod5", 1));
        }

        Ok(())
    }
}

/// A basecaller that writes canned outputs.
pub struct FakeBasecaller {
    program: PathBuf,
    version: String,
    exit_code: Option<i32>,
    basecalls: Mutex<Vec<CommandLine>>,
    summaries: AtomicUsize,
}

impl FakeBasecaller {
    pub const BAM: &'static [u8] = b"BAM\x01";
    pub const SUMMARY: &'static [u8] = b"filename\tread_id\tsequence_length_template\n";

    pub fn new(version: &str) -> Self {
        FakeBasecaller {
            program: PathBuf::from("/opt/dorado/current/bin/dorado"),
            version: version.to_string(),
            exit_code: None,
            basecalls: Mutex::new(Vec::new()),
            summaries: AtomicUsize::new(0),
        }
    }

    /// Makes every basecall exit with `code`.
    pub fn failing_with(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn basecalls(&self) -> usize {
        self.basecalls.lock().unwrap().len()
    }

    pub fn commands(&self) -> Vec<CommandLine> {
        self.basecalls.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> usize {
        self.summaries.load(Ordering::SeqCst)
    }
}

impl Basecaller for FakeBasecaller {
    fn program(&self) -> &Path {
        &self.program
    }

    fn version(&self, _: &CancellationToken) -> Result<String, ToolError> {
        Ok(self.version.clone())
    }

    fn basecall(
        &self,
        command: &CommandLine,
        mut bam: File,
        mut log: File,
        _: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.basecalls.lock().unwrap().push(command.clone());
        writeln!(log, "[fake] basecalling").map_err(|err| io("dorado", err))?;

        if let Some(code) = self.exit_code {
            return Err(status("dorado", code));
        }

        bam.write_all(Self::BAM).map_err(|err| io("dorado", err))
    }

    fn summary(
        &self,
        _: &Path,
        sink: &mut dyn Write,
        _: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        sink.write_all(Self::SUMMARY)
            .map_err(|err| io("dorado", err))
    }
}

/// A resolved local directory named `name` beneath `root`, created if absent.
pub fn resolved_dir(root: &Path, name: &str) -> ResolvedInput {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();

    let input = dir.to_string_lossy().parse::<JobInput>().unwrap();
    ResolvedInput {
        input,
        staged_path: dir,
        state: StagingState::default(),
        performed: Vec::new(),
    }
}
