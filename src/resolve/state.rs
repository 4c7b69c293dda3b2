//! Idempotence tracking for staged inputs.
//!
//! Every side-effecting staging step is gated on one of the named predicates
//! below, so re-resolving the same reference does strictly less work.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::utils::fs;

/// Name of the directory searched for legacy FAST5 files.
pub const FAST5_DIR_NAME: &str = "fast5";

/// Extension of legacy FAST5 files.
pub const FAST5_EXTENSION: &str = "fast5";

/// Directory, inside the staged path, that converted POD5 files are written
/// to.
pub const POD5_DIR_NAME: &str = "pod5_dir";

//=======//
// Probe //
//=======//

/// Read-only questions the resolver asks of the filesystem.
pub trait StagingProbe: Send + Sync {
    /// Recursive size in bytes of everything beneath `path`.
    fn local_bytes(&self, path: &Path) -> io::Result<u64>;

    /// Whether `path` is missing or has no entries.
    fn is_empty_dir(&self, path: &Path) -> io::Result<bool>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// The shallowest directory named `fast5` beneath `root`.
    fn find_fast5_dir(&self, root: &Path) -> io::Result<Option<PathBuf>>;

    /// Every FAST5 file beneath `dir`.
    fn fast5_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// A [`StagingProbe`] backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskProbe;

impl StagingProbe for DiskProbe {
    fn local_bytes(&self, path: &Path) -> io::Result<u64> {
        fs::dir_bytes(path)
    }

    fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
        fs::is_empty_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn find_fast5_dir(&self, root: &Path) -> io::Result<Option<PathBuf>> {
        fs::find_dir_named(root, FAST5_DIR_NAME)
    }

    fn fast5_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::files_with_extension(dir, FAST5_EXTENSION)
    }
}

//============//
// Predicates //
//============//

/// Whether a remote object has already been downloaded. This compares byte
/// counts only, so a truncated download that was later padded by extraction
/// would be treated as complete.
pub fn is_downloaded(local_bytes: u64, remote_bytes: u64) -> bool {
    local_bytes >= remote_bytes
}

/// Whether an archive has already been extracted into `work_dir`.
pub fn is_extracted(probe: &dyn StagingProbe, work_dir: &Path) -> io::Result<bool> {
    probe.is_empty_dir(work_dir).map(|empty| !empty)
}

/// Whether the canonical converted POD5 file already exists.
pub fn has_converted_pod5(probe: &dyn StagingProbe, canonical: &Path) -> bool {
    probe.exists(canonical)
}

/// Path of the canonical converted POD5 file for a staged input.
///
/// ```
/// use std::path::Path;
/// use dorado_batch::resolve::state::canonical_pod5;
///
/// assert_eq!(
///     canonical_pod5(Path::new("/scratch/run/run_FLOW123"), "run_FLOW123"),
///     Path::new("/scratch/run/run_FLOW123/pod5_dir/run_FLOW123.pod5")
/// );
/// ```
pub fn canonical_pod5(staged: &Path, full_name: &str) -> PathBuf {
    staged
        .join(POD5_DIR_NAME)
        .join(format!("{}.pod5", full_name))
}

//=======//
// State //
//=======//

/// What the resolver found for one input. Each flag records the predicate
/// that gated its step, evaluated before that step ran. Steps that do not
/// apply to an input's kind are reported as already satisfied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StagingState {
    /// The job's working directory under the scratch root, if it has one.
    pub work_dir: Option<PathBuf>,

    /// The remote object was already present locally.
    pub is_downloaded: bool,

    /// The working directory already held extracted contents.
    pub is_extracted: bool,

    /// The canonical converted POD5 file already existed.
    pub has_converted_pod5: bool,
}
