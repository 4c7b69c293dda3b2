//! The job input resolver.
//!
//! Turns one input reference into a local path that is ready to basecall.
//! Remote archives are downloaded and extracted under the scratch root, local
//! archives are extracted there, and local directories are used in place.
//! Anything containing a `fast5` directory is then converted to a single POD5
//! file. Every step is gated on a predicate from [`state`], so resolving the
//! same reference twice performs each step at most once.

pub mod state;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::cancel::CancellationToken;
use crate::errors::JobError;
use crate::errors::StagingStep;
use crate::input::identity::Identity;
use crate::input::kind::ArchiveFormat;
use crate::input::kind::InputKind;
use crate::input::JobInput;
use crate::resolve::state::DiskProbe;
use crate::resolve::state::StagingProbe;
use crate::resolve::state::StagingState;
use crate::tools::Archiver;
use crate::tools::ObjectStore;
use crate::tools::SignalConverter;
use crate::tools::Toolbox;
use crate::utils::display::ByteCount;

/// Directory, inside the POD5 directory, that conversions are written to
/// before being moved into place.
const CONVERSION_DIR_NAME: &str = ".converting";

/// An input that has been staged and is ready to basecall.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedInput {
    /// The input this was resolved from.
    pub input: JobInput,

    /// The path handed to the basecaller.
    pub staged_path: PathBuf,

    /// The staging state observed while resolving.
    pub state: StagingState,

    /// The steps that were performed (or, in a dry run, would have been).
    pub performed: Vec<StagingStep>,
}

impl ResolvedInput {
    /// The job's working directory, if it has one.
    pub fn work_dir(&self) -> Option<&Path> {
        self.state.work_dir.as_deref()
    }
}

/// Stages input references under a scratch root.
pub struct Resolver<'a> {
    store: &'a dyn ObjectStore,
    archiver: &'a dyn Archiver,
    converter: &'a dyn SignalConverter,
    probe: &'a dyn StagingProbe,
    scratch_root: PathBuf,
    dry_run: bool,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver that stages under `scratch_root` and inspects the
    /// local filesystem.
    pub fn new<P: Into<PathBuf>>(
        store: &'a dyn ObjectStore,
        archiver: &'a dyn Archiver,
        converter: &'a dyn SignalConverter,
        scratch_root: P,
    ) -> Self {
        Resolver {
            store,
            archiver,
            converter,
            probe: &DiskProbe,
            scratch_root: scratch_root.into(),
            dry_run: false,
        }
    }

    /// Creates a resolver from the staging tools in a [`Toolbox`].
    pub fn from_toolbox<P: Into<PathBuf>>(tools: &'a Toolbox, scratch_root: P) -> Self {
        Resolver::new(
            tools.store.as_ref(),
            tools.archiver.as_ref(),
            tools.converter.as_ref(),
            scratch_root,
        )
    }

    /// Replaces the filesystem probe.
    pub fn probe(mut self, probe: &'a dyn StagingProbe) -> Self {
        self.probe = probe;
        self
    }

    /// When set, side effects are logged but never performed.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The directory inputs are staged under.
    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// The working directory for an input with the given identity.
    pub fn work_dir(&self, identity: &Identity) -> PathBuf {
        self.scratch_root
            .join(&identity.sample_id)
            .join(&identity.full_name)
    }

    /// Resolves one reference into a staged, ready to basecall path.
    pub fn resolve(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> Result<ResolvedInput, JobError> {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let input = reference.parse::<JobInput>()?;
        debug!(
            "{}: kind {}, sample {}, flowcell {}",
            input.identity.full_name,
            input.kind,
            input.identity.sample_id,
            input.identity.flowcell_id
        );

        let mut staging = StagingState {
            is_downloaded: true,
            is_extracted: true,
            ..Default::default()
        };
        let mut performed = Vec::new();

        let staged = match input.kind.archive_format() {
            None => PathBuf::from(&input.reference),
            Some(format) => {
                let work_dir = self.work_dir(&input.identity);
                self.create_dir(&work_dir)?;

                if input.kind.is_remote() {
                    self.stage_remote(
                        &input,
                        format,
                        &work_dir,
                        &mut staging,
                        &mut performed,
                        cancel,
                    )?;
                } else {
                    self.stage_local_archive(
                        &input,
                        format,
                        &work_dir,
                        &mut staging,
                        &mut performed,
                        cancel,
                    )?;
                }

                staging.work_dir = Some(work_dir.clone());
                work_dir
            }
        };

        let staged =
            self.convert_fast5(&input, staged, &mut staging, &mut performed, cancel)?;

        // In a dry run, skipped steps would have produced the staged path.
        if !(self.dry_run && !performed.is_empty()) && !self.probe.exists(&staged) {
            return Err(JobError::InputNotFound(staged));
        }

        info!("{}: staged at {}", input.identity.full_name, staged.display());
        Ok(ResolvedInput {
            input,
            staged_path: staged,
            state: staging,
            performed,
        })
    }

    fn stage_remote(
        &self,
        input: &JobInput,
        format: ArchiveFormat,
        work_dir: &Path,
        staging: &mut StagingState,
        performed: &mut Vec<StagingStep>,
        cancel: &CancellationToken,
    ) -> Result<(), JobError> {
        let remote_bytes = self
            .store
            .object_size(&input.reference, cancel)
            .map_err(|err| JobError::staging(StagingStep::Query, err))?;
        let local_bytes = self.local_bytes(work_dir)?;

        staging.is_downloaded = state::is_downloaded(local_bytes, remote_bytes);
        if staging.is_downloaded {
            info!(
                "{}: already downloaded ({} local, {} remote)",
                input.identity.full_name,
                ByteCount(local_bytes),
                ByteCount(remote_bytes)
            );
            return Ok(());
        }

        staging.is_extracted = false;
        performed.push(StagingStep::Download);
        performed.push(StagingStep::Extract);

        if self.dry_run {
            info!(
                "dry run: would download {} ({}) into {}, extract it, and remove the archive",
                input.reference,
                ByteCount(remote_bytes),
                work_dir.display()
            );
            return Ok(());
        }

        info!(
            "{}: downloading {} ({})",
            input.identity.full_name,
            input.reference,
            ByteCount(remote_bytes)
        );
        let archive = self
            .store
            .download(&input.reference, work_dir, cancel)
            .map_err(|err| JobError::staging(StagingStep::Download, err))?;

        self.extract(&archive, format, work_dir, cancel)?;
        remove_archives(work_dir)
    }

    fn stage_local_archive(
        &self,
        input: &JobInput,
        format: ArchiveFormat,
        work_dir: &Path,
        staging: &mut StagingState,
        performed: &mut Vec<StagingStep>,
        cancel: &CancellationToken,
    ) -> Result<(), JobError> {
        staging.is_extracted = state::is_extracted(self.probe, work_dir)
            .map_err(|err| JobError::io(format!("inspecting {}", work_dir.display()), err))?;
        if staging.is_extracted {
            info!(
                "{}: already extracted into {}",
                input.identity.full_name,
                work_dir.display()
            );
            return Ok(());
        }

        let archive = Path::new(&input.reference);
        if !self.probe.exists(archive) {
            return Err(JobError::InputNotFound(archive.to_path_buf()));
        }

        performed.push(StagingStep::Extract);
        if self.dry_run {
            info!(
                "dry run: would extract {} into {}",
                archive.display(),
                work_dir.display()
            );
            return Ok(());
        }

        self.extract(archive, format, work_dir, cancel)
    }

    fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        work_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), JobError> {
        info!("extracting {} into {}", archive.display(), work_dir.display());
        let result = self.archiver.extract(archive, format, work_dir, cancel);

        if let Err(err) = result {
            // A partial extraction must not pass for a staged input on retry.
            if let Err(cleanup) = clear_dir(work_dir) {
                warn!("{:#}", cleanup);
            }
            return Err(JobError::staging(StagingStep::Extract, err));
        }

        Ok(())
    }

    /// Converts any FAST5 files beneath `staged` into the canonical POD5 file,
    /// returning the path that should be basecalled.
    fn convert_fast5(
        &self,
        input: &JobInput,
        staged: PathBuf,
        staging: &mut StagingState,
        performed: &mut Vec<StagingStep>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, JobError> {
        let full_name = &input.identity.full_name;
        let canonical = state::canonical_pod5(&staged, full_name);
        staging.has_converted_pod5 = state::has_converted_pod5(self.probe, &canonical);

        if staging.has_converted_pod5 {
            debug!("{}: using converted {}", full_name, canonical.display());
            return Ok(canonical);
        }

        let fast5_dir = self
            .probe
            .find_fast5_dir(&staged)
            .map_err(|err| JobError::io(format!("searching {}", staged.display()), err))?;
        let fast5_dir = match fast5_dir {
            Some(dir) => dir,
            None => {
                // Nothing legacy to convert.
                staging.has_converted_pod5 = true;
                return Ok(staged);
            }
        };

        let inputs = self
            .probe
            .fast5_files(&fast5_dir)
            .map_err(|err| JobError::io(format!("listing {}", fast5_dir.display()), err))?;
        if inputs.is_empty() {
            warn!(
                "{}: {} contains no FAST5 files, nothing to convert",
                full_name,
                fast5_dir.display()
            );
            staging.has_converted_pod5 = true;
            return Ok(staged);
        }

        performed.push(StagingStep::Convert);
        if self.dry_run {
            info!(
                "dry run: would convert {} FAST5 files from {} into {}",
                inputs.len(),
                fast5_dir.display(),
                canonical.display()
            );
            return Ok(canonical);
        }

        info!(
            "{}: converting {} FAST5 files into {}",
            full_name,
            inputs.len(),
            canonical.display()
        );

        // Conversions are written aside and moved into place, so an interrupted
        // conversion is never mistaken for a finished one.
        let pod5_dir = staged.join(state::POD5_DIR_NAME);
        let partial_dir = pod5_dir.join(CONVERSION_DIR_NAME);
        let partial = partial_dir.join(format!("{}.pod5", full_name));
        if partial_dir.exists() {
            fs::remove_dir_all(&partial_dir).map_err(|err| {
                JobError::io(format!("removing {}", partial_dir.display()), err)
            })?;
        }
        self.create_dir(&partial_dir)?;

        self.converter
            .convert(&inputs, &partial, cancel)
            .map_err(|err| JobError::staging(StagingStep::Convert, err))?;

        fs::rename(&partial, &canonical)
            .map_err(|err| JobError::io(format!("moving {}", partial.display()), err))?;
        fs::remove_dir_all(&partial_dir)
            .map_err(|err| JobError::io(format!("removing {}", partial_dir.display()), err))?;

        Ok(canonical)
    }

    fn create_dir(&self, dir: &Path) -> Result<(), JobError> {
        if self.dry_run {
            if !self.probe.exists(dir) {
                info!("dry run: would create {}", dir.display());
            }
            return Ok(());
        }

        fs::create_dir_all(dir)
            .map_err(|err| JobError::io(format!("creating {}", dir.display()), err))
    }

    fn local_bytes(&self, dir: &Path) -> Result<u64, JobError> {
        self.probe
            .local_bytes(dir)
            .map_err(|err| JobError::io(format!("measuring {}", dir.display()), err))
    }
}

/// Removes every archive left at the top level of `work_dir` once its
/// contents have been extracted.
fn remove_archives(work_dir: &Path) -> Result<(), JobError> {
    let io_err = |err: std::io::Error| {
        JobError::io(format!("cleaning archives from {}", work_dir.display()), err)
    };

    for entry in fs::read_dir(work_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let is_archive = name.map_or(false, |n| {
            InputKind::classify(&n).stripped_suffix.is_some()
        });

        if is_archive && path.is_file() {
            debug!("removing {}", path.display());
            fs::remove_file(&path).map_err(io_err)?;
        }
    }

    Ok(())
}

/// Removes everything inside `dir`, leaving the directory itself in place.
fn clear_dir(dir: &Path) -> Result<(), JobError> {
    let io_err = |err: std::io::Error| JobError::io(format!("clearing {}", dir.display()), err);

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        debug!("removing {}", path.display());

        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(io_err)?;
        } else {
            fs::remove_file(&path).map_err(io_err)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeArchiver;
    use crate::testing::FakeConverter;
    use crate::testing::FakeStore;

    struct Fakes {
        store: FakeStore,
        archiver: FakeArchiver,
        converter: FakeConverter,
    }

    impl Fakes {
        fn new(remote_bytes: u64) -> Self {
            Fakes {
                store: FakeStore::new(remote_bytes),
                archiver: FakeArchiver::new(vec![("reads/reads.pod5", 128)]),
                converter: FakeConverter::default(),
            }
        }

        fn resolver(&self, scratch: &Path) -> Resolver<'_> {
            Resolver::new(&self.store, &self.archiver, &self.converter, scratch)
        }
    }

    #[test]
    fn test_local_dir_is_used_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let run = tmp.path().join("runA");
        fs::create_dir(&run).unwrap();
        fs::write(run.join("reads.pod5"), b"pod5").unwrap();

        let fakes = Fakes::new(0);
        let reference = run.to_string_lossy().into_owned();
        let resolved = fakes
            .resolver(&tmp.path().join("scratch"))
            .resolve(&reference, &CancellationToken::new())
            .unwrap();

        assert_eq!(resolved.input.kind, InputKind::LocalDir);
        assert_eq!(resolved.staged_path, run);
        assert!(resolved.work_dir().is_none());
        assert!(resolved.performed.is_empty());
        assert!(!tmp.path().join("scratch").exists());
    }

    #[test]
    fn test_missing_local_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let fakes = Fakes::new(0);
        let reference = tmp.path().join("missing").to_string_lossy().into_owned();

        let err = fakes
            .resolver(tmp.path())
            .resolve(&reference, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, JobError::InputNotFound(_)));
    }

    #[test]
    fn test_remote_archive_is_staged_once() {
        let tmp = tempfile::tempdir().unwrap();
        let fakes = Fakes::new(100);
        let resolver = fakes.resolver(tmp.path());
        let cancel = CancellationToken::new();

        let first = resolver
            .resolve("s3://bucket/run_FLOW123.tar.gz", &cancel)
            .unwrap();
        let work_dir = tmp.path().join("run/run_FLOW123");

        assert_eq!(first.input.kind, InputKind::RemoteTarGz);
        assert_eq!(first.staged_path, work_dir);
        assert_eq!(first.work_dir(), Some(work_dir.as_path()));
        assert!(!first.state.is_downloaded);
        assert_eq!(
            first.performed,
            vec![StagingStep::Download, StagingStep::Extract]
        );
        assert!(work_dir.join("reads/reads.pod5").exists());
        assert!(!work_dir.join("run_FLOW123.tar.gz").exists());

        let second = resolver
            .resolve("s3://bucket/run_FLOW123.tar.gz", &cancel)
            .unwrap();
        assert!(second.state.is_downloaded);
        assert!(second.performed.is_empty());
        assert_eq!(second.staged_path, first.staged_path);

        assert_eq!(fakes.store.downloads(), 1);
        assert_eq!(fakes.archiver.extractions(), 1);
    }

    #[test]
    fn test_no_download_when_local_is_large_enough() {
        let tmp = tempfile::tempdir().unwrap();
        let work_dir = tmp.path().join("run/run_FLOW123");
        fs::create_dir_all(&work_dir).unwrap();
        fs::write(work_dir.join("reads.pod5"), vec![0u8; 100]).unwrap();

        let fakes = Fakes::new(100);
        let resolved = fakes
            .resolver(tmp.path())
            .resolve("s3://bucket/run_FLOW123.tar.gz", &CancellationToken::new())
            .unwrap();

        assert_eq!(resolved.input.identity.sample_id, "run");
        assert_eq!(resolved.input.identity.flowcell_id, "FLOW123");
        assert_eq!(resolved.staged_path, work_dir);
        assert_eq!(fakes.store.downloads(), 0);
        assert_eq!(fakes.archiver.extractions(), 0);
    }

    #[test]
    fn test_remote_query_failure_is_a_staging_error() {
        let tmp = tempfile::tempdir().unwrap();
        let fakes = Fakes {
            store: FakeStore::missing(),
            ..Fakes::new(0)
        };

        let err = fakes
            .resolver(tmp.path())
            .resolve("s3://bucket/run_FLOW123.tar", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::StagingIo {
                step: StagingStep::Query,
                ..
            }
        ));
    }

    #[test]
    fn test_local_archive_extracts_into_empty_work_dir_only() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("sample_run_FLOW9_pod5.tar");
        fs::write(&archive, b"tarball").unwrap();
        let reference = archive.to_string_lossy().into_owned();

        let fakes = Fakes::new(0);
        let scratch = tmp.path().join("scratch");
        let resolver = fakes.resolver(&scratch);
        let cancel = CancellationToken::new();

        let first = resolver.resolve(&reference, &cancel).unwrap();
        assert_eq!(first.input.kind, InputKind::LocalTar);
        assert_eq!(first.staged_path, scratch.join("run/sample_run_FLOW9"));
        assert_eq!(first.performed, vec![StagingStep::Extract]);
        assert!(archive.exists());

        let second = resolver.resolve(&reference, &cancel).unwrap();
        assert!(second.state.is_extracted);
        assert!(second.performed.is_empty());
        assert_eq!(fakes.archiver.extractions(), 1);
    }

    #[test]
    fn test_failed_remote_extraction_is_retried_from_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let fakes = Fakes {
            archiver: FakeArchiver::failing_once(vec![("reads/reads.pod5", 128)]),
            ..Fakes::new(100)
        };
        let resolver = fakes.resolver(tmp.path());
        let cancel = CancellationToken::new();
        let work_dir = tmp.path().join("run/run_FLOW123");

        let err = resolver
            .resolve("s3://bucket/run_FLOW123.tar.gz", &cancel)
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::StagingIo {
                step: StagingStep::Extract,
                ..
            }
        ));
        assert!(work_dir.is_dir());
        assert_eq!(fs::read_dir(&work_dir).unwrap().count(), 0);

        let retried = resolver
            .resolve("s3://bucket/run_FLOW123.tar.gz", &cancel)
            .unwrap();
        assert!(!retried.state.is_downloaded);
        assert_eq!(
            retried.performed,
            vec![StagingStep::Download, StagingStep::Extract]
        );
        assert!(work_dir.join("reads/reads.pod5").exists());
        assert!(!work_dir.join("partial.pod5").exists());
        assert!(!work_dir.join("run_FLOW123.tar.gz").exists());

        assert_eq!(fakes.store.downloads(), 2);
        assert_eq!(fakes.archiver.extractions(), 2);
    }

    #[test]
    fn test_failed_local_extraction_is_retried() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("sample_run_FLOW9_pod5.tar");
        fs::write(&archive, b"tarball").unwrap();
        let reference = archive.to_string_lossy().into_owned();

        let fakes = Fakes {
            archiver: FakeArchiver::failing_once(vec![("reads/reads.pod5", 128)]),
            ..Fakes::new(0)
        };
        let scratch = tmp.path().join("scratch");
        let resolver = fakes.resolver(&scratch);
        let cancel = CancellationToken::new();
        let work_dir = scratch.join("run/sample_run_FLOW9");

        let err = resolver.resolve(&reference, &cancel).unwrap_err();
        assert!(matches!(
            err,
            JobError::StagingIo {
                step: StagingStep::Extract,
                ..
            }
        ));
        assert_eq!(fs::read_dir(&work_dir).unwrap().count(), 0);
        assert!(archive.exists());

        let retried = resolver.resolve(&reference, &cancel).unwrap();
        assert!(!retried.state.is_extracted);
        assert_eq!(retried.performed, vec![StagingStep::Extract]);
        assert!(work_dir.join("reads/reads.pod5").exists());
        assert!(!work_dir.join("partial.pod5").exists());
        assert_eq!(fakes.archiver.extractions(), 2);
    }

    #[test]
    fn test_fast5_is_converted_once() {
        let tmp = tempfile::tempdir().unwrap();
        let run = tmp.path().join("sample_FLOW5");
        fs::create_dir_all(run.join("fast5")).unwrap();
        fs::write(run.join("fast5/a.fast5"), b"a").unwrap();
        fs::write(run.join("fast5/b.fast5"), b"b").unwrap();

        let fakes = Fakes::new(0);
        let resolver = fakes.resolver(tmp.path());
        let reference = run.to_string_lossy().into_owned();
        let cancel = CancellationToken::new();

        let first = resolver.resolve(&reference, &cancel).unwrap();
        let canonical = run.join("pod5_dir/sample_FLOW5.pod5");
        assert_eq!(first.staged_path, canonical);
        assert_eq!(first.performed, vec![StagingStep::Convert]);
        assert!(canonical.exists());
        assert!(!run.join("pod5_dir/.converting").exists());
        assert_eq!(
            fakes.converter.inputs(),
            vec![vec![run.join("fast5/a.fast5"), run.join("fast5/b.fast5")]]
        );

        let second = resolver.resolve(&reference, &cancel).unwrap();
        assert!(second.state.has_converted_pod5);
        assert_eq!(second.staged_path, canonical);
        assert!(second.performed.is_empty());
        assert_eq!(fakes.converter.conversions(), 1);
    }

    #[test]
    fn test_failed_conversion_leaves_no_canonical_file() {
        let tmp = tempfile::tempdir().unwrap();
        let run = tmp.path().join("sample_FLOW5");
        fs::create_dir_all(run.join("fast5")).unwrap();
        fs::write(run.join("fast5/a.fast5"), b"a").unwrap();

        let fakes = Fakes {
            converter: FakeConverter::failing(),
            ..Fakes::new(0)
        };
        let reference = run.to_string_lossy().into_owned();

        let err = fakes
            .resolver(tmp.path())
            .resolve(&reference, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::StagingIo {
                step: StagingStep::Convert,
                ..
            }
        ));
        assert!(!run.join("pod5_dir/sample_FLOW5.pod5").exists());
    }

    #[test]
    fn test_dry_run_performs_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let fakes = Fakes::new(100);

        let resolved = fakes
            .resolver(tmp.path())
            .dry_run(true)
            .resolve("s3://bucket/run_FLOW123.tar", &CancellationToken::new())
            .unwrap();

        assert_eq!(resolved.staged_path, tmp.path().join("run/run_FLOW123"));
        assert_eq!(
            resolved.performed,
            vec![StagingStep::Download, StagingStep::Extract]
        );
        assert!(!tmp.path().join("run").exists());
        assert_eq!(fakes.store.downloads(), 0);
        assert_eq!(fakes.archiver.extractions(), 0);
    }

    #[test]
    fn test_cancelled_before_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let fakes = Fakes::new(100);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fakes
            .resolver(tmp.path())
            .resolve("s3://bucket/run_FLOW123.tar", &cancel)
            .unwrap_err();
        assert!(matches!(err, JobError::Cancelled));
        assert_eq!(fakes.store.downloads(), 0);
    }
}
