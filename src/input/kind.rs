//! Classification of input references.
//!
//! An input reference is classified purely from its textual form: a remote
//! scheme prefix and an archive suffix. No filesystem or network state is
//! consulted, so the same reference always classifies the same way.

use std::fmt;

use serde::Serialize;

/// The scheme that marks a reference as living in object storage.
pub const REMOTE_SCHEME: &str = "s3://";

/// Suffixes of gzipped tarballs.
const TAR_GZ_SUFFIXES: [&str; 2] = [".tar.gz", ".tgz"];

/// Suffix of plain tarballs.
const TAR_SUFFIX: &str = ".tar";

/// The compression applied to a tarball.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A plain `.tar` archive.
    Tar,

    /// A gzipped `.tar.gz` or `.tgz` archive.
    TarGz,
}

/// The kind of an input reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// A local directory that is basecalled in place.
    LocalDir,

    /// A local gzipped tarball.
    LocalTarGz,

    /// A local tarball.
    LocalTar,

    /// A gzipped tarball in object storage.
    RemoteTarGz,

    /// A tarball in object storage.
    RemoteTar,
}

/// The result of classifying a reference: its kind, along with the archive
/// suffix that was recognized (if any).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// The kind of the reference.
    pub kind: InputKind,

    /// The archive suffix that matched, if the reference is an archive.
    pub stripped_suffix: Option<&'static str>,
}

impl InputKind {
    /// Classifies a reference. The first matching rule wins:
    ///
    /// 1. remote and gzipped tarball,
    /// 2. remote and tarball,
    /// 3. local gzipped tarball,
    /// 4. local tarball,
    /// 5. anything else is a local directory.
    ///
    /// ```
    /// use dorado_batch::input::kind::InputKind;
    ///
    /// let classification = InputKind::classify("s3://bucket/run_FLOW123.tar.gz");
    /// assert_eq!(classification.kind, InputKind::RemoteTarGz);
    /// assert_eq!(classification.stripped_suffix, Some(".tar.gz"));
    /// ```
    pub fn classify(reference: &str) -> Classification {
        let remote = reference.starts_with(REMOTE_SCHEME);
        let tar_gz = TAR_GZ_SUFFIXES
            .iter()
            .find(|suffix| reference.ends_with(*suffix))
            .copied();
        let tar = reference.ends_with(TAR_SUFFIX).then_some(TAR_SUFFIX);

        let (kind, stripped_suffix) = match (remote, tar_gz, tar) {
            (true, Some(suffix), _) => (InputKind::RemoteTarGz, Some(suffix)),
            (true, None, Some(suffix)) => (InputKind::RemoteTar, Some(suffix)),
            (false, Some(suffix), _) => (InputKind::LocalTarGz, Some(suffix)),
            (false, None, Some(suffix)) => (InputKind::LocalTar, Some(suffix)),
            (_, None, None) => (InputKind::LocalDir, None),
        };

        Classification {
            kind,
            stripped_suffix,
        }
    }

    /// Whether the reference lives in object storage.
    pub fn is_remote(&self) -> bool {
        matches!(self, InputKind::RemoteTarGz | InputKind::RemoteTar)
    }

    /// The archive format, or `None` for a local directory.
    pub fn archive_format(&self) -> Option<ArchiveFormat> {
        match self {
            InputKind::LocalDir => None,
            InputKind::LocalTarGz | InputKind::RemoteTarGz => Some(ArchiveFormat::TarGz),
            InputKind::LocalTar | InputKind::RemoteTar => Some(ArchiveFormat::Tar),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::LocalDir => write!(f, "local directory"),
            InputKind::LocalTarGz => write!(f, "local gzipped tarball"),
            InputKind::LocalTar => write!(f, "local tarball"),
            InputKind::RemoteTarGz => write!(f, "remote gzipped tarball"),
            InputKind::RemoteTar => write!(f, "remote tarball"),
        }
    }
}
