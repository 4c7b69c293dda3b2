//! Output paths for one job.

use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::run::version::VersionString;

/// The files written by one job, all derived from the unit name and the
/// [`VersionString`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobOutput {
    /// The basecalled alignment records.
    pub bam_path: PathBuf,

    /// The gzipped sequencing summary.
    pub summary_path: PathBuf,

    /// The per-job log.
    pub log_path: PathBuf,
}

impl JobOutput {
    /// Derives the output paths for `unit_name` within `output_dir`.
    ///
    /// ```
    /// use std::path::Path;
    /// use dorado_batch::run::model::{Mode, ModelSpec};
    /// use dorado_batch::run::outputs::JobOutput;
    /// use dorado_batch::run::version::VersionString;
    ///
    /// let model = ModelSpec::new("sup@v5.0.0", Vec::new(), Mode::Simplex).unwrap();
    /// let version = VersionString::new("1.3.0", &model);
    /// let output = JobOutput::derive(Path::new("/out"), "run_FLOW123", &version);
    ///
    /// assert_eq!(output.bam_path, Path::new("/out/run_FLOW123_dorado1.3.0_supv5.0.0.bam"));
    /// assert_eq!(
    ///     output.summary_path,
    ///     Path::new("/out/run_FLOW123_dorado1.3.0_supv5.0.0_summary.txt.gz")
    /// );
    /// assert_eq!(output.log_path, Path::new("/out/run_FLOW123_dorado1.3.0_supv5.0.0.log"));
    /// ```
    pub fn derive(output_dir: &Path, unit_name: &str, version: &VersionString) -> Self {
        // Version strings contain dots, so extensions are spelled out rather
        // than set with `Path::set_extension`.
        let stem = format!("{}_{}", unit_name, version);

        JobOutput {
            bam_path: output_dir.join(format!("{}.bam", stem)),
            summary_path: output_dir.join(format!("{}_summary.txt.gz", stem)),
            log_path: output_dir.join(format!("{}.log", stem)),
        }
    }
}
