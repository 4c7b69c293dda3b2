//! Identity derivation for input references.
//!
//! Nanopore runs are conventionally named `<...>_<sample>_<flowcell>`, and the
//! archives they are shipped in carry an extra raw-signal tag
//! (`<name>_pod5.tar`, `<name>.fast5.tar.gz`, ...). The identity of a unit is
//! the basename of its reference with those suffixes removed.

use serde::Serialize;

use crate::input::kind::InputKind;

/// Raw-signal tags that may sit between a run name and its archive suffix.
const SIGNAL_TAGS: [&str; 4] = ["_fast5", "_pod5", ".fast5", ".pod5"];

/// The delimiter between fields of a run name.
const FIELD_DELIMITER: char = '_';

/// Identity of one unit of work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The sample identifier (the second-to-last field of the run name).
    pub sample_id: String,

    /// The flowcell identifier (the last field of the run name).
    pub flowcell_id: String,

    /// The run name with its archive suffix and raw-signal tag removed.
    pub full_name: String,
}

/// Returns the final path component of a reference. Works for both local
/// paths and object storage URIs, and ignores trailing slashes.
pub fn basename(reference: &str) -> &str {
    let trimmed = reference.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

impl Identity {
    /// Derives the identity of a reference.
    ///
    /// ```
    /// use dorado_batch::input::identity::Identity;
    ///
    /// let identity = Identity::derive("s3://bucket/run_FLOW123.tar.gz");
    /// assert_eq!(identity.sample_id, "run");
    /// assert_eq!(identity.flowcell_id, "FLOW123");
    /// assert_eq!(identity.full_name, "run_FLOW123");
    /// ```
    pub fn derive(reference: &str) -> Self {
        let mut full_name = basename(reference);

        // Stacked archive suffixes (`run.tgz.tar`) are peeled one at a time.
        while let Some(suffix) = InputKind::classify(full_name).stripped_suffix {
            let stem = &full_name[..full_name.len() - suffix.len()];
            full_name = SIGNAL_TAGS
                .iter()
                .find_map(|tag| stem.strip_suffix(tag))
                .unwrap_or(stem);
        }

        Self::from_full_name(full_name)
    }

    /// Splits an already stripped run name into its fields. With a single
    /// field, both the sample and the flowcell identifiers are the whole name.
    fn from_full_name(full_name: &str) -> Self {
        let fields = full_name.split(FIELD_DELIMITER).collect::<Vec<_>>();

        let (sample_id, flowcell_id) = match fields.as_slice() {
            [.., sample, flowcell] => (*sample, *flowcell),
            _ => (full_name, full_name),
        };

        Identity {
            sample_id: sample_id.to_string(),
            flowcell_id: flowcell_id.to_string(),
            full_name: full_name.to_string(),
        }
    }
}
