//! The version string that keys every output of a run.
//!
//! Outputs are named `<unit>_<version string>.<ext>`, where the version string
//! combines the basecaller version with the models used. Reruns with the same
//! configuration therefore overwrite their previous outputs, while runs with a
//! different basecaller or different models never collide with them.

use std::fmt;

use itertools::Itertools;

use crate::input::identity::basename;
use crate::run::model::ModelSpec;

/// Separates the release version from build metadata (`1.3.0+abc`).
const BUILD_METADATA_SEPARATOR: char = '+';

/// Separates the model name from its version (`sup@v5.0.0`).
const MODEL_VERSION_SEPARATOR: char = '@';

/// The naming key for one basecaller and model configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionString(String);

impl VersionString {
    /// Builds the version string from the basecaller's reported version and the
    /// models in use.
    ///
    /// ```
    /// use dorado_batch::run::model::{Mode, ModelSpec};
    /// use dorado_batch::run::version::VersionString;
    ///
    /// let model = ModelSpec::new(
    ///     "sup@v5.0.0",
    ///     vec!["5mCG_5hmCG".into(), "6mA".into()],
    ///     Mode::Simplex,
    /// )
    /// .unwrap();
    ///
    /// let version = VersionString::new("1.3.0+abc", &model);
    /// assert_eq!(version.as_str(), "dorado1.3.0_supv5.0.0_5mCG_5hmCG_6mA");
    /// ```
    pub fn new(basecaller_version: &str, model: &ModelSpec) -> Self {
        let release = basecaller_version
            .trim()
            .split(BUILD_METADATA_SEPARATOR)
            .next()
            .unwrap_or_default();

        let mut key = format!("dorado{}_{}", release, model_name(&model.base_model));

        if !model.mod_models.is_empty() {
            let mods = model.mod_models.iter().map(|m| basename(m)).join(",");
            key.push('_');
            key.push_str(&mods.replace(',', "_"));
        }

        VersionString(key)
    }

    /// The version string as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The base model's name and version with the separator removed. Models given
/// as paths contribute only their final component.
fn model_name(base_model: &str) -> String {
    basename(base_model).replace(MODEL_VERSION_SEPARATOR, "")
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
