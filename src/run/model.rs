//! Basecalling model configuration.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::errors::ConfigError;

/// The basecalling mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Each read is basecalled on its own.
    Simplex,

    /// Complementary strands are paired and basecalled together.
    Duplex,
}

impl Mode {
    /// The basecaller subcommand that runs this mode.
    pub fn subcommand(&self) -> &'static str {
        match self {
            Mode::Simplex => "basecaller",
            Mode::Duplex => "duplex",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Simplex => write!(f, "simplex"),
            Mode::Duplex => write!(f, "duplex"),
        }
    }
}

/// The models used for one basecalling run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    /// The base model (a name such as `sup@v5.0.0`, or a path).
    pub base_model: String,

    /// Modified base models, in the order given.
    pub mod_models: Vec<String>,

    /// Simplex or duplex.
    pub mode: Mode,
}

impl ModelSpec {
    /// Creates a new [`ModelSpec`]. Blank modified base model entries (for
    /// example from a trailing comma) are dropped.
    pub fn new(base_model: &str, mod_models: Vec<String>, mode: Mode) -> Result<Self, ConfigError> {
        let base_model = base_model.trim();
        if base_model.is_empty() {
            return Err(ConfigError::MissingModel);
        }

        let mod_models = mod_models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        Ok(ModelSpec {
            base_model: base_model.to_string(),
            mod_models,
            mode,
        })
    }

    /// The model argument passed to the basecaller: the base model alone, or
    /// the base model followed by the comma-joined modified base models.
    ///
    /// ```
    /// use dorado_batch::run::model::{Mode, ModelSpec};
    ///
    /// let spec = ModelSpec::new("sup@v5.0.0", vec!["6mA".into()], Mode::Simplex).unwrap();
    /// assert_eq!(spec.model_argument(), "sup@v5.0.0,6mA");
    /// ```
    pub fn model_argument(&self) -> String {
        std::iter::once(self.base_model.as_str())
            .chain(self.mod_models.iter().map(String::as_str))
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_argument_without_mods() {
        let spec = ModelSpec::new("hac@v5.0.0", Vec::new(), Mode::Duplex).unwrap();
        assert_eq!(spec.model_argument(), "hac@v5.0.0");
        assert_eq!(spec.mode.subcommand(), "duplex");
    }

    #[test]
    fn test_model_argument_with_mods() {
        let spec = ModelSpec::new(
            "sup@v5.0.0",
            vec!["5mCG_5hmCG".into(), " ".into(), "6mA".into()],
            Mode::Simplex,
        )
        .unwrap();
        assert_eq!(spec.mod_models, vec!["5mCG_5hmCG", "6mA"]);
        assert_eq!(spec.model_argument(), "sup@v5.0.0,5mCG_5hmCG,6mA");
        assert_eq!(spec.mode.subcommand(), "basecaller");
    }

    #[test]
    fn test_missing_model() {
        assert!(matches!(
            ModelSpec::new("  ", Vec::new(), Mode::Simplex),
            Err(ConfigError::MissingModel)
        ));
    }
}
