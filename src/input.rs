//! Input references and the units of work derived from them.

pub mod identity;
pub mod kind;

use std::str::FromStr;

use serde::Serialize;

use crate::errors::JobError;
use crate::input::identity::Identity;
use crate::input::kind::InputKind;

/// One unit of work: an input reference, its kind, and its identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobInput {
    /// The reference exactly as it was given.
    pub reference: String,

    /// The kind of the reference.
    pub kind: InputKind,

    /// The identity derived from the reference.
    pub identity: Identity,
}

impl FromStr for JobInput {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reference = s.trim();
        let identity = Identity::derive(reference);

        if identity.full_name.is_empty() {
            return Err(JobError::InvalidReference(s.to_string()));
        }

        Ok(JobInput {
            reference: reference.to_string(),
            kind: InputKind::classify(reference).kind,
            identity,
        })
    }
}
