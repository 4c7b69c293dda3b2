//! `dorado-batch` is a command line tool written to stage and basecall batches
//! of Oxford Nanopore sequencing runs with the Dorado basecaller. This package
//! is composed of both a library crate, as well as a binary crate.
//!
//! The library crate exposes the per-unit job pipeline: the input resolver
//! ([`resolve`]), which turns an input reference (a local directory, a local
//! archive, or an archive in object storage) into a path that is ready to be
//! basecalled, and the job runner ([`run`]), which invokes the basecaller and
//! writes deterministically named outputs. The [`batch`] module strings the
//! two together with per-job isolation.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod array;
pub mod batch;
pub mod cancel;
pub mod config;
pub mod errors;
pub mod input;
pub mod local;
pub mod resolve;
pub mod run;
pub mod stage;
pub mod tools;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
