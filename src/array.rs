//! Functionality related to the `dorado-batch array` subcommand.
//!
//! Basecalls the one input selected by a scheduler array task index.

pub mod command;
