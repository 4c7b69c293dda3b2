//! Functionality related to the `dorado-batch local` subcommand.
//!
//! Basecalls every input in a list, one after another, on a single machine.

pub mod command;
