//! Functionality related to the `dorado-batch stage` subcommand.

pub mod command;
