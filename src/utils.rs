//! Utilities that are used across the `dorado-batch` subcommands.

pub mod args;
pub mod display;
pub mod fs;
pub mod process;
