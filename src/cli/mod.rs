//! Command-line surface: argument parsing, dispatch and output formatting

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands, HistoryCommand, run};
