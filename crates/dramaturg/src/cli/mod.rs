//! Command-line interface module.

mod analyze;
mod commands;

pub use analyze::analyze;
pub use commands::{AnalyzeArgs, Cli, Commands};
