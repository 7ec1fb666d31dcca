//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use dramaturg::Language;
use std::path::PathBuf;

/// Dramaturg - seven-station dramaturgical analysis of screenplays
#[derive(Parser, Debug)]
#[command(name = "dramaturg")]
#[command(about = "Seven-station dramaturgical analysis of screenplays", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file replacing the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a screenplay file
    Analyze(AnalyzeArgs),
}

/// Arguments of `dramaturg analyze`
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Screenplay text file
    pub file: PathBuf,

    /// Project name (defaults to the file stem)
    #[arg(long)]
    pub project: Option<String>,

    /// Analysis language: ar or en
    #[arg(long, default_value = "ar")]
    pub language: Language,

    /// Directory receiving the reports
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Skip the pause between stations
    #[arg(long)]
    pub no_delay: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}
