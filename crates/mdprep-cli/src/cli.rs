use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "mdprep - Prepares batches of predicted protein structures for molecular dynamics: conversion, protonation, solvation, ionization and simulation configuration.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Directory holding one subdirectory per prediction job.
    /// Prompted for on standard input when omitted.
    #[arg(value_name = "INPUT_ROOT")]
    pub input_root: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the user configuration directory, if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Pipeline Overrides ---
    /// Override the directory prepared jobs are written to.
    #[arg(long = "dest", value_name = "PATH")]
    pub destination_root: Option<PathBuf>,

    /// Override the pH used to assign protonation states.
    #[arg(long, value_name = "FLOAT")]
    pub ph: Option<f64>,

    /// Override the simulation configuration template.
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Override the CHARMM topology file used to build the system.
    #[arg(long, value_name = "PATH")]
    pub topology: Option<PathBuf>,

    // --- Run Policy ---
    /// Exit with a non-zero status if any job failed or was skipped.
    #[arg(long)]
    pub strict: bool,

    /// Skip the startup check for external tools and data files.
    #[arg(long)]
    pub skip_checks: bool,
}
