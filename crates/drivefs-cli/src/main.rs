#![deny(unsafe_code)]

mod commands;
mod exit_code;
mod output;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drivefs_core::{
    DriveConfig, DriveError, DriveOperations, DriveSession, ErrorCategory, MemoryDrive,
};

use crate::commands::{cat, ls, mkdir, mv, rm, rmdir, stat, touch, write};

/// Browse and edit a snapshot-backed drive through drive paths
#[derive(Parser)]
#[command(name = "drivefs")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Create a directory tree
    drivefs mkdir -p /projects/2024

    # Write stdin to a file, then append to it
    echo hello | drivefs write gdrive://projects/2024/notes.txt
    echo again | drivefs write --append /projects/2024/notes.txt

    # List with details, or as JSON for scripting
    drivefs ls -l /projects/2024
    drivefs ls --json / | jq '.entries[].name'
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Drive snapshot file (created on first change)
    #[arg(long, env = "DRIVEFS_STORE", default_value = "drivefs.json", global = true)]
    store: PathBuf,

    /// Configuration file (TOML)
    #[arg(long, env = "DRIVEFS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    Ls(ls::Args),

    /// Write file contents to stdout
    Cat(cat::Args),

    /// Write stdin to a file
    Write(write::Args),

    /// Create a directory
    Mkdir(mkdir::Args),

    /// Remove an empty directory
    Rmdir(rmdir::Args),

    /// Remove a file
    Rm(rm::Args),

    /// Move or rename a directory
    Mv(mv::Args),

    /// Show metadata of a file or directory
    Stat(stat::Args),

    /// Update timestamps, creating an empty file if needed
    Touch(touch::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(categorize_error(&e))
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let drive = Arc::new(
        MemoryDrive::load_or_new(&cli.store)
            .with_context(|| format!("Failed to load drive snapshot: {}", cli.store.display()))?,
    );
    let session = DriveSession::new(drive.clone(), config).into_shared();
    let ops = DriveOperations::new(session);

    match &cli.command {
        Commands::Ls(args) => ls::execute(&ops, args),
        Commands::Cat(args) => cat::execute(&ops, args),
        Commands::Write(args) => write::execute(&ops, args),
        Commands::Mkdir(args) => mkdir::execute(&ops, args),
        Commands::Rmdir(args) => rmdir::execute(&ops, args),
        Commands::Rm(args) => rm::execute(&ops, args),
        Commands::Mv(args) => mv::execute(&ops, args),
        Commands::Stat(args) => stat::execute(&ops, args),
        Commands::Touch(args) => touch::execute(&ops, args),
    }?;

    if drive.calls().mutations() > 0 {
        drive
            .save(&cli.store)
            .with_context(|| format!("Failed to save drive snapshot: {}", cli.store.display()))?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DriveConfig> {
    match path {
        Some(path) => DriveConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(DriveConfig::default()),
    }
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Pick an exit code from the first drive error in the chain.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(drive_err) = cause.downcast_ref::<DriveError>() {
            return match drive_err.category() {
                ErrorCategory::NotFound => exit_code::NOT_FOUND,
                ErrorCategory::AlreadyExists => exit_code::ALREADY_EXISTS,
                ErrorCategory::NotEmpty => exit_code::NOT_EMPTY,
                ErrorCategory::IsDirectory | ErrorCategory::NotDirectory => exit_code::WRONG_TYPE,
                ErrorCategory::NotSupported => exit_code::UNSUPPORTED,
                ErrorCategory::InvalidArgument => exit_code::USAGE,
                ErrorCategory::PermissionDenied
                | ErrorCategory::RateLimited
                | ErrorCategory::IoError => exit_code::REMOTE_FAILURE,
            };
        }
    }
    exit_code::GENERAL_ERROR
}
