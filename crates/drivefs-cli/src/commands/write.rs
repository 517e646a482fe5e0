//! Write command - store stdin as a file.
//!
//! ```bash
//! echo hello | drivefs write /notes/today.txt
//! echo again | drivefs write --append /notes/today.txt
//! ```

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::io::{self, Read};
use tracing::{info, instrument};

use drivefs_core::DriveOperations;

use super::drive_url;

#[derive(ClapArgs)]
pub struct Args {
    /// Destination file path or URL
    pub file: String,

    /// Append to existing content instead of replacing it
    #[arg(short, long)]
    pub append: bool,

    /// Fail if the file already exists
    #[arg(short = 'n', long, conflicts_with = "append")]
    pub no_clobber: bool,
}

impl Args {
    fn mode(&self) -> &'static str {
        if self.append {
            "a"
        } else if self.no_clobber {
            "x"
        } else {
            "w"
        }
    }
}

#[instrument(level = "info", name = "cmd::write", skip_all, fields(file = %args.file, append = args.append))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.file)?;

    let mut data = Vec::new();
    io::stdin()
        .read_to_end(&mut data)
        .context("Failed to read stdin")?;

    let mut handle = ops.open_file(&url, args.mode())?;
    if !data.is_empty() {
        handle.write(&data)?;
    } else if !args.append {
        // Nothing to write: still create the file, or empty the existing one.
        handle.truncate(0)?;
    }
    handle.close();
    info!(bytes = data.len(), "wrote file");
    Ok(())
}
