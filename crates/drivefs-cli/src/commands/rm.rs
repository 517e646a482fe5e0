//! Remove command.
//!
//! Only files are removed; use `rmdir` for directories.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use drivefs_core::{DriveError, DriveOperations};

use super::drive_url;

#[derive(ClapArgs)]
pub struct Args {
    /// Files to remove
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Ignore files that do not exist
    #[arg(short, long)]
    pub force: bool,
}

#[instrument(level = "info", name = "cmd::rm", skip_all, fields(count = args.paths.len()))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    for raw in &args.paths {
        let url = drive_url(ops, raw)?;
        match ops.unlink(&url) {
            Ok(()) => info!(path = %url, "removed"),
            Err(DriveError::NotFound(_)) if args.force => {
                warn!(path = %url, "not found, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
