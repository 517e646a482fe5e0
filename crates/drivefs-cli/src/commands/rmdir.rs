use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use drivefs_core::DriveOperations;

use super::drive_url;

#[derive(ClapArgs)]
pub struct Args {
    /// Empty directory to remove
    pub path: String,
}

#[instrument(level = "info", name = "cmd::rmdir", skip_all, fields(path = %args.path))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.path)?;
    ops.rmdir(&url)?;
    Ok(())
}
