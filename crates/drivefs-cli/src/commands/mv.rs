use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use drivefs_core::DriveOperations;

use super::drive_url;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory to move
    pub source: String,

    /// New path; its parent is created if missing
    pub dest: String,
}

#[instrument(level = "info", name = "cmd::mv", skip_all, fields(source = %args.source, dest = %args.dest))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let from = drive_url(ops, &args.source)?;
    let to = drive_url(ops, &args.dest)?;
    ops.rename(&from, &to)?;
    Ok(())
}
