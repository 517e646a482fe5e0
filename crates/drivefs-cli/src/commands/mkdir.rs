use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use drivefs_core::DriveOperations;

use super::drive_url;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory path or URL
    pub path: String,

    /// Create missing parent directories
    #[arg(short, long)]
    pub parents: bool,

    /// Permission bits to request (octal)
    #[arg(short, long, default_value = "755", value_parser = parse_octal)]
    pub mode: u32,
}

fn parse_octal(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s, 8).map_err(|e| format!("invalid octal mode '{s}': {e}"))
}

#[instrument(level = "info", name = "cmd::mkdir", skip_all, fields(path = %args.path, parents = args.parents))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.path)?;
    ops.mkdir(&url, args.mode, args.parents)?;
    Ok(())
}
