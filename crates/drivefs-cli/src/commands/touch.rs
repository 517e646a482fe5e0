use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args as ClapArgs;
use tracing::instrument;

use drivefs_core::{DriveOperations, MetadataOption};

use super::drive_url;

#[derive(ClapArgs)]
pub struct Args {
    /// File or directory path
    pub path: String,

    /// Modification time (RFC 3339) instead of now
    #[arg(short, long, value_parser = parse_time)]
    pub time: Option<DateTime<Utc>>,
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid time '{s}': {e}"))
}

#[instrument(level = "info", name = "cmd::touch", skip_all, fields(path = %args.path))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.path)?;
    ops.set_metadata(
        &url,
        MetadataOption::Touch {
            mtime: args.time,
            atime: None,
        },
    )?;
    Ok(())
}
