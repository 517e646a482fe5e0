use anyhow::Result;
use clap::Args as ClapArgs;
use std::io::{self, Write};
use tracing::instrument;

use drivefs_core::DriveOperations;

use super::drive_url;

const CHUNK_SIZE: usize = 8192;

#[derive(ClapArgs)]
pub struct Args {
    /// File path or URL
    pub file: String,
}

#[instrument(level = "info", name = "cmd::cat", skip_all, fields(file = %args.file))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.file)?;
    let mut handle = ops.open_file(&url, "r")?;
    let mut stdout = io::stdout().lock();
    loop {
        let chunk = handle.read(CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        stdout.write_all(&chunk)?;
    }
    stdout.flush()?;
    handle.close();
    Ok(())
}
