use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use drivefs_core::DriveOperations;

use super::drive_url;
use crate::output::{create_table, format_entry_type, format_size, format_time};

#[derive(ClapArgs)]
pub struct Args {
    /// File or directory path
    pub path: String,

    /// Output the raw stat record as JSON
    #[arg(long)]
    pub json: bool,
}

#[instrument(level = "info", name = "cmd::stat", skip_all, fields(path = %args.path))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.path)?;
    let stat = ops.url_stat(&url)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stat)?);
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Path".to_string(), url]);
    table.add_row(vec!["Type".to_string(), format_entry_type(&stat).to_string()]);
    table.add_row(vec![
        "Size".to_string(),
        format!("{} ({} bytes)", format_size(stat.size), stat.size),
    ]);
    table.add_row(vec!["Mode".to_string(), format!("{:o}", stat.mode)]);
    table.add_row(vec!["Owner".to_string(), stat.uid.clone()]);
    table.add_row(vec!["Accessed".to_string(), format_time(stat.atime)]);
    table.add_row(vec!["Modified".to_string(), format_time(stat.mtime)]);
    table.add_row(vec!["Changed".to_string(), format_time(stat.ctime)]);
    println!("{table}");
    Ok(())
}
