//! List command.
//!
//! # Examples
//!
//! ```bash
//! drivefs ls /projects
//! drivefs ls -l /projects
//! drivefs ls --json / | jq '.entries[].name'
//! ```

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use drivefs_core::{DriveOperations, StatRecord};

use super::{drive_url, entry_name};
use crate::output::{create_table, format_entry_type, format_size, format_time};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Directory or file path (default: root)
    #[arg(default_value = "/")]
    pub path: String,

    /// Show detailed information
    #[arg(short, long)]
    pub long: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// One entry per line
    #[arg(short = '1')]
    pub one_per_line: bool,
}

#[derive(Serialize)]
struct LsOutput {
    path: String,
    entries: Vec<EntryInfo>,
}

#[derive(Serialize)]
struct EntryInfo {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
    size: u64,
    mtime: i64,
}

impl EntryInfo {
    fn new(name: &str, stat: &StatRecord) -> Self {
        Self {
            name: name.to_string(),
            entry_type: format_entry_type(stat).to_string(),
            size: stat.size,
            mtime: stat.mtime,
        }
    }
}

#[instrument(level = "info", name = "cmd::ls", skip_all, fields(path = %args.path))]
pub fn execute(ops: &DriveOperations, args: &Args) -> Result<()> {
    let url = drive_url(ops, &args.path)?;
    let stat = ops.url_stat(&url)?;

    let entries = if stat.is_dir() {
        let mut cursor = ops.open_dir(&url)?;
        let paths = cursor.collect_remaining()?;
        cursor.close();
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let stat = ops.url_stat(&path)?;
            entries.push(EntryInfo::new(entry_name(&path), &stat));
        }
        entries
    } else {
        vec![EntryInfo::new(entry_name(&url), &stat)]
    };

    if args.json {
        let output = LsOutput { path: url, entries };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if args.long {
        print_long_format(&entries);
    } else {
        print_short_format(&entries, args.one_per_line);
    }
    Ok(())
}

fn display_name(entry: &EntryInfo) -> String {
    if entry.entry_type == "dir" {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    }
}

fn print_long_format(entries: &[EntryInfo]) {
    let mut table = create_table();
    table.set_header(vec!["Type", "Size", "Modified", "Name"]);
    for entry in entries {
        let size = if entry.entry_type == "dir" {
            "-".to_string()
        } else {
            format_size(entry.size)
        };
        table.add_row(vec![
            entry.entry_type.clone(),
            size,
            format_time(entry.mtime),
            display_name(entry),
        ]);
    }
    println!("{table}");
}

fn print_short_format(entries: &[EntryInfo], one_per_line: bool) {
    let names: Vec<String> = entries.iter().map(display_name).collect();
    if one_per_line || names.len() > 10 {
        for name in names {
            println!("{name}");
        }
    } else if !names.is_empty() {
        println!("{}", names.join("  "));
    }
}
