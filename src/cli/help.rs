//! Help text for the generated CLI

use std::fmt::Write as _;

use itertools::Itertools;

use crate::application::{CommandTable, CommandTableEntry};
use crate::config::Manifest;
use crate::domain::OptionsSet;

const INDENT: &str = "    ";
const GAP: usize = 4;

/// Rows of `label  description`, labels padded to a common width.
fn section(out: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0) + GAP;
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    for (label, description) in rows {
        let line = format!("{INDENT}{label:<width$}{description}");
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

/// Hidden entries are listed only below a hidden parent.
fn command_rows<'a>(
    entries: impl Iterator<Item = &'a CommandTableEntry>,
    parent: &str,
    include_hidden: bool,
) -> Vec<(String, String)> {
    entries
        .filter(|e| include_hidden || !e.target.is_hidden())
        .map(|e| {
            let name = e
                .key
                .strip_prefix(parent)
                .map(str::trim_start)
                .unwrap_or(&e.key);
            (name.to_string(), e.target.description().to_string())
        })
        .collect()
}

fn option_rows(options: &OptionsSet) -> Vec<(String, String)> {
    options
        .options()
        .iter()
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .map(|o| (o.usage_label(), o.description.clone()))
        .collect()
}

/// Top-level help: usage, visible commands and global options.
pub fn global_help(manifest: &Manifest, table: &CommandTable, global: &OptionsSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Usage: {} [global options] <command> [args]",
        manifest.config.name
    );
    section(&mut out, "Commands:", &command_rows(table.children(""), "", false));
    section(&mut out, "Global options:", &option_rows(global));
    out
}

/// Help for one command: usage, description, subcommands and its options.
pub fn command_help(
    manifest: &Manifest,
    table: &CommandTable,
    entry: &CommandTableEntry,
    local: Option<&OptionsSet>,
) -> String {
    let mut out = String::new();
    let has_children = table.children(&entry.key).next().is_some();
    let _ = writeln!(
        out,
        "Usage: {} {}{}{} [args]",
        manifest.config.name,
        entry.key,
        if local.is_some() { " [options]" } else { "" },
        if has_children { " [command]" } else { "" },
    );

    let description = entry.target.description();
    if !description.is_empty() {
        let _ = write!(out, "\n{description}\n");
    }

    section(
        &mut out,
        "Commands:",
        &command_rows(
            table.children(&entry.key),
            &entry.key,
            entry.target.is_hidden(),
        ),
    );
    if let Some(local) = local {
        section(&mut out, "Options:", &option_rows(local));
    }
    out
}
