//! Built-in commands shipped with the binary

use std::io::Write;

use itertools::Itertools;
use termtree::Tree;

use crate::application::{
    ApplicationError, ApplicationResult, BuiltinCommand, BuiltinContext, CommandTable,
};
use crate::exitcode;

/// Prints the manifest summary and the command tree.
#[derive(Debug, Default)]
pub struct InfoCommand;

/// Keys one segment below `prefix`, including intermediate segments
/// that have no entry of their own.
fn branch(table: &CommandTable, prefix: &str, label: String) -> Tree<String> {
    let segments: Vec<&str> = table
        .keys()
        .filter_map(|key| {
            if prefix.is_empty() {
                Some(key)
            } else {
                key.strip_prefix(prefix).and_then(|r| r.strip_prefix(' '))
            }
        })
        .filter_map(|rest| rest.split(' ').next())
        .unique()
        .collect();

    let leaves: Vec<_> = segments
        .into_iter()
        .map(|segment| {
            let key = if prefix.is_empty() {
                segment.to_string()
            } else {
                format!("{prefix} {segment}")
            };
            let label = match table.get(&key) {
                Some(entry) if entry.target.is_hidden() => format!("{segment} (hidden)"),
                _ => segment.to_string(),
            };
            branch(table, &key, label)
        })
        .collect();
    Tree::new(label).with_leaves(leaves)
}

/// Every registered command as a tree rooted at `root`.
pub fn command_tree(root: &str, table: &CommandTable) -> Tree<String> {
    branch(table, "", root.to_string())
}

impl BuiltinCommand for InfoCommand {
    fn name(&self) -> &str {
        "info"
    }

    fn description(&self) -> &str {
        "Displays information about the cli"
    }

    fn run(&self, _args: &[String], ctx: &BuiltinContext<'_>) -> ApplicationResult<i32> {
        let manifest = ctx.manifest;
        let mut out = String::new();
        out.push_str(&format!(
            "name:      {}\nversion:   {}\nmanifest:  {}\nbase path: {}\n",
            manifest.config.name,
            manifest.config.version,
            manifest.path.display(),
            manifest.base_path.display()
        ));
        out.push_str("scripts:\n");
        for script in &manifest.scripts {
            out.push_str(&format!("  {}\n", script.display()));
        }
        out.push_str(&format!(
            "commands:\n{}",
            command_tree(&manifest.config.name, ctx.table)
        ));

        ctx.io
            .stdout()
            .write_all(out.as_bytes())
            .map_err(|e| ApplicationError::OperationFailed {
                context: "write info".into(),
                source: Box::new(e),
            })?;
        Ok(exitcode::OK)
    }
}
