//! Native commands supplied by the host program

use crate::application::{ApplicationResult, CommandTable};
use crate::config::Manifest;
use crate::infrastructure::io::Io;

/// What a built-in can see while it runs.
pub struct BuiltinContext<'a> {
    pub manifest: &'a Manifest,
    pub table: &'a CommandTable,
    pub io: &'a Io,
}

/// A command implemented in Rust instead of a script function.
///
/// Built-ins skip script loading and introspection. They are registered
/// only when running as a CLI.
pub trait BuiltinCommand: Send + Sync {
    /// Command key, may contain spaces for nested commands.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run with the positional arguments left after routing, returning the exit code.
    fn run(&self, args: &[String], ctx: &BuiltinContext<'_>) -> ApplicationResult<i32>;
}
