//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

use crate::domain::{EnvOverlay, ExecutionResult, ScriptContext};
use crate::infrastructure::io::Io;
use crate::infrastructure::InfraResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Interpreter that evaluates script chains, lists their functions and runs them.
///
/// Swapping the implementation swaps the scripting language.
pub trait ScriptBackend: Send + Sync {
    /// Token separating namespace segments inside function names.
    fn split_char(&self) -> &str;

    /// Evaluate the chain in a fresh interpreter and list declared functions.
    fn enumerate(&self, context: &ScriptContext) -> InfraResult<Vec<String>>;

    /// Evaluate the chain and call `function` with `args` as positional parameters.
    ///
    /// `env` is applied on top of the inherited environment. Output is
    /// captured into `io` when headless, streamed otherwise.
    fn invoke(
        &self,
        context: &ScriptContext,
        function: &str,
        args: &[String],
        env: &EnvOverlay,
        io: &Io,
    ) -> InfraResult<ExecutionResult>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
