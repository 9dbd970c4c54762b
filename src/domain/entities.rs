//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::options::OptionDef;

/// A command declared by the manifest.
///
/// The script path is already resolved against the manifest base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    /// Hidden commands are dispatchable but left out of help output
    pub hidden: bool,
    /// Command-scoped options
    pub options: Vec<OptionDef>,
}

impl CommandDef {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: String::new(),
            hidden: false,
            options: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn option(mut self, option: OptionDef) -> Self {
        self.options.push(option);
        self
    }
}

/// Ordered chain of shell files evaluated before introspection or invocation.
///
/// Shared files come first, the command's own script last. Owned by the
/// command that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContext {
    /// Name of the owning command
    pub command: String,
    /// Files in evaluation order
    pub files: Vec<PathBuf>,
}

impl ScriptContext {
    /// The command's own script (last in the chain).
    pub fn script(&self) -> Option<&PathBuf> {
        self.files.last()
    }
}

/// A callable function discovered in a loaded script context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionEntry {
    pub name: String,
    pub command: String,
}

/// Environment changes applied on top of the inherited process environment.
///
/// `Some(value)` sets the variable, `None` removes it.
pub type EnvOverlay = BTreeMap<String, Option<String>>;

/// Outcome of running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    /// Captured stdout, `None` when streamed to the terminal
    pub stdout: Option<String>,
    /// Captured stderr, `None` when streamed to the terminal
    pub stderr: Option<String>,
    /// Error reported by the runtime itself (not by the script)
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn with_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Captured stdout or an empty string.
    pub fn stdout_str(&self) -> &str {
        self.stdout.as_deref().unwrap_or_default()
    }

    /// Captured stderr or an empty string.
    pub fn stderr_str(&self) -> &str {
        self.stderr.as_deref().unwrap_or_default()
    }
}
