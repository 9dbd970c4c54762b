//! CLI layer: argument collection, runtime and help output

pub mod args;
pub mod builtins;
pub mod error;
pub mod help;
pub mod output;
pub mod runtime;

pub use args::Cli;
pub use builtins::InfoCommand;
pub use error::{CliError, CliResult};
pub use runtime::{Context, Executor, Runtime};
