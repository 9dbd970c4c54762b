//! CLI argument definitions using clap
//!
//! Only the manifest path is interpreted here. Everything after it is the
//! generated CLI's own argv and is passed through untouched.

use clap::Parser;

/// Turn a manifest and a tree of shell scripts into a multi-command CLI
#[derive(Parser, Debug)]
#[command(name = "centry")]
#[command(author, about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Manifest file followed by global options, command and arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

impl Cli {
    /// Manifest path plus the generated CLI's arguments, as the runtime expects them.
    pub fn into_runtime_args(self) -> Vec<String> {
        self.args
    }
}
