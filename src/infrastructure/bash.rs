//! Bash implementation of the script backend
//!
//! Every operation runs in a fresh `bash -c` process that sources the whole
//! chain in order, so side effects of earlier files always happen first.

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

use regex::Regex;
use tracing::{debug, trace};

use crate::domain::namespace::DEFAULT_SEPARATOR;
use crate::domain::{EnvOverlay, ExecutionResult, ScriptContext};
use crate::infrastructure::io::Io;
use crate::infrastructure::traits::ScriptBackend;
use crate::infrastructure::{InfraError, InfraResult};

/// Interpreter used when none is configured.
pub const DEFAULT_SHELL: &str = "bash";

/// Runs script chains through bash.
#[derive(Debug, Clone)]
pub struct BashBackend {
    program: String,
    split_char: String,
}

impl Default for BashBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, DEFAULT_SEPARATOR)
    }
}

impl BashBackend {
    pub fn new(program: impl Into<String>, split_char: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            split_char: split_char.into(),
        }
    }

    /// One `source '<file>'` line per file, in chain order.
    fn source_chain(&self, context: &ScriptContext) -> InfraResult<String> {
        let mut script = String::new();
        for file in &context.files {
            let path = file.to_string_lossy();
            script.push_str("source ");
            script.push_str(&quote(&path)?);
            script.push('\n');
        }
        Ok(script)
    }

    fn command(&self, script: &str, args: &[String], env: &EnvOverlay) -> Command {
        let mut cmd = Command::new(&self.program);
        // $0 is the interpreter name, the rest become "$@"
        cmd.arg("-c").arg(script).arg(&self.program).args(args);
        for (key, value) in env {
            match value {
                Some(v) => cmd.env(key, v),
                None => cmd.env_remove(key),
            };
        }
        cmd
    }

    fn spawn_error(&self, source: io::Error) -> InfraError {
        InfraError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl ScriptBackend for BashBackend {
    fn split_char(&self) -> &str {
        &self.split_char
    }

    fn enumerate(&self, context: &ScriptContext) -> InfraResult<Vec<String>> {
        let script = format!("{}declare -F\n", self.source_chain(context)?);
        trace!("enumerate script:\n{}", script);

        let output = self
            .command(&script, &[], &EnvOverlay::new())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(InfraError::Interpreter {
                program: self.program.clone(),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let functions = parse_declarations(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "enumerate: command={} functions={:?}",
            context.command, functions
        );
        Ok(functions)
    }

    fn invoke(
        &self,
        context: &ScriptContext,
        function: &str,
        args: &[String],
        env: &EnvOverlay,
        io: &Io,
    ) -> InfraResult<ExecutionResult> {
        let script = format!(
            "{}{} \"$@\"\n",
            self.source_chain(context)?,
            quote(function)?
        );
        debug!("invoke: function={} args={:?}", function, args);

        let mut cmd = self.command(&script, args, env);
        match io {
            Io::Terminal => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| self.spawn_error(e))?;
                Ok(ExecutionResult::with_code(exit_code(status)))
            }
            Io::Headless(_) => {
                // output() drains both pipes while waiting
                let output = cmd
                    .stdin(Stdio::null())
                    .output()
                    .map_err(|e| self.spawn_error(e))?;
                io.stdout()
                    .write_all(&output.stdout)
                    .map_err(|e| InfraError::io("capture stdout", e))?;
                io.stderr()
                    .write_all(&output.stderr)
                    .map_err(|e| InfraError::io("capture stderr", e))?;
                Ok(ExecutionResult {
                    exit_code: exit_code(output.status),
                    stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
                    stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
                    error: None,
                })
            }
        }
    }
}

fn quote(word: &str) -> InfraResult<String> {
    shlex::try_quote(word)
        .map(|q| q.into_owned())
        .map_err(|e| {
            InfraError::io(
                format!("quote {word:?}"),
                io::Error::new(io::ErrorKind::InvalidInput, e),
            )
        })
}

/// Function names from `declare -F` output (`declare -f name`, `declare -fx name`).
fn parse_declarations(output: &str) -> InfraResult<Vec<String>> {
    let re = Regex::new(r"^declare -f\S*\s+(\S+)\s*$").map_err(|e| {
        InfraError::io(
            "compile declaration pattern",
            io::Error::new(io::ErrorKind::InvalidInput, e),
        )
    })?;
    Ok(output
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect())
}

/// Child exit code; signal deaths map to `128 + signal` like a shell does.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}
