//! Runtime: turns a manifest and argv into a routed command invocation
//!
//! Construction loads the manifest, sets up logging, parses global options
//! and builds the command table. Execution handles version and help, routes
//! the remaining arguments and runs the target.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use crate::application::options::{global_options, HELP, LOG_LEVEL, QUIET, VERSION};
use crate::application::{
    ApplicationError, ApplicationResult, BuiltinCommand, BuiltinContext, CommandTable,
};
use crate::cli::help::{command_help, global_help};
use crate::cli::{output, CliError, CliResult};
use crate::config::Manifest;
use crate::domain::{CommandDef, ExecutionResult, OptionDef, OptionsSet};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::io::Io;
use crate::infrastructure::logging::{LogLevel, LogManager};
use crate::infrastructure::traits::{FileSystem, ScriptBackend};
use crate::infrastructure::InfraError;

/// Who is driving the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    /// Command line, built-ins available
    Cli,
    /// Embedded in another program
    Api,
}

pub type CommandFilter = Arc<dyn Fn(&CommandDef) -> bool + Send + Sync>;
pub type OptionFilter = Arc<dyn Fn(&OptionDef) -> bool + Send + Sync>;

/// Host configuration for a runtime.
#[derive(Clone)]
pub struct Context {
    pub executor: Executor,
    pub io: Io,
    command_enabled: Option<CommandFilter>,
    option_enabled: Option<OptionFilter>,
    builtins: Vec<Arc<dyn BuiltinCommand>>,
    backend: Option<Arc<dyn ScriptBackend>>,
    fs: Option<Arc<dyn FileSystem>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("executor", &self.executor)
            .field("io", &self.io)
            .field("builtins", &self.builtins.iter().map(|b| b.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(executor: Executor, io: Io) -> Self {
        Self {
            executor,
            io,
            command_enabled: None,
            option_enabled: None,
            builtins: Vec::new(),
            backend: None,
            fs: None,
        }
    }

    /// Only register manifest commands accepted by `filter`.
    pub fn with_command_filter(
        mut self,
        filter: impl Fn(&CommandDef) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.command_enabled = Some(Arc::new(filter));
        self
    }

    /// Only register manifest options accepted by `filter`.
    pub fn with_option_filter(
        mut self,
        filter: impl Fn(&OptionDef) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.option_enabled = Some(Arc::new(filter));
        self
    }

    /// Add a built-in command (registered for the CLI executor only).
    pub fn with_builtin(mut self, builtin: impl BuiltinCommand + 'static) -> Self {
        self.builtins.push(Arc::new(builtin));
        self
    }

    /// Replace the script interpreter.
    pub fn with_backend(mut self, backend: Arc<dyn ScriptBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    fn command_enabled(&self, command: &CommandDef) -> bool {
        self.command_enabled.as_ref().map_or(true, |f| f(command))
    }

    fn option_enabled(&self, option: &OptionDef) -> bool {
        self.option_enabled.as_ref().map_or(true, |f| f(option))
    }
}

/// A fully wired CLI ready to execute once.
pub struct Runtime {
    context: Context,
    services: ServiceContainer,
    log: LogManager,
    global: OptionsSet,
    args: Vec<String>,
    table: CommandTable,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("context", &self.context)
            .field("args", &self.args)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Build a runtime from `<manifest> [global options] [command] [args]`.
    pub fn new(args: Vec<String>, context: Context) -> CliResult<Self> {
        let (file, rest) = match args.split_first() {
            Some((file, rest)) => (file.clone(), rest.to_vec()),
            None => (String::new(), Vec::new()),
        };

        let manifest = Manifest::load(Path::new(&file))?;
        let mut log = LogManager::new(
            &manifest.config.log.level,
            &manifest.config.log.prefix,
            &context.io,
        );

        let mut global = global_options(&manifest, |o| context.option_enabled(o))?;
        let args = global.parse(&rest)?;

        let level = if global.get_bool(QUIET) {
            LogLevel::Panic.to_string()
        } else {
            global.get_string(LOG_LEVEL)
        };
        log.try_set_log_level(&level);

        let mut services = ServiceContainer::new(manifest);
        if let Some(fs) = &context.fs {
            services.fs = fs.clone();
        }
        if let Some(backend) = &context.backend {
            services.backend = backend.clone();
        }

        let builtins: &[Arc<dyn BuiltinCommand>] = match context.executor {
            Executor::Cli => &context.builtins,
            Executor::Api => &[],
        };
        let table = log.scope(|| -> ApplicationResult<CommandTable> {
            let table = services.table_builder()?.build(
                &services.manifest.commands,
                builtins,
                |c| context.command_enabled(c),
            )?;
            debug!("command table built: {} entries", table.len());
            Ok(table)
        })?;

        Ok(Self {
            context,
            services,
            log,
            global,
            args,
            table,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.services.manifest
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn global_options(&self) -> &OptionsSet {
        &self.global
    }

    /// Arguments left after global option parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn log_level(&self) -> LogLevel {
        self.log.level()
    }

    /// Run and report the exit code, plus captured output when headless.
    pub fn execute(&self) -> ExecutionResult {
        let io = &self.context.io;
        let mut result = self.log.scope(|| match self.run() {
            Ok(result) => result,
            Err(e) => {
                error!("{}", e);
                if !e.is_not_found() {
                    let _ = output::error(io, &e);
                }
                ExecutionResult {
                    exit_code: e.exit_code(),
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        });

        if io.is_headless() {
            result.stdout = io.captured_stdout();
            result.stderr = io.captured_stderr();
        }
        result
    }

    fn run(&self) -> CliResult<ExecutionResult> {
        let io = &self.context.io;
        let manifest = self.manifest();

        if self.global.get_bool(VERSION) {
            output::info(io, &manifest.config.version).map_err(write_error)?;
            return Ok(ExecutionResult::with_code(exitcode::OK));
        }
        if self.global.get_bool(HELP) || self.args.is_empty() {
            self.print(&global_help(manifest, &self.table, &self.global))?;
            return Ok(ExecutionResult::with_code(exitcode::OK));
        }

        let dispatcher = self.services.dispatcher();
        let invocation = match dispatcher.prepare(&self.table, &self.args) {
            Ok(invocation) => invocation,
            Err(e @ ApplicationError::CommandNotFound(_)) => {
                output::error(io, &e).map_err(write_error)?;
                self.print(&global_help(manifest, &self.table, &self.global))?;
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        if invocation.help_requested() {
            self.print(&command_help(
                manifest,
                &self.table,
                invocation.entry,
                invocation.options.as_ref(),
            ))?;
            return Ok(ExecutionResult::with_code(exitcode::OK));
        }

        let ctx = BuiltinContext {
            manifest,
            table: &self.table,
            io,
        };
        Ok(dispatcher.invoke(&invocation, &self.global, &ctx)?)
    }

    /// Help goes to stderr.
    fn print(&self, text: &str) -> CliResult<()> {
        self.context
            .io
            .stderr()
            .write_all(text.as_bytes())
            .map_err(write_error)
    }
}

fn write_error(e: std::io::Error) -> CliError {
    InfraError::io("write output", e).into()
}
