//! Routing argv to a table entry and running it

use std::sync::Arc;

use tracing::debug;

use crate::application::options::{command_options, HELP};
use crate::application::{
    ApplicationError, ApplicationResult, BuiltinContext, CommandTable, CommandTableEntry,
    Dispatchable,
};
use crate::domain::{merged_exports, EnvOverlay, ExecutionResult, OptionsSet};
use crate::infrastructure::traits::ScriptBackend;

/// A routed call: the entry, its parsed local options and positional args.
#[derive(Debug)]
pub struct Invocation<'t> {
    pub entry: &'t CommandTableEntry,
    /// Parsed command options, `None` for built-ins
    pub options: Option<OptionsSet>,
    pub args: Vec<String>,
}

impl Invocation<'_> {
    /// Help was asked for, or the entry is a group with nothing to run.
    pub fn help_requested(&self) -> bool {
        matches!(self.entry.target, Dispatchable::Group(_))
            || self.options.as_ref().is_some_and(|o| o.get_bool(HELP))
    }

    /// Child environment changes, resolved over global and local options.
    ///
    /// A variable both scopes can set forms a single group, with the local
    /// options supplied last.
    pub fn environment(&self, global: &OptionsSet) -> EnvOverlay {
        match &self.options {
            Some(local) => merged_exports(&[global, local]),
            None => global.exports().clone(),
        }
    }
}

/// Runs table entries.
pub struct Dispatcher {
    backend: Arc<dyn ScriptBackend>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ScriptBackend>) -> Self {
        Self { backend }
    }

    /// Route `args` and parse the target's options.
    ///
    /// Fails with `CommandNotFound` before anything is spawned.
    pub fn prepare<'t>(
        &self,
        table: &'t CommandTable,
        args: &[String],
    ) -> ApplicationResult<Invocation<'t>> {
        let (entry, used) = table.lookup(args).ok_or_else(|| {
            ApplicationError::CommandNotFound(args.first().cloned().unwrap_or_default())
        })?;
        let rest = &args[used..];

        let invocation = match &entry.target {
            Dispatchable::Builtin(_) => Invocation {
                entry,
                options: None,
                args: rest.to_vec(),
            },
            Dispatchable::Script(script) => {
                let mut options = command_options(&script.command)?;
                let args = options.parse(rest)?;
                Invocation {
                    entry,
                    options: Some(options),
                    args,
                }
            }
            Dispatchable::Group(command) => {
                let mut options = command_options(command)?;
                let args = options.parse(rest)?;
                if let Some(unknown) = args.first() {
                    return Err(ApplicationError::CommandNotFound(unknown.clone()));
                }
                Invocation {
                    entry,
                    options: Some(options),
                    args,
                }
            }
        };
        debug!(
            "prepare: key={} args={:?}",
            invocation.entry.key, invocation.args
        );
        Ok(invocation)
    }

    /// Run a prepared invocation with the global options' exports applied.
    pub fn invoke(
        &self,
        invocation: &Invocation<'_>,
        global: &OptionsSet,
        ctx: &BuiltinContext<'_>,
    ) -> ApplicationResult<ExecutionResult> {
        match &invocation.entry.target {
            Dispatchable::Builtin(builtin) => {
                let code = builtin.run(&invocation.args, ctx)?;
                Ok(ExecutionResult::with_code(code))
            }
            Dispatchable::Script(script) => {
                let env = invocation.environment(global);
                debug!("invoke: function={} env={:?}", script.function, env);
                self.backend
                    .invoke(
                        &script.context,
                        &script.function,
                        &invocation.args,
                        &env,
                        ctx.io,
                    )
                    .map_err(|e| ApplicationError::OperationFailed {
                        context: format!("run function {}", script.function),
                        source: Box::new(e),
                    })
            }
            Dispatchable::Group(_) => Err(ApplicationError::CommandNotFound(
                invocation.entry.key.clone(),
            )),
        }
    }
}
