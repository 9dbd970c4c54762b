//! Function discovery for loaded script contexts

use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{FunctionEntry, ScriptContext};
use crate::infrastructure::traits::ScriptBackend;

/// Service listing the functions each command's script chain declares.
pub struct FunctionCatalog {
    backend: Arc<dyn ScriptBackend>,
}

impl FunctionCatalog {
    pub fn new(backend: Arc<dyn ScriptBackend>) -> Self {
        Self { backend }
    }

    /// Functions declared after evaluating `context`, in declaration order.
    ///
    /// Includes functions from shared scripts; filtering by namespace is the
    /// caller's job.
    pub fn functions(&self, context: &ScriptContext) -> ApplicationResult<Vec<FunctionEntry>> {
        let names = self
            .backend
            .enumerate(context)
            .map_err(|e| ApplicationError::Introspection {
                command: context.command.clone(),
                source: Box::new(e),
            })?;

        let entries: Vec<FunctionEntry> = names
            .into_iter()
            .unique()
            .map(|name| FunctionEntry {
                name,
                command: context.command.clone(),
            })
            .collect();
        debug!(
            "functions: command={} count={}",
            context.command,
            entries.len()
        );
        Ok(entries)
    }
}
