//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{FunctionCatalog, ScriptLoader};
use crate::application::{ApplicationResult, Dispatcher, TableBuilder};
use crate::config::Manifest;
use crate::domain::NamespaceResolver;
use crate::infrastructure::bash::BashBackend;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, ScriptBackend};

/// Container holding all application services.
///
/// Services are cheap views over the shared dependencies and are created on demand.
pub struct ServiceContainer {
    /// Loaded manifest
    pub manifest: Arc<Manifest>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interpreter for the command scripts
    pub backend: Arc<dyn ScriptBackend>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(manifest: Manifest) -> Self {
        let backend = BashBackend::new(
            manifest.config.shell.clone(),
            manifest.config.namespace_separator.clone(),
        );
        Self::with_deps(manifest, Arc::new(RealFileSystem), Arc::new(backend))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        manifest: Manifest,
        fs: Arc<dyn FileSystem>,
        backend: Arc<dyn ScriptBackend>,
    ) -> Self {
        Self {
            manifest: Arc::new(manifest),
            fs,
            backend,
        }
    }

    pub fn script_loader(&self) -> ScriptLoader {
        ScriptLoader::new(self.fs.clone(), self.manifest.scripts.clone())
    }

    pub fn function_catalog(&self) -> FunctionCatalog {
        FunctionCatalog::new(self.backend.clone())
    }

    /// Namespace rules of the active backend.
    pub fn resolver(&self) -> ApplicationResult<NamespaceResolver> {
        Ok(NamespaceResolver::new(self.backend.split_char())?)
    }

    pub fn table_builder(&self) -> ApplicationResult<TableBuilder> {
        Ok(TableBuilder::new(
            self.script_loader(),
            self.function_catalog(),
            self.resolver()?,
        ))
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.backend.clone())
    }
}
