//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, ScriptBackend)
//! but are themselves concrete structs, not traits.

mod catalog;
mod loader;

pub use catalog::FunctionCatalog;
pub use loader::ScriptLoader;
