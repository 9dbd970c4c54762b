//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod builtin;
pub mod dispatch;
pub mod error;
pub mod error_ext;
pub mod options;
pub mod services;
pub mod table;

pub use builtin::{BuiltinCommand, BuiltinContext};
pub use dispatch::{Dispatcher, Invocation};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use table::{CommandTable, CommandTableEntry, Dispatchable, ScriptCommand, TableBuilder};
