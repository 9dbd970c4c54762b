//! centry: turn a manifest and a tree of shell scripts into a multi-command CLI
//!
//! Architecture:
//! - `domain`: options, namespaces and core entities (no I/O)
//! - `application`: script loading, function discovery, command table, dispatch
//! - `infrastructure`: bash backend, stream capture, logging, DI container
//! - `cli`: runtime, help output and the binary's argument collection

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
