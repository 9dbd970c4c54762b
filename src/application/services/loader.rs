//! Script context assembly
//!
//! Builds the ordered chain of files evaluated for a command: the manifest's
//! shared scripts first, the command's own script last.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{CommandDef, ScriptContext};
use crate::infrastructure::traits::FileSystem;

/// Service assembling per-command script contexts.
pub struct ScriptLoader {
    fs: Arc<dyn FileSystem>,
    shared: Vec<PathBuf>,
}

impl ScriptLoader {
    /// Create a loader sourcing `shared` before every command script.
    pub fn new(fs: Arc<dyn FileSystem>, shared: Vec<PathBuf>) -> Self {
        Self { fs, shared }
    }

    /// Full chain for `command`, after checking every file is readable.
    pub fn load(&self, command: &CommandDef) -> ApplicationResult<ScriptContext> {
        let files: Vec<PathBuf> = self
            .shared
            .iter()
            .chain(std::iter::once(&command.path))
            .cloned()
            .collect();

        for file in &files {
            self.check_readable(file)?;
        }
        debug!("load: command={} files={:?}", command.name, files);

        Ok(ScriptContext {
            command: command.name.clone(),
            files,
        })
    }

    fn check_readable(&self, path: &Path) -> ApplicationResult<()> {
        if !self.fs.is_file(path) {
            return Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "no such file"))
                .or_script_load(path);
        }
        self.fs.read_to_string(path).or_script_load(path)?;
        Ok(())
    }
}
