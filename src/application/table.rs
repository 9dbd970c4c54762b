//! Command table: immutable registry from command keys to dispatch targets

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::services::{FunctionCatalog, ScriptLoader};
use crate::application::{ApplicationResult, BuiltinCommand};
use crate::domain::{CommandDef, DomainError, DomainResult, NamespaceResolver, ScriptContext};

/// A script function bound to the command that declares it.
#[derive(Debug, Clone)]
pub struct ScriptCommand {
    pub command: Arc<CommandDef>,
    /// Function name as declared in the script
    pub function: String,
    /// Chain evaluated before calling the function
    pub context: ScriptContext,
}

/// What a table entry runs.
#[derive(Clone)]
pub enum Dispatchable {
    Builtin(Arc<dyn BuiltinCommand>),
    Script(ScriptCommand),
    /// Command declaring only namespaced functions; shows its subcommands
    Group(Arc<CommandDef>),
}

impl fmt::Debug for Dispatchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatchable::Builtin(b) => f.debug_tuple("Builtin").field(&b.name()).finish(),
            Dispatchable::Script(s) => f.debug_tuple("Script").field(s).finish(),
            Dispatchable::Group(c) => f.debug_tuple("Group").field(&c.name).finish(),
        }
    }
}

impl Dispatchable {
    pub fn description(&self) -> &str {
        match self {
            Dispatchable::Builtin(b) => b.description(),
            Dispatchable::Script(s) => &s.command.description,
            Dispatchable::Group(c) => &c.description,
        }
    }

    /// Hidden entries are dispatchable but not listed in help.
    pub fn is_hidden(&self) -> bool {
        match self {
            Dispatchable::Builtin(_) => false,
            Dispatchable::Script(s) => s.command.hidden,
            Dispatchable::Group(c) => c.hidden,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandTableEntry {
    /// Space-separated command path, e.g. `get sub`
    pub key: String,
    pub target: Dispatchable,
}

/// Registry of every dispatchable command, keyed by command path.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: BTreeMap<String, CommandTableEntry>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a key can only be registered once.
    pub fn register(&mut self, key: impl Into<String>, target: Dispatchable) -> DomainResult<()> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(DomainError::DuplicateCommand(key));
        }
        self.entries.insert(
            key.clone(),
            CommandTableEntry { key, target },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&CommandTableEntry> {
        self.entries.get(key)
    }

    /// Entry whose key segments match the longest prefix of `args`.
    ///
    /// Each token must equal one segment. Returns the entry and the number of
    /// tokens the key used.
    pub fn lookup(&self, args: &[String]) -> Option<(&CommandTableEntry, usize)> {
        self.entries
            .values()
            .filter_map(|e| {
                let segments: Vec<&str> = e.key.split(' ').collect();
                let matches = segments.len() <= args.len()
                    && segments.iter().zip(args).all(|(s, a)| *s == a.as_str());
                matches.then_some((e, segments.len()))
            })
            .max_by_key(|(_, used)| *used)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandTableEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct children of `key` (one more path segment).
    ///
    /// With an empty `key` these are the top-level commands.
    pub fn children<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a CommandTableEntry> + 'a {
        self.entries.values().filter(move |e| {
            let rest = if key.is_empty() {
                Some(e.key.as_str())
            } else {
                e.key
                    .strip_prefix(key)
                    .and_then(|r| r.strip_prefix(' '))
            };
            rest.is_some_and(|r| !r.is_empty() && !r.contains(' '))
        })
    }
}

/// Builds the command table from built-ins and manifest commands.
pub struct TableBuilder {
    loader: ScriptLoader,
    catalog: FunctionCatalog,
    resolver: NamespaceResolver,
}

impl TableBuilder {
    pub fn new(loader: ScriptLoader, catalog: FunctionCatalog, resolver: NamespaceResolver) -> Self {
        Self {
            loader,
            catalog,
            resolver,
        }
    }

    /// Register `builtins`, then one entry per function each enabled command declares.
    ///
    /// Any script load or introspection failure aborts the build.
    pub fn build(
        &self,
        commands: &[CommandDef],
        builtins: &[Arc<dyn BuiltinCommand>],
        enabled: impl Fn(&CommandDef) -> bool,
    ) -> ApplicationResult<CommandTable> {
        let mut table = CommandTable::new();

        for builtin in builtins {
            table.register(builtin.name(), Dispatchable::Builtin(builtin.clone()))?;
            debug!("Registered builtin: key={}", builtin.name());
        }

        for command in commands.iter().filter(|c| enabled(c)) {
            let context = self.loader.load(command)?;
            let functions = self.catalog.functions(&context)?;
            let command = Arc::new(command.clone());

            let resolved = self
                .resolver
                .resolve(&command.name, functions.iter().map(|f| f.name.as_str()));
            let resolved_is_empty = resolved.is_empty();
            if resolved_is_empty {
                warn!(
                    "command {} declares no function named {} or {}*",
                    command.name,
                    command.name,
                    self.resolver.create_namespace(&command.name)
                );
            }

            let root = self.resolver.command_key(&command.name);
            let has_root = resolved.iter().any(|(key, _)| *key == root);
            for (key, function) in resolved {
                debug!("Registered command: key={} function={}", key, function);
                table.register(
                    key,
                    Dispatchable::Script(ScriptCommand {
                        command: command.clone(),
                        function: function.to_string(),
                        context: context.clone(),
                    }),
                )?;
            }
            if !has_root && !resolved_is_empty {
                debug!("Registered group: key={}", root);
                table.register(root, Dispatchable::Group(command.clone()))?;
            }
        }

        Ok(table)
    }
}
