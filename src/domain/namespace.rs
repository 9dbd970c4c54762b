//! Mapping of function names to hierarchical command keys

use crate::domain::error::{DomainError, DomainResult};

/// Default token separating namespace segments in a function name.
pub const DEFAULT_SEPARATOR: &str = ":";

/// Decides which functions belong to a command and how they are keyed.
///
/// With separator `:`, function `get:sub` belongs to command `get` and is
/// registered under the key `get sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceResolver {
    separator: String,
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl NamespaceResolver {
    pub fn new(separator: impl Into<String>) -> DomainResult<Self> {
        let separator = separator.into();
        if separator.is_empty() || separator.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidSeparator);
        }
        Ok(Self { separator })
    }

    pub fn split_char(&self) -> &str {
        &self.separator
    }

    /// Prefix a function name must carry to belong to `command`.
    pub fn create_namespace(&self, command: &str) -> String {
        format!("{}{}", command, self.separator)
    }

    /// `function` is the command's root function or lives in its namespace.
    pub fn belongs_to(&self, function: &str, command: &str) -> bool {
        function == command || function.starts_with(&self.create_namespace(command))
    }

    /// Command key: every separator replaced by a single space.
    pub fn command_key(&self, function: &str) -> String {
        function.replace(&self.separator, " ")
    }

    /// Keep the functions belonging to `command`, paired with their keys.
    pub fn resolve<'a, I>(&self, command: &str, functions: I) -> Vec<(String, &'a str)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        functions
            .into_iter()
            .filter(|f| self.belongs_to(f, command))
            .map(|f| (self.command_key(f), f))
            .collect()
    }
}
