//! Option declarations, argv parsing and environment export resolution
//!
//! An [`OptionsSet`] is built once per scope (one global set, one per command),
//! parsed once, and read-only afterwards.
//!
//! Options sharing an `env_name` form a collision group. The exported value of a
//! group is decided by the options explicitly supplied on the command line:
//! the last supplied member with a truthy value wins, and if every supplied
//! member is falsy the variable is cleared. Defaults only back-fill a group
//! that nobody supplied.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::entities::EnvOverlay;
use crate::domain::error::{DomainError, DomainResult};

/// Value kind of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionType {
    /// Takes a value: `--name=value` or `--name value`
    #[default]
    String,
    /// Bare flag means true, `--name=false` negates; exports `"true"`
    Bool,
    /// Like `Bool`, but exports the option's own name (e.g. `CONTEXT=staging`)
    Select,
}

impl FromStr for OptionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "string" => Ok(Self::String),
            "bool" | "boolean" => Ok(Self::Bool),
            "select" => Ok(Self::Select),
            other => Err(DomainError::InvalidOptionValue {
                name: "type".into(),
                value: other.into(),
            }),
        }
    }
}

/// Scope an options set belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionScope {
    Global,
    Command(String),
}

impl fmt::Display for OptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionScope::Global => write!(f, "global"),
            OptionScope::Command(name) => write!(f, "command {name}"),
        }
    }
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    String(String),
}

impl OptionValue {
    /// True for `Bool(true)` and non-empty strings.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// Parse a boolean flag value the way common flag libraries do.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A single option declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionDef {
    pub option_type: OptionType,
    /// Long name, unique within its scope
    pub name: String,
    pub short: Option<char>,
    /// Environment variable receiving the exported value
    pub env_name: Option<String>,
    pub default: Option<String>,
    pub description: String,
    /// Export value for bool/select options
    pub value: Option<String>,
}

impl OptionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = Some(env_name.into());
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Parse a short name given as a string (manifest form).
    pub fn parse_short(short: &str) -> DomainResult<Option<char>> {
        let mut chars = short.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(None),
            (Some(c), None) if c != '-' && c != '=' => Ok(Some(c)),
            _ => Err(DomainError::InvalidShortName(short.to_string())),
        }
    }

    /// Check the declaration is internally consistent.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.is_empty() || self.name.starts_with('-') || self.name.contains('=') {
            return Err(DomainError::InvalidOptionValue {
                name: "name".into(),
                value: self.name.clone(),
            });
        }
        if let Some(c) = self.short {
            Self::parse_short(&c.to_string())?;
        }
        if self.is_flag() {
            if let Some(default) = &self.default {
                if !default.is_empty() && parse_bool(default).is_none() {
                    return Err(DomainError::InvalidOptionValue {
                        name: self.name.clone(),
                        value: default.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Bool and select options take no separate value token.
    pub fn is_flag(&self) -> bool {
        matches!(self.option_type, OptionType::Bool | OptionType::Select)
    }

    /// Value used when the option was not supplied.
    pub fn resolved_default(&self) -> OptionValue {
        if self.is_flag() {
            let b = self
                .default
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(false);
            OptionValue::Bool(b)
        } else {
            OptionValue::String(self.default.clone().unwrap_or_default())
        }
    }

    /// Value written to `env_name` for a given resolved value, `None` if falsy.
    pub fn export(&self, value: &OptionValue) -> Option<String> {
        if !value.is_truthy() {
            return None;
        }
        match (self.option_type, value) {
            (OptionType::String, v) => Some(v.to_string()),
            (OptionType::Bool, _) => Some(self.value.clone().unwrap_or_else(|| "true".into())),
            (OptionType::Select, _) => Some(self.value.clone().unwrap_or_else(|| self.name.clone())),
        }
    }

    fn matches_short(&self, flag: &str) -> bool {
        let mut chars = flag.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.short == Some(c),
            _ => false,
        }
    }

    /// `--name, -s` as shown in help output.
    pub fn usage_label(&self) -> String {
        match self.short {
            Some(c) => format!("--{}, -{}", self.name, c),
            None => format!("--{}", self.name),
        }
    }
}

/// Strip one or two leading dashes; `None` for positional tokens.
fn flag_name(token: &str) -> Option<&str> {
    let rest = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

/// Ordered option declarations for one scope, plus their parsed state.
#[derive(Debug, Clone)]
pub struct OptionsSet {
    scope: OptionScope,
    options: Vec<OptionDef>,
    /// Explicitly supplied values
    values: BTreeMap<String, OptionValue>,
    /// Names of supplied options in argv order (last occurrence)
    supplied: Vec<String>,
    exports: EnvOverlay,
    parsed: bool,
}

impl OptionsSet {
    pub fn new(scope: OptionScope) -> Self {
        Self {
            scope,
            options: Vec::new(),
            values: BTreeMap::new(),
            supplied: Vec::new(),
            exports: EnvOverlay::new(),
            parsed: false,
        }
    }

    pub fn scope(&self) -> &OptionScope {
        &self.scope
    }

    /// Register a declaration.
    pub fn add(&mut self, option: OptionDef) -> DomainResult<()> {
        if self.parsed {
            return Err(DomainError::AlreadyParsed(self.scope.to_string()));
        }
        option.validate()?;

        let duplicate_name = self.options.iter().any(|o| o.name == option.name);
        let duplicate_short = option
            .short
            .is_some_and(|c| self.options.iter().any(|o| o.short == Some(c)));
        if duplicate_name || duplicate_short {
            let name = if duplicate_name {
                option.name
            } else {
                option.short.map(String::from).unwrap_or_default()
            };
            return Err(DomainError::DuplicateOption {
                scope: self.scope.to_string(),
                name,
            });
        }

        self.options.push(option);
        Ok(())
    }

    /// Declarations in registration order.
    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Look up by long name first, then by short name.
    fn find(&self, flag: &str) -> Option<&OptionDef> {
        self.option(flag)
            .or_else(|| self.options.iter().find(|o| o.matches_short(flag)))
    }

    /// Consume recognized options from the front of `args`.
    ///
    /// Returns the remaining arguments, starting at the first positional
    /// token. A lone `--` ends option parsing and is consumed.
    pub fn parse(&mut self, args: &[String]) -> DomainResult<Vec<String>> {
        if self.parsed {
            return Err(DomainError::AlreadyParsed(self.scope.to_string()));
        }

        let mut index = 0;
        while index < args.len() {
            let token = args[index].as_str();
            if token == "--" {
                index += 1;
                break;
            }
            let Some(flag) = flag_name(token) else {
                break;
            };
            let (flag, inline) = match flag.split_once('=') {
                Some((f, v)) => (f, Some(v)),
                None => (flag, None),
            };

            let option = self
                .find(flag)
                .ok_or_else(|| {
                    let shown = token.split_once('=').map_or(token, |(f, _)| f);
                    DomainError::UnknownOption(shown.to_string())
                })?
                .clone();

            let value = if option.is_flag() {
                match inline {
                    None => OptionValue::Bool(true),
                    Some(v) => OptionValue::Bool(parse_bool(v).ok_or_else(|| {
                        DomainError::InvalidOptionValue {
                            name: option.name.clone(),
                            value: v.to_string(),
                        }
                    })?),
                }
            } else {
                match inline {
                    Some(v) => OptionValue::String(v.to_string()),
                    None => {
                        index += 1;
                        let v = args
                            .get(index)
                            .ok_or_else(|| DomainError::MissingOptionValue(option.name.clone()))?;
                        OptionValue::String(v.clone())
                    }
                }
            };

            self.record(&option.name, value);
            index += 1;
        }

        self.exports = self.resolve_exports();
        self.parsed = true;
        Ok(args[index..].to_vec())
    }

    fn record(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
        self.supplied.retain(|n| n != name);
        self.supplied.push(name.to_string());
    }

    fn resolve_exports(&self) -> EnvOverlay {
        merged_exports(&[self])
    }

    /// Parsed value, falling back to the declared default.
    pub fn get(&self, name: &str) -> Option<OptionValue> {
        self.values
            .get(name)
            .cloned()
            .or_else(|| self.option(name).map(OptionDef::resolved_default))
    }

    pub fn get_bool(&self, name: &str) -> bool {
        match self.get(name) {
            Some(OptionValue::Bool(b)) => b,
            Some(OptionValue::String(s)) => parse_bool(&s).unwrap_or(false),
            None => false,
        }
    }

    pub fn get_string(&self, name: &str) -> String {
        self.get(name).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Whether the option appeared on the command line.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Supplied option names in argv order.
    pub fn supplied(&self) -> &[String] {
        &self.supplied
    }

    /// Environment changes resolved at parse time.
    pub fn exports(&self) -> &EnvOverlay {
        &self.exports
    }
}

/// Resolve collision groups across `sets`, given in argv order.
///
/// Options sharing an env name form one group whichever set declares them.
/// Options supplied in a later set count as supplied after those of an
/// earlier one, and defaults back-fill only when no member of the group was
/// supplied in any set.
pub fn merged_exports(sets: &[&OptionsSet]) -> EnvOverlay {
    let mut groups: BTreeMap<&str, Vec<(usize, &OptionDef)>> = BTreeMap::new();
    for (index, set) in sets.iter().enumerate() {
        for option in &set.options {
            if let Some(env) = option.env_name.as_deref() {
                groups.entry(env).or_default().push((index, option));
            }
        }
    }

    let mut exports = EnvOverlay::new();
    for (env, members) in groups {
        let mut explicit: Vec<(usize, &OptionDef)> = Vec::new();
        for (index, set) in sets.iter().enumerate() {
            for name in &set.supplied {
                if let Some(member) = members
                    .iter()
                    .find(|(i, o)| *i == index && &o.name == name)
                {
                    explicit.push(*member);
                }
            }
        }

        if explicit.is_empty() {
            let backfill = members
                .iter()
                .rev()
                .find_map(|(_, o)| o.export(&o.resolved_default()));
            if let Some(value) = backfill {
                exports.insert(env.to_string(), Some(value));
            }
            continue;
        }

        let winner = explicit.iter().rev().find_map(|(index, o)| {
            sets[*index]
                .values
                .get(&o.name)
                .and_then(|v| o.export(v))
        });
        exports.insert(env.to_string(), winner);
    }
    exports
}
