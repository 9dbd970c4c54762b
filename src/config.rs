//! Manifest loading with layered sources
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Manifest file (YAML, TOML or JSON, chosen by extension)
//! 3. Environment variables: `CENTRY_*` prefix, `__` for nesting
//!    (e.g. `CENTRY_CONFIG__LOG__LEVEL=error`)
//!
//! The raw file shape is deserialized first, then validated into domain
//! types with every path resolved against the base path.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::namespace::DEFAULT_SEPARATOR;
use crate::domain::{CommandDef, DomainError, OptionDef, OptionType};
use crate::infrastructure::bash::DEFAULT_SHELL;
use crate::util::path::{parent_dir, resolve_path};

/// Prefix of environment variables overriding manifest values.
pub const ENV_PREFIX: &str = "CENTRY";

/// Log level used when the manifest sets none.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Raw option entry as written in the manifest.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOption {
    #[serde(rename = "type")]
    pub option_type: Option<String>,
    pub name: String,
    pub short: Option<String>,
    pub env_name: Option<String>,
    pub default: Option<String>,
    pub description: String,
    pub value: Option<String>,
}

/// Raw command entry as written in the manifest.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCommand {
    pub name: String,
    pub path: String,
    pub description: String,
    pub hidden: bool,
    pub options: Vec<RawOption>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLogConfig {
    pub level: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawConfig {
    pub name: Option<String>,
    pub version: Option<String>,
    pub base_path: Option<String>,
    pub namespace_separator: Option<String>,
    pub shell: Option<String>,
    pub log: RawLogConfig,
}

/// Raw manifest for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawManifest {
    pub scripts: Vec<String>,
    pub commands: Vec<RawCommand>,
    pub options: Vec<RawOption>,
    pub config: RawConfig,
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Prepended to every log line
    pub prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.into(),
            prefix: String::new(),
        }
    }
}

/// Base configuration of the generated CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestConfig {
    pub name: String,
    pub version: String,
    pub log: LogConfig,
    /// Namespace split token inside function names
    pub namespace_separator: String,
    /// Interpreter running the scripts
    pub shell: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            name: "centry".into(),
            version: String::new(),
            log: LogConfig::default(),
            namespace_separator: DEFAULT_SEPARATOR.into(),
            shell: DEFAULT_SHELL.into(),
        }
    }
}

/// Validated manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    /// Manifest file this was loaded from
    pub path: PathBuf,
    /// Directory every relative path resolves against
    pub base_path: PathBuf,
    pub config: ManifestConfig,
    /// Shared files sourced before every command script, in order
    pub scripts: Vec<PathBuf>,
    pub commands: Vec<CommandDef>,
    /// Global-scope options
    pub options: Vec<OptionDef>,
}

fn load_err(path: &Path, message: impl Into<String>) -> ApplicationError {
    ApplicationError::ManifestLoad {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

impl Manifest {
    /// Load and validate the manifest at `path`.
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        if path.as_os_str().is_empty() {
            return Err(load_err(path, "no manifest file given"));
        }
        if !path.is_file() {
            return Err(load_err(path, "the path is invalid or does not exist"));
        }

        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| load_err(path, e.to_string()))?;
        let raw: RawManifest = config
            .try_deserialize()
            .map_err(|e| load_err(path, e.to_string()))?;

        Self::from_raw(raw, path)
    }

    /// Validate a raw manifest read from `path`.
    pub fn from_raw(raw: RawManifest, path: &Path) -> ApplicationResult<Self> {
        let manifest_dir = parent_dir(path);
        let manifest_dir = std::fs::canonicalize(&manifest_dir)
            .with_path_context("resolve manifest directory", &manifest_dir)?;
        let base_path = match raw.config.base_path.as_deref() {
            Some(b) if !b.is_empty() => resolve_path(&manifest_dir, b),
            _ => manifest_dir,
        };

        let defaults = ManifestConfig::default();
        let config = ManifestConfig {
            name: raw.config.name.filter(|n| !n.is_empty()).unwrap_or(defaults.name),
            version: raw.config.version.unwrap_or(defaults.version),
            log: LogConfig {
                level: raw
                    .config
                    .log
                    .level
                    .filter(|l| !l.is_empty())
                    .unwrap_or(defaults.log.level),
                prefix: raw.config.log.prefix.unwrap_or_default(),
            },
            namespace_separator: raw
                .config
                .namespace_separator
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.namespace_separator),
            shell: raw
                .config
                .shell
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.shell),
        };

        let scripts = raw
            .scripts
            .iter()
            .map(|s| resolve_path(&base_path, s))
            .collect();

        let commands = raw
            .commands
            .into_iter()
            .map(|c| convert_command(c, &base_path, path))
            .collect::<ApplicationResult<Vec<_>>>()?;

        let options = raw
            .options
            .into_iter()
            .map(|o| convert_option(o, path))
            .collect::<ApplicationResult<Vec<_>>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            base_path,
            config,
            scripts,
            commands,
            options,
        })
    }
}

fn convert_command(raw: RawCommand, base_path: &Path, manifest: &Path) -> ApplicationResult<CommandDef> {
    if raw.name.is_empty() {
        return Err(load_err(manifest, "command without a name"));
    }
    if raw.path.is_empty() {
        return Err(load_err(manifest, format!("command {} has no path", raw.name)));
    }
    let options = raw
        .options
        .into_iter()
        .map(|o| convert_option(o, manifest))
        .collect::<ApplicationResult<Vec<_>>>()?;
    Ok(CommandDef {
        path: resolve_path(base_path, &raw.path),
        name: raw.name,
        description: raw.description,
        hidden: raw.hidden,
        options,
    })
}

fn convert_option(raw: RawOption, manifest: &Path) -> ApplicationResult<OptionDef> {
    let invalid = |e: DomainError| load_err(manifest, format!("option {:?}: {}", raw.name, e));

    let option_type: OptionType = raw
        .option_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(invalid)?;
    let short = OptionDef::parse_short(raw.short.as_deref().unwrap_or_default()).map_err(invalid)?;

    let option = OptionDef {
        option_type,
        name: raw.name.clone(),
        short,
        env_name: raw.env_name.clone().filter(|e| !e.is_empty()),
        default: raw.default.clone(),
        description: raw.description.clone(),
        value: raw.value.clone(),
    };
    option.validate().map_err(invalid)?;
    Ok(option)
}
