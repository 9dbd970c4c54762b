//! Option sets for the global scope and for each command

use crate::config::Manifest;
use crate::domain::{CommandDef, DomainResult, OptionDef, OptionScope, OptionType, OptionsSet};

pub const LOG_LEVEL: &str = "config.log.level";
pub const QUIET: &str = "quiet";
pub const HELP: &str = "help";
pub const VERSION: &str = "version";

fn help_option() -> OptionDef {
    OptionDef::new(HELP)
        .option_type(OptionType::Bool)
        .short('h')
        .description("Displays help")
}

/// Built-in global options followed by the enabled manifest options, unparsed.
pub fn global_options(
    manifest: &Manifest,
    enabled: impl Fn(&OptionDef) -> bool,
) -> DomainResult<OptionsSet> {
    let mut set = OptionsSet::new(OptionScope::Global);
    set.add(
        OptionDef::new(LOG_LEVEL)
            .default_value(manifest.config.log.level.clone())
            .description("Overrides the log level"),
    )?;
    set.add(
        OptionDef::new(QUIET)
            .option_type(OptionType::Bool)
            .short('q')
            .description("Disables logging"),
    )?;
    set.add(help_option())?;
    set.add(
        OptionDef::new(VERSION)
            .option_type(OptionType::Bool)
            .short('v')
            .description("Displays the version of the cli"),
    )?;

    for option in manifest.options.iter().filter(|o| enabled(o)) {
        set.add(option.clone())?;
    }
    Ok(set)
}

/// `--help` plus the command's declared options, unparsed.
pub fn command_options(command: &CommandDef) -> DomainResult<OptionsSet> {
    let mut set = OptionsSet::new(OptionScope::Command(command.name.clone()));
    set.add(help_option())?;
    for option in &command.options {
        set.add(option.clone())?;
    }
    Ok(set)
}
