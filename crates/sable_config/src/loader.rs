//! Option file loading and validation.

use crate::error::ConfigError;
use crate::types::GeneratorOptions;
use sable_ir::sanitize_identifier;
use std::path::Path;

/// File name looked up by [`load_options`].
pub const CONFIG_FILE_NAME: &str = "sable.toml";

/// Loads and validates `sable.toml` from a directory.
pub fn load_options(dir: &Path) -> Result<GeneratorOptions, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_options_from_str(&content)
}

/// Parses and validates options from TOML text.
pub fn load_options_from_str(content: &str) -> Result<GeneratorOptions, ConfigError> {
    let options: GeneratorOptions =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_options(&options)?;
    Ok(options)
}

/// Checks names are usable as Verilog identifiers and do not clash.
pub fn validate_options(options: &GeneratorOptions) -> Result<(), ConfigError> {
    if let Some(name) = &options.module.name {
        check_identifier("module.name", name)?;
    }
    if let Some(clock) = &options.clock {
        check_identifier("clock.name", &clock.name)?;
    }
    if let Some(reset) = &options.reset {
        check_identifier("reset.name", &reset.name)?;
        if options.clock.as_ref().is_some_and(|c| c.name == reset.name) {
            return Err(ConfigError::ValidationError(format!(
                "clock and reset both named '{}'",
                reset.name
            )));
        }
    }
    Ok(())
}

fn check_identifier(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    if sanitize_identifier(name) != name {
        return Err(ConfigError::ValidationError(format!(
            "{field} '{name}' is not a valid identifier"
        )));
    }
    Ok(())
}
