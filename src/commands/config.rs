//! Config command implementation.

use crate::errors::{DefmarkError, Result};
use crate::interface::Context;

/// Prints the effective configuration as TOML.
pub fn show_config(ctx: &Context) -> Result<()> {
    print!("{}", config_to_string(ctx)?);
    Ok(())
}

/// Serializes the effective configuration.
pub fn config_to_string(ctx: &Context) -> Result<String> {
    toml::to_string_pretty(&ctx.config)
        .map_err(|e| DefmarkError::Config(format!("Failed to serialize config: {}", e)))
}
