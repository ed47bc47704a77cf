//! Configuration update and merging.

use serde::{Deserialize, Serialize};

use super::config_data::{Config, CorrelatorConfig, MarkupConfig, WatchConfig};
use super::sigils::Sigils;
use super::stage_kind::StageKind;

/// Partial configuration update that can be merged into a Config.
///
/// All fields are optional. Only specified fields will override the base config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// Definition file patterns.
    #[serde(default)]
    pub definitions: Option<Vec<String>>,

    /// Separator for nested definition keys.
    #[serde(default)]
    pub key_separator: Option<String>,

    /// Processor stage order.
    #[serde(default)]
    pub stages: Option<Vec<StageKind>>,

    /// Reference delimiters.
    #[serde(default)]
    pub sigils: Option<Sigils>,

    /// Markdown conversion settings.
    #[serde(default)]
    pub markup: Option<MarkupConfig>,

    /// Scroll correlation settings.
    #[serde(default)]
    pub correlator: Option<CorrelatorConfig>,

    /// Watch configuration.
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

impl ConfigUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges this update into a base configuration, returning a new Config.
    ///
    /// Consumes `self` so fields can be moved instead of cloned.
    pub fn merge_into(self, base: &Config) -> Config {
        Config {
            definitions: merge_definitions(&base.definitions, self.definitions),
            key_separator: self
                .key_separator
                .unwrap_or_else(|| base.key_separator.clone()),
            stages: self.stages.unwrap_or_else(|| base.stages.clone()),
            sigils: self.sigils.unwrap_or_else(|| base.sigils.clone()),
            markup: self.markup.unwrap_or_else(|| base.markup.clone()),
            correlator: self.correlator.unwrap_or(base.correlator),
            watch: self.watch.unwrap_or_else(|| base.watch.clone()),
            extra: base.extra.clone(),
        }
    }
}

impl From<ConfigUpdate> for Config {
    fn from(update: ConfigUpdate) -> Self {
        update.merge_into(&Config::default())
    }
}

/// Appends update patterns after the base ones, skipping duplicates.
///
/// Appending keeps the update's definition files at higher precedence.
fn merge_definitions(base: &[String], update: Option<Vec<String>>) -> Vec<String> {
    let mut result = base.to_vec();
    for pattern in update.unwrap_or_default() {
        if !result.contains(&pattern) {
            result.push(pattern);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update() {
        let base = Config::default();
        let merged = ConfigUpdate::new().merge_into(&base);
        assert_eq!(merged, base);
    }

    #[test]
    fn test_partial_update() {
        let base = Config::default();
        let update = ConfigUpdate {
            sigils: Some(Sigils::new("$", "$")),
            ..Default::default()
        };
        let merged = update.merge_into(&base);

        assert_eq!(merged.sigils, Sigils::new("$", "$"));
        assert_eq!(merged.key_separator, base.key_separator);
    }

    #[test]
    fn test_merge_definitions() {
        let base = vec!["base.yaml".to_string(), "shared.toml".to_string()];
        let update = Some(vec!["shared.toml".to_string(), "local.json".to_string()]);

        let merged = merge_definitions(&base, update);
        assert_eq!(merged, vec!["base.yaml", "shared.toml", "local.json"]);
    }

    #[test]
    fn test_from_update() {
        let update = ConfigUpdate {
            key_separator: Some("/".to_string()),
            stages: Some(vec![StageKind::Definitions]),
            ..Default::default()
        };
        let config: Config = update.into();

        assert_eq!(config.key_separator, "/");
        assert_eq!(config.stages, vec![StageKind::Definitions]);
    }
}
