//! Configuration loading and management.

mod config_data;
mod config_update;
mod sigils;
mod stage_kind;

use std::fs;
use std::path::{Path, PathBuf};

pub use config_data::{Config, CorrelatorConfig, MarkupConfig, WatchConfig};
pub use config_update::ConfigUpdate;
pub use sigils::Sigils;
pub use stage_kind::StageKind;

use crate::errors::Result;

/// Standard configuration file names to search for.
const CONFIG_FILES: &[&str] = &["defmark.toml", ".defmark.toml"];

/// Finds the configuration file in the given directory or its parents.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        for name in CONFIG_FILES {
            let candidate = current.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Reads configuration from a TOML file.
pub fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let update: ConfigUpdate = toml::from_str(&content)?;
    let config = update.merge_into(&Config::default());
    config.validate()?;
    Ok(config)
}

/// Reads configuration, searching from the given directory.
///
/// If no config file is found, returns the default configuration.
pub fn read_config(start_dir: &Path) -> Result<Config> {
    match find_config_file(start_dir) {
        Some(path) => {
            tracing::debug!("Using configuration {}", path.display());
            read_config_file(&path)
        }
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("defmark.toml");
        fs::write(&config_path, "key_separator = \".\"").unwrap();

        let found = find_config_file(dir.path()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_file_parent() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".defmark.toml");
        fs::write(&config_path, "").unwrap();

        let subdir = dir.path().join("chapters");
        fs::create_dir(&subdir).unwrap();

        let found = find_config_file(&subdir).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_file_not_found() {
        let dir = tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_read_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("defmark.toml");

        fs::write(
            &config_path,
            r#"
definitions = ["vars/*.yaml", "local.toml"]
key_separator = "_"
stages = ["definitions", "markup", "anchors"]

[sigils]
began = "${{"
ended = "}}"

[correlator]
indent_width = 2
"#,
        )
        .unwrap();

        let config = read_config_file(&config_path).unwrap();
        assert_eq!(config.definitions, vec!["vars/*.yaml", "local.toml"]);
        assert_eq!(config.key_separator, "_");
        assert_eq!(config.sigils, Sigils::new("${{", "}}"));
        assert_eq!(config.correlator.indent_width, 2);
        assert_eq!(config.correlator.forward_window, 5);
    }

    #[test]
    fn test_read_config_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("defmark.toml");
        fs::write(&config_path, "[sigils]\nbegan = \"\"\n").unwrap();

        assert!(read_config_file(&config_path).is_err());
    }

    #[test]
    fn test_read_config_default() {
        let dir = tempdir().unwrap();
        let config = read_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }
}
