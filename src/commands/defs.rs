//! Defs command implementation.

use std::path::PathBuf;

use crate::definitions::Snapshot;
use crate::errors::{DefmarkError, Result};
use crate::interface::Context;

use super::helpers::prepare_session;

/// Options for the defs command.
#[derive(Debug, Clone, Default)]
pub struct DefsOptions {
    /// Print a JSON object instead of `key = value` lines.
    pub json: bool,
    /// Definition files beyond the configured ones.
    pub definitions: Vec<PathBuf>,
}

/// Executes the defs command: prints the flattened mapping.
pub fn defs(ctx: &Context, options: DefsOptions) -> Result<()> {
    let session = prepare_session(ctx, &options.definitions)?;
    print!("{}", format_definitions(&session.snapshot(), options.json)?);
    Ok(())
}

/// Formats the mapping in mapping order.
pub fn format_definitions(snapshot: &Snapshot, json: bool) -> Result<String> {
    if json {
        let object: serde_json::Map<String, serde_json::Value> = snapshot
            .mapping()
            .iter()
            .map(|(key, def)| (key.clone(), serde_json::Value::String(def.value.clone())))
            .collect();
        let mut text = serde_json::to_string_pretty(&object)
            .map_err(|e| DefmarkError::Other(format!("Failed to serialize definitions: {}", e)))?;
        text.push('\n');
        return Ok(text);
    }

    let mut text = String::new();
    for (key, def) in snapshot.mapping() {
        text.push_str(&format!("{} = {}\n", key, def.value));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{SourceFormat, SourceId};
    use crate::session::Session;
    use crate::config::Config;
    use pretty_assertions::assert_eq;

    fn snapshot() -> std::sync::Arc<Snapshot> {
        let session = Session::new(Config::default()).unwrap();
        session
            .load_source(
                SourceId::new("vars.yaml"),
                SourceFormat::Yaml,
                "app:\n  name: Quill\n  version: 2\n",
            )
            .unwrap();
        session.snapshot()
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(
            format_definitions(&snapshot(), false).unwrap(),
            "app.name = Quill\napp.version = 2\n"
        );
    }

    #[test]
    fn test_format_json() {
        let text = format_definitions(&snapshot(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["app.name"], "Quill");
        assert_eq!(value["app.version"], "2");
    }
}
