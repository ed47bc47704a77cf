//! Error types for the defmark pipeline.

use thiserror::Error;

use crate::definitions::SourceId;
use crate::text_location::TextLocation;

/// Main error type for defmark operations.
#[derive(Error, Debug)]
pub enum DefmarkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Properties parse error at {location}: {message}")]
    Properties { location: TextLocation, message: String },

    /// A definition source failed to load; the store kept its previous state.
    #[error("Definition source {id} rejected: {source}")]
    Source {
        id: SourceId,
        #[source]
        source: Box<DefmarkError>,
    },

    #[error("Matcher build error: {0}")]
    Matcher(#[from] aho_corasick::BuildError),

    #[error("Stage '{stage}' failed: {message}")]
    Pipeline { stage: String, message: String },

    #[error("Invalid UTF-8 in {0}")]
    Encoding(String),

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(String),
}

impl DefmarkError {
    /// Wraps an error as the failure of a single definition source.
    pub fn for_source(id: SourceId, error: DefmarkError) -> Self {
        match error {
            already @ DefmarkError::Source { .. } => already,
            other => DefmarkError::Source {
                id,
                source: Box::new(other),
            },
        }
    }

    /// Creates a pipeline stage error.
    pub fn stage(stage: &str, message: impl Into<String>) -> Self {
        DefmarkError::Pipeline {
            stage: stage.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for defmark operations.
pub type Result<T> = std::result::Result<T, DefmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_source_wraps_once() {
        let id = SourceId::new("vars.yaml");
        let inner = DefmarkError::Other("bad".to_string());
        let wrapped = DefmarkError::for_source(id.clone(), inner);
        let rewrapped = DefmarkError::for_source(SourceId::new("other"), wrapped);

        match rewrapped {
            DefmarkError::Source { id: got, .. } => assert_eq!(got, id),
            other => panic!("Expected Source, got {other:?}"),
        }
    }

    #[test]
    fn test_stage_display() {
        let err = DefmarkError::stage("markup", "expected text");
        assert_eq!(err.to_string(), "Stage 'markup' failed: expected text");
    }
}
