//! Sigil delimiters bracketing definition references.

use serde::{Deserialize, Serialize};

use crate::errors::{DefmarkError, Result};

/// Delimiter pair that brackets a definition key in document text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sigils {
    /// Text that opens a reference.
    #[serde(default = "default_began")]
    pub began: String,

    /// Text that closes a reference.
    #[serde(default = "default_ended")]
    pub ended: String,
}

fn default_began() -> String {
    "{{".to_string()
}

fn default_ended() -> String {
    "}}".to_string()
}

impl Default for Sigils {
    fn default() -> Self {
        Self {
            began: default_began(),
            ended: default_ended(),
        }
    }
}

impl Sigils {
    /// Creates a new delimiter pair.
    pub fn new(began: &str, ended: &str) -> Self {
        Self {
            began: began.to_string(),
            ended: ended.to_string(),
        }
    }

    /// Rejects delimiter pairs that cannot bracket a key.
    pub fn validate(&self) -> Result<()> {
        if self.began.is_empty() || self.ended.is_empty() {
            return Err(DefmarkError::Config(format!(
                "sigils must not be empty (began={:?}, ended={:?})",
                self.began, self.ended
            )));
        }
        if self.began.contains('\n') || self.ended.contains('\n') {
            return Err(DefmarkError::Config(
                "sigils must not contain line breaks".to_string(),
            ));
        }
        Ok(())
    }

    /// Combined length of both delimiters in bytes.
    pub fn len(&self) -> usize {
        self.began.len() + self.ended.len()
    }

    /// Returns true if both delimiters are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sigils() {
        let sigils = Sigils::default();
        assert_eq!(sigils.began, "{{");
        assert_eq!(sigils.ended, "}}");
        assert_eq!(sigils.len(), 4);
    }

    #[test]
    fn test_validate() {
        assert!(Sigils::default().validate().is_ok());
        assert!(Sigils::new("$", "$").validate().is_ok());
        assert!(Sigils::new("", "}}").validate().is_err());
        assert!(Sigils::new("{{", "").validate().is_err());
        assert!(Sigils::new("{\n", "}").validate().is_err());
    }

    #[test]
    fn test_partial_deserialize() {
        let sigils: Sigils = toml::from_str("began = \"$\"").unwrap();
        assert_eq!(sigils.began, "$");
        assert_eq!(sigils.ended, "}}");
    }
}
