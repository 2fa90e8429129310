use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Configuration for an [`Editor`](crate::Editor).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Check structural inserts and replaces against the schema's content
    /// oracle.
    pub validate_content: bool,
    /// Maximum number of step records kept in the history; the oldest are
    /// dropped first. `None` keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
    /// Type name of the empty document an editor starts with.
    pub document_type: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            validate_content: true,
            max_history: None,
            document_type: "doc".into(),
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        toml::from_str(source).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = EditorConfig::default();
        assert!(c.validate_content);
        assert!(c.max_history.is_none());
        assert_eq!(c.document_type, "doc");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = EditorConfig::from_toml_str("max_history = 50\n").unwrap();
        assert_eq!(c.max_history, Some(50));
        assert!(c.validate_content);
        assert_eq!(c.document_type, "doc");
    }

    #[test]
    fn full_toml() {
        let c = EditorConfig::from_toml_str(
            "validate_content = false\nmax_history = 3\ndocument_type = \"page\"\n",
        )
        .unwrap();
        assert!(!c.validate_content);
        assert_eq!(c.max_history, Some(3));
        assert_eq!(c.document_type, "page");
    }

    #[test]
    fn toml_roundtrip() {
        let c = EditorConfig {
            max_history: Some(10),
            ..Default::default()
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(EditorConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = EditorConfig::from_toml_str("max_history = \"lots\"").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }
}
