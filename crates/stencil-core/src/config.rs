//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::types::Threshold;

/// Errors produced while loading a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON could not be parsed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds a value the client cannot work with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for talking to the stencil server.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the stencil endpoint. Relative URLs resolve against the
    /// page that serves the app.
    pub endpoint: String,

    /// Milliseconds to wait for the server before giving up.
    pub timeout_ms: u32,

    /// Suggested file name for downloaded stencils.
    pub download_filename: String,

    /// Threshold the slider starts at.
    pub default_threshold: u8,
}

impl ClientConfig {
    /// Default endpoint path, served next to the app.
    pub const DEFAULT_ENDPOINT: &str = "/generate-stencil";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT_MS: u32 = 60_000;
    /// Default download file name.
    pub const DEFAULT_DOWNLOAD_FILENAME: &str = "stencil-tatuaje.png";

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }
        if self.download_filename.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "download_filename must not be empty".into(),
            ));
        }
        if !is_bare_file_name(&self.download_filename) {
            return Err(ConfigError::Invalid(format!(
                "download_filename must be a plain file name, got {:?}",
                self.download_filename
            )));
        }
        if Threshold::new(self.default_threshold).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default_threshold must be at most {}, got {}",
                Threshold::MAX,
                self.default_threshold
            )));
        }
        Ok(())
    }

    /// The starting threshold, clamped into range.
    #[must_use]
    pub fn initial_threshold(&self) -> Threshold {
        Threshold::from_slider(f64::from(self.default_threshold))
    }
}

/// `true` for a name with no directory part: not `.`, `..`, or anything
/// containing a path separator.
fn is_bare_file_name(name: &str) -> bool {
    !name.contains(['/', '\\'])
        && std::path::Path::new(name).file_name() == Some(std::ffi::OsStr::new(name))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.into(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            download_filename: Self::DEFAULT_DOWNLOAD_FILENAME.into(),
            default_threshold: Threshold::DEFAULT.get(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.endpoint, "/generate-stencil");
        assert_eq!(config.download_filename, "stencil-tatuaje.png");
        assert_eq!(config.initial_threshold(), Threshold::DEFAULT);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            ClientConfig::from_json(r#"{"endpoint": "http://localhost:5000/generate-stencil"}"#)
                .unwrap();
        assert_eq!(config.endpoint, "http://localhost:5000/generate-stencil");
        assert_eq!(config.timeout_ms, ClientConfig::DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = ClientConfig::from_json(r#"{"default_threshold": 200}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn rejects_blank_endpoint_and_zero_timeout() {
        assert!(ClientConfig::from_json(r#"{"endpoint": "  "}"#).is_err());
        assert!(ClientConfig::from_json(r#"{"timeout_ms": 0}"#).is_err());
        assert!(ClientConfig::from_json(r#"{"download_filename": ""}"#).is_err());
    }

    #[test]
    fn download_filename_must_not_leave_the_directory() {
        for name in ["/", "..", ".", "../stencil.png", "out/stencil.png", "a\\b.png"] {
            let config = ClientConfig {
                download_filename: name.into(),
                ..ClientConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "{name:?} accepted"
            );
        }
        let config = ClientConfig {
            download_filename: "mi stencil.png".into(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = ClientConfig::from_json("{endpoint").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let config = ClientConfig {
            timeout_ms: 5_000,
            default_threshold: 80,
            ..ClientConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ClientConfig::from_json(&json).unwrap(), config);
    }
}
