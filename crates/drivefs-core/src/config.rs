//! Session configuration.
//!
//! Everything the stream surface needs besides the client itself: the URL
//! scheme, the apps domain, the MIME registry seed and the seek policy.
//! Configuration is plain data, loadable from TOML:
//!
//! ```toml
//! scheme = "gdrive"
//! domain = "example.com"
//! default_mime_type = "text/plain"
//! seek_policy = "relative"
//!
//! [mime_types]
//! "/reports/q1.csv" = "text/csv"
//! ```

use crate::file::SeekPolicy;
use crate::mime::{DEFAULT_MIME_TYPE, MimeRegistry};
use crate::path::is_scheme_token;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default URL scheme.
pub const DEFAULT_SCHEME: &str = "gdrive";

/// Errors loading a [`DriveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration shared by every handle of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// URL scheme accepted in paths (`scheme://a/b`).
    pub scheme: String,
    /// Google Apps domain the drive belongs to, if any.
    pub domain: Option<String>,
    /// Content type for new files without a registration.
    pub default_mime_type: String,
    /// Arithmetic used by `seek` with `SeekWhence::Current`.
    pub seek_policy: SeekPolicy,
    /// Path → content type registrations.
    pub mime_types: IndexMap<String, String>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            domain: None,
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
            seek_policy: SeekPolicy::default(),
            mime_types: IndexMap::new(),
        }
    }
}

impl DriveConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_seek_policy(mut self, policy: SeekPolicy) -> Self {
        self.seek_policy = policy;
        self
    }

    pub fn with_mime_type(mut self, path: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.mime_types.insert(path.into(), mime_type.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_scheme_token(&self.scheme) {
            return Err(ConfigError::Invalid(format!(
                "'{}' is not a valid URL scheme",
                self.scheme
            )));
        }
        if self.default_mime_type.is_empty() {
            return Err(ConfigError::Invalid(
                "default_mime_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Registry seeded with this configuration's registrations.
    pub fn mime_registry(&self) -> MimeRegistry {
        let mut registry = MimeRegistry::new(self.default_mime_type.clone());
        for (path, mime) in &self.mime_types {
            registry.register(path, mime.clone());
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::DrivePath;

    #[test]
    fn test_defaults() {
        let config = DriveConfig::default();
        assert_eq!(config.scheme, "gdrive");
        assert_eq!(config.default_mime_type, "text/plain");
        assert_eq!(config.seek_policy, SeekPolicy::Relative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = DriveConfig::from_toml_str(
            r#"
            scheme = "drive"
            domain = "example.com"
            seek_policy = "add-whence-constant"

            [mime_types]
            "/reports/q1.csv" = "text/csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.scheme, "drive");
        assert_eq!(config.domain.as_deref(), Some("example.com"));
        assert_eq!(config.seek_policy, SeekPolicy::AddWhenceConstant);
        assert_eq!(config.default_mime_type, "text/plain");

        let registry = config.mime_registry();
        let path = DrivePath::parse("drive://reports/q1.csv", "drive").unwrap();
        assert_eq!(registry.lookup(&path), "text/csv");
    }

    #[test]
    fn test_invalid_scheme() {
        let err = DriveConfig::from_toml_str(r#"scheme = "9p""#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_seek_policy() {
        let err = DriveConfig::from_toml_str(r#"seek_policy = "sideways""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DriveConfig::load(Path::new("/nonexistent/drivefs.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
