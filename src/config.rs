//! TOML-backed configuration for the security core.
//!
//! Carries the PEM key-file locations and the generator node ID. Key
//! material is parsed once here and owned by the configuration's lifetime;
//! the token layer only borrows it.
//!
//! ```toml
//! private_key_path = "/etc/authcore/signing.pem"
//! public_key_path = "/etc/authcore/verifying.pem"
//! node_id = 12
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SecurityError};
use crate::security::keys::KeyPair;

/// Security core configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Path to the PEM-encoded RSA private key used for token signing.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Path to the PEM-encoded RSA public key used for token verification.
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,

    /// Fixed generator node ID in `[0, 1023]`. When absent, a random node
    /// ID is drawn at startup.
    #[serde(default)]
    pub node_id: Option<u16>,
}

impl SecurityConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SecurityError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "security config loaded");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SecurityError::Config(e.to_string()))
    }

    /// Read and parse the configured key pair.
    ///
    /// Both paths must be present; missing or unreadable files are
    /// [`SecurityError::Config`], unusable key material is
    /// [`SecurityError::Key`].
    pub fn load_key_pair(&self) -> Result<KeyPair> {
        let private_pem = self.read_pem(self.private_key_path.as_deref(), "private_key_path")?;
        let public_pem = self.read_pem(self.public_key_path.as_deref(), "public_key_path")?;
        KeyPair::from_pem(&private_pem, &public_pem)
    }

    fn read_pem(&self, path: Option<&Path>, field: &str) -> Result<String> {
        let path =
            path.ok_or_else(|| SecurityError::Config(format!("{field} is not configured")))?;
        std::fs::read_to_string(path)
            .map_err(|e| SecurityError::Config(format!("cannot read {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::keys::fixtures::{RSA_PRIVATE_A, RSA_PUBLIC_A};
    use tempfile::TempDir;

    #[test]
    fn parses_full_config() {
        let config = SecurityConfig::from_toml(
            r#"
            private_key_path = "/etc/authcore/signing.pem"
            public_key_path = "/etc/authcore/verifying.pem"
            node_id = 12
            "#,
        )
        .unwrap();

        assert_eq!(
            config.private_key_path.as_deref(),
            Some(Path::new("/etc/authcore/signing.pem"))
        );
        assert_eq!(config.node_id, Some(12));
    }

    #[test]
    fn all_fields_are_optional() {
        let config = SecurityConfig::from_toml("").unwrap();
        assert!(config.private_key_path.is_none());
        assert!(config.public_key_path.is_none());
        assert!(config.node_id.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SecurityConfig::from_toml("unexpected = true").unwrap_err();
        assert!(matches!(err, SecurityError::Config(_)));
    }

    #[test]
    fn load_key_pair_from_files() {
        let tmp = TempDir::new().unwrap();
        let private_path = tmp.path().join("signing.pem");
        let public_path = tmp.path().join("verifying.pem");
        std::fs::write(&private_path, RSA_PRIVATE_A).unwrap();
        std::fs::write(&public_path, RSA_PUBLIC_A).unwrap();

        let config = SecurityConfig {
            private_key_path: Some(private_path),
            public_key_path: Some(public_path),
            node_id: None,
        };

        assert!(config.load_key_pair().is_ok());
    }

    #[test]
    fn missing_key_paths_are_config_errors() {
        let config = SecurityConfig::default();
        let err = config.load_key_pair().err().unwrap();
        assert!(matches!(err, SecurityError::Config(_)));

        let config = SecurityConfig {
            private_key_path: Some(PathBuf::from("/nonexistent/signing.pem")),
            public_key_path: Some(PathBuf::from("/nonexistent/verifying.pem")),
            node_id: None,
        };
        let err = config.load_key_pair().err().unwrap();
        assert!(matches!(err, SecurityError::Config(_)));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = SecurityConfig::load(Path::new("/nonexistent/authcore.toml")).unwrap_err();
        assert!(matches!(err, SecurityError::Config(_)));
    }
}
