//! Configuration for the ECDH-ES decryptor

use crate::error::{OrchestratorError, Result};
use crate::registry::ContentEncryptionAlgorithm;

/// Configuration options for an [`EcdhDirectDecryptor`](crate::EcdhDirectDecryptor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptorConfig {
    /// Content encryption algorithms this decryptor will accept in `enc`
    pub allowed_content_algorithms: Vec<ContentEncryptionAlgorithm>,

    /// Honor an ephemeral key sent under the legacy `epv` member when `epk` is absent
    pub accept_legacy_epv: bool,
}

impl DecryptorConfig {
    /// Creates a config that accepts every AES-GCM variant
    pub fn new() -> Self {
        Self {
            allowed_content_algorithms: vec![
                ContentEncryptionAlgorithm::A128Gcm,
                ContentEncryptionAlgorithm::A192Gcm,
                ContentEncryptionAlgorithm::A256Gcm,
            ],
            accept_legacy_epv: true,
        }
    }

    /// Creates a config bound to a single content encryption algorithm
    pub fn for_content_algorithm(algorithm: ContentEncryptionAlgorithm) -> Self {
        Self::new().with_allowed_content_algorithms(&[algorithm])
    }

    /// Sets the accepted content encryption algorithms
    pub fn with_allowed_content_algorithms(
        mut self,
        algorithms: &[ContentEncryptionAlgorithm],
    ) -> Self {
        self.allowed_content_algorithms = algorithms.to_vec();
        self
    }

    /// Sets whether the legacy `epv` member is honored
    pub fn with_legacy_epv(mut self, accept: bool) -> Self {
        self.accept_legacy_epv = accept;
        self
    }

    /// Returns true if `algorithm` may be used
    pub fn permits(&self, algorithm: ContentEncryptionAlgorithm) -> bool {
        self.allowed_content_algorithms.contains(&algorithm)
    }

    /// Allowed algorithm names, comma separated
    pub(crate) fn allowed_names(&self) -> String {
        self.allowed_content_algorithms
            .iter()
            .map(|a| a.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for DecryptorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates a decryptor configuration
pub fn validate(config: &DecryptorConfig) -> Result<()> {
    if config.allowed_content_algorithms.is_empty() {
        return Err(OrchestratorError::UnsupportedContentEncryption(
            "no content encryption algorithm is allowed".to_string(),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_all_gcm() {
        let config = DecryptorConfig::default();
        assert!(config.permits(ContentEncryptionAlgorithm::A128Gcm));
        assert!(config.permits(ContentEncryptionAlgorithm::A256Gcm));
        assert!(config.accept_legacy_epv);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_single_algorithm() {
        let config = DecryptorConfig::for_content_algorithm(ContentEncryptionAlgorithm::A256Gcm)
            .with_legacy_epv(false);
        assert!(!config.permits(ContentEncryptionAlgorithm::A128Gcm));
        assert_eq!(config.allowed_names(), "A256GCM");
        assert!(!config.accept_legacy_epv);
    }

    #[test]
    fn test_empty_allow_list_is_invalid() {
        let config = DecryptorConfig::new().with_allowed_content_algorithms(&[]);
        assert!(validate(&config).is_err());
    }
}
