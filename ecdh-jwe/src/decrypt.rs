//! ECDH-ES direct key agreement decryption
//!
//! [`EcdhDirectDecryptor`] drives one message through a fixed sequence of
//! stages:
//!
//! `Start -> HeaderValidated -> PeerKeyExtracted -> SharedSecretComputed -> CekDerived -> PlaintextRecovered`
//!
//! Any error ends the run with the component's typed error. The shared
//! secret and the CEK are held in [`SecretBytes`](crate::SecretBytes) and
//! wiped when the call returns, whichever way it returns.

use crate::config::{self, DecryptorConfig};
use crate::crypto::{
    check_parameter_lengths, concat_kdf, AesGcmDecryption, ContentDecryption, EcPrivateKey,
    EcPublicKey, EcdhKeyAgreement, KeyAgreement,
};
use crate::error::{KeyAgreementError, OrchestratorError, Result};
use crate::message::{JweHeader, JweMessage};
use crate::registry::{AlgorithmRegistry, ContentEncryptionAlgorithm, Curve};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fmt;
use tracing::{debug, warn};

/// `alg` value for ECDH-ES in direct key agreement mode
pub const ECDH_ES: &str = "ECDH-ES";

/// Progress of a single decryption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionStage {
    /// Nothing checked yet
    Start,
    /// `alg`, `enc`, encrypted key, IV and tag sizes accepted
    HeaderValidated,
    /// Ephemeral public key and apu/apv decoded
    PeerKeyExtracted,
    /// ECDH shared secret computed
    SharedSecretComputed,
    /// Content encryption key derived
    CekDerived,
    /// Tag verified and plaintext released
    PlaintextRecovered,
}

impl DecryptionStage {
    /// Returns the stage name
    pub fn as_str(&self) -> &'static str {
        match self {
            DecryptionStage::Start => "Start",
            DecryptionStage::HeaderValidated => "HeaderValidated",
            DecryptionStage::PeerKeyExtracted => "PeerKeyExtracted",
            DecryptionStage::SharedSecretComputed => "SharedSecretComputed",
            DecryptionStage::CekDerived => "CekDerived",
            DecryptionStage::PlaintextRecovered => "PlaintextRecovered",
        }
    }
}

impl fmt::Display for DecryptionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values pulled out of the header for key agreement and derivation
struct PeerContext {
    peer_public_key: EcPublicKey,
    apu: Option<Vec<u8>>,
    apv: Option<Vec<u8>>,
}

/// Decrypts ECDH-ES direct key agreement JWEs.
///
/// The key agreement and content decryption steps are supplied as
/// strategies; [`EcdhDirectDecryptor::standard`] uses ECDH and AES-GCM.
/// The decryptor holds no per-message state and can be shared freely.
#[derive(Debug, Clone)]
pub struct EcdhDirectDecryptor<'r, K = EcdhKeyAgreement, C = AesGcmDecryption> {
    registry: &'r AlgorithmRegistry,
    config: DecryptorConfig,
    key_agreement: K,
    content_decryption: C,
}

impl EcdhDirectDecryptor<'static, EcdhKeyAgreement, AesGcmDecryption> {
    /// ECDH + AES-GCM over the standard registry, accepting every AES-GCM variant
    pub fn standard() -> Self {
        Self::new(
            AlgorithmRegistry::standard(),
            DecryptorConfig::default(),
            EcdhKeyAgreement,
            AesGcmDecryption,
        )
    }
}

impl<'r, K, C> EcdhDirectDecryptor<'r, K, C>
where
    K: KeyAgreement,
    C: ContentDecryption,
{
    /// Creates a decryptor from its registry, configuration and strategies.
    ///
    /// A config that fails [`config::validate`] is accepted here, but every
    /// message is then rejected with `UnsupportedContentEncryption` before
    /// the header is read.
    pub fn new(
        registry: &'r AlgorithmRegistry,
        config: DecryptorConfig,
        key_agreement: K,
        content_decryption: C,
    ) -> Self {
        Self {
            registry,
            config,
            key_agreement,
            content_decryption,
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: DecryptorConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry used for algorithm lookups
    pub fn registry(&self) -> &AlgorithmRegistry {
        self.registry
    }

    /// The active configuration
    pub fn config(&self) -> &DecryptorConfig {
        &self.config
    }

    /// Parses a compact JWE and decrypts it
    pub fn decrypt_compact(&self, private_key: &EcPrivateKey, compact: &str) -> Result<Vec<u8>> {
        let message = match JweMessage::from_compact(compact) {
            Ok(message) => message,
            Err(e) => {
                warn!(stage = %DecryptionStage::Start, error = "MalformedHeader", "JWE parsing failed");
                return Err(e.into());
            }
        };
        self.decrypt(private_key, &message)
    }

    /// Decrypts `message` with the recipient's static `private_key`
    pub fn decrypt(&self, private_key: &EcPrivateKey, message: &JweMessage) -> Result<Vec<u8>> {
        let span = tracing::debug_span!(
            "ecdh_es_decrypt",
            enc = %message.header().enc,
            curve = %private_key.curve()
        );
        let _guard = span.enter();

        let mut stage = DecryptionStage::Start;
        let result = self.run(private_key, message, &mut stage);

        match &result {
            Ok(plaintext) => debug!(
                stage = %stage,
                plaintext_len = plaintext.len(),
                "ECDH-ES decryption succeeded"
            ),
            Err(e) => warn!(stage = %stage, error = e.kind(), "ECDH-ES decryption failed"),
        }
        result
    }

    fn run(
        &self,
        private_key: &EcPrivateKey,
        message: &JweMessage,
        stage: &mut DecryptionStage,
    ) -> Result<Vec<u8>> {
        let enc = self.validate_header(message)?;
        advance(stage, DecryptionStage::HeaderValidated);

        let context = self.extract_peer_key(message.header(), private_key.curve(), enc)?;
        advance(stage, DecryptionStage::PeerKeyExtracted);

        let shared_secret = self
            .key_agreement
            .agree(private_key, &context.peer_public_key)?;
        advance(stage, DecryptionStage::SharedSecretComputed);

        let cek = concat_kdf(
            self.registry.kdf_digest(),
            shared_secret.expose(),
            enc.name(),
            context.apu.as_deref(),
            context.apv.as_deref(),
            enc.key_bits(),
        )?;
        drop(shared_secret);
        advance(stage, DecryptionStage::CekDerived);

        let plaintext = self.content_decryption.decrypt(
            enc,
            &cek,
            message.iv(),
            message.aad(),
            message.ciphertext(),
            message.tag(),
        )?;
        advance(stage, DecryptionStage::PlaintextRecovered);

        Ok(plaintext)
    }

    /// Start -> HeaderValidated. Fixes the algorithms before any key material is touched.
    fn validate_header(&self, message: &JweMessage) -> Result<ContentEncryptionAlgorithm> {
        config::validate(&self.config)?;
        let header = message.header();

        if header.alg != ECDH_ES {
            return Err(OrchestratorError::AlgorithmMismatch {
                expected: ECDH_ES.to_string(),
                found: header.alg.clone(),
            }
            .into());
        }

        if !message.encrypted_key().is_empty() {
            return Err(
                OrchestratorError::UnexpectedEncryptedKey(message.encrypted_key().len()).into(),
            );
        }

        let enc = self
            .registry
            .content_algorithm(&header.enc)
            .ok_or_else(|| OrchestratorError::UnsupportedContentEncryption(header.enc.clone()))?;

        if !self.config.permits(enc) {
            return Err(OrchestratorError::AlgorithmMismatch {
                expected: self.config.allowed_names(),
                found: header.enc.clone(),
            }
            .into());
        }

        check_parameter_lengths(enc, message.iv(), message.tag())?;
        Ok(enc)
    }

    /// HeaderValidated -> PeerKeyExtracted
    fn extract_peer_key(
        &self,
        header: &JweHeader,
        private_curve: Curve,
        enc: ContentEncryptionAlgorithm,
    ) -> Result<PeerContext> {
        let legacy = if self.config.accept_legacy_epv {
            header.epv.as_ref()
        } else {
            None
        };
        let epk = header.epk.as_ref().or(legacy).ok_or_else(|| {
            OrchestratorError::MalformedHeader("missing ephemeral public key (epk)".to_string())
        })?;

        let curve = epk.curve(self.registry)?;
        if curve != private_curve {
            return Err(KeyAgreementError::CurveMismatch {
                private: private_curve,
                peer: curve,
            }
            .into());
        }
        check_curve_strength(curve, enc)?;

        let peer_public_key = epk.to_public_key(self.registry)?;

        Ok(PeerContext {
            peer_public_key,
            apu: decode_party_info(header.apu.as_deref(), "apu")?,
            apv: decode_party_info(header.apv.as_deref(), "apv")?,
        })
    }
}

fn advance(stage: &mut DecryptionStage, next: DecryptionStage) {
    debug!(from = %stage, to = %next, "ECDH-ES stage transition");
    *stage = next;
}

/// The ephemeral key's curve must carry at least as many bits as the CEK
pub(crate) fn check_curve_strength(
    curve: Curve,
    enc: ContentEncryptionAlgorithm,
) -> std::result::Result<(), OrchestratorError> {
    if curve.field_bits() < enc.key_bits() {
        return Err(OrchestratorError::InsufficientCurveStrength {
            curve,
            key_bits: enc.key_bits(),
        });
    }
    Ok(())
}

fn decode_party_info(
    value: Option<&str>,
    name: &str,
) -> std::result::Result<Option<Vec<u8>>, OrchestratorError> {
    value
        .map(|v| {
            URL_SAFE_NO_PAD
                .decode(v)
                .map_err(|_| OrchestratorError::MalformedHeader(format!("{} is not base64url", name)))
        })
        .transpose()
}
