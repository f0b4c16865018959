//! Error handling for ECDH-ES JWE decryption
//!
//! Each pipeline component reports its own error type; [`Error`] wraps them
//! so callers get a single typed failure out of the orchestrator. None of the
//! messages carry key material, shared secrets or plaintext.

use crate::registry::Curve;
use thiserror::Error;

/// Type alias for Results with decryption errors
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while computing the ECDH shared secret
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyAgreementError {
    /// Private key and peer public key live on different curves
    #[error("Curve mismatch: private key is on {private}, peer key is on {peer}")]
    CurveMismatch {
        /// Curve of the local private key
        private: Curve,
        /// Curve of the peer public key
        peer: Curve,
    },

    /// Peer public key is not a valid point on its curve
    #[error("Invalid peer public key")]
    InvalidPeerKey,

    /// Private scalar could not be decoded
    #[error("Invalid private key for {0}")]
    InvalidPrivateKey(Curve),
}

/// Errors raised by the Concat KDF
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdfError {
    /// Requested key length is zero or not a whole number of bytes
    #[error("Unsupported key length: {0} bits")]
    UnsupportedKeyLength(usize),

    /// A context field does not fit a 32-bit length prefix
    #[error("KDF context field too large: {0}")]
    ContextTooLarge(&'static str),
}

/// Errors raised by authenticated content decryption
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptionError {
    /// CEK, IV or tag length does not match the content encryption algorithm
    #[error("Invalid {parameter} length: expected {expected} bytes, got {actual}")]
    InvalidParameterLength {
        /// Which input had the wrong length
        parameter: &'static str,
        /// Length required by the algorithm
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// Authentication tag did not verify
    #[error("Authentication failed")]
    AuthenticationFailed,
}

/// Errors raised by the decryption orchestrator itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Header names a different key agreement or a disallowed content algorithm
    #[error("Algorithm mismatch: expected {expected}, found {found}")]
    AlgorithmMismatch {
        /// Algorithm this decryptor accepts
        expected: String,
        /// Algorithm found in the header
        found: String,
    },

    /// Direct mode requires an empty encrypted key segment
    #[error("Unexpected encrypted key of {0} bytes in direct key agreement mode")]
    UnexpectedEncryptedKey(usize),

    /// Header fields are missing or not decodable
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Content encryption algorithm is not in the registry
    #[error("Unsupported content encryption algorithm: {0}")]
    UnsupportedContentEncryption(String),

    /// Ephemeral key's curve is too small for the content encryption key
    #[error("Curve {curve} cannot supply a {key_bits}-bit content encryption key")]
    InsufficientCurveStrength {
        /// Curve of the ephemeral public key
        curve: Curve,
        /// Bits required by the content encryption algorithm
        key_bits: usize,
    },
}

/// Error types for JWE decryption
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Key agreement failure
    #[error("Key agreement error: {0}")]
    KeyAgreement(#[from] KeyAgreementError),

    /// Key derivation failure
    #[error("Key derivation error: {0}")]
    Kdf(#[from] KdfError),

    /// Content decryption failure
    #[error("Decryption error: {0}")]
    Decryption(#[from] DecryptionError),

    /// Header or message validation failure
    #[error("JWE error: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

impl Error {
    /// Short, stable name of the error kind, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::KeyAgreement(KeyAgreementError::CurveMismatch { .. }) => "CurveMismatch",
            Error::KeyAgreement(KeyAgreementError::InvalidPeerKey) => "InvalidPeerKey",
            Error::KeyAgreement(KeyAgreementError::InvalidPrivateKey(_)) => "InvalidPrivateKey",
            Error::Kdf(KdfError::UnsupportedKeyLength(_)) => "UnsupportedKeyLength",
            Error::Kdf(KdfError::ContextTooLarge(_)) => "ContextTooLarge",
            Error::Decryption(DecryptionError::InvalidParameterLength { .. }) => {
                "InvalidParameterLength"
            }
            Error::Decryption(DecryptionError::AuthenticationFailed) => "AuthenticationFailed",
            Error::Orchestrator(OrchestratorError::AlgorithmMismatch { .. }) => "AlgorithmMismatch",
            Error::Orchestrator(OrchestratorError::UnexpectedEncryptedKey(_)) => {
                "UnexpectedEncryptedKey"
            }
            Error::Orchestrator(OrchestratorError::MalformedHeader(_)) => "MalformedHeader",
            Error::Orchestrator(OrchestratorError::UnsupportedContentEncryption(_)) => {
                "UnsupportedContentEncryption"
            }
            Error::Orchestrator(OrchestratorError::InsufficientCurveStrength { .. }) => {
                "InsufficientCurveStrength"
            }
        }
    }
}
