//! ECDH-ES direct key agreement JWE decryption
//!
//! This crate decrypts JSON Web Encryption messages whose content encryption
//! key was agreed with Elliptic-Curve Diffie-Hellman Ephemeral-Static in
//! direct mode: the Concat KDF output is the AES-GCM key, no key wrapping
//! takes place and the encrypted key segment is empty.
//!
//! The pipeline is `header -> peer public key -> shared secret -> CEK -> plaintext`.
//! Each step is a pure function of its inputs, so a single
//! [`EcdhDirectDecryptor`] can be shared between threads.

#[cfg(not(any(
    feature = "crypto-p256",
    feature = "crypto-p384",
    feature = "crypto-p521",
    feature = "crypto-secp256k1"
)))]
compile_error!("at least one elliptic curve feature must be enabled");

/// Command-line interface
pub mod cli;

/// Decryptor configuration
pub mod config;

/// Key agreement, key derivation and content decryption primitives
pub mod crypto;

/// Decryption orchestrator
pub mod decrypt;

/// Error types
pub mod error;

/// JSON Web Key decoding
pub mod jwk;

/// Parsed JWE messages
pub mod message;

/// Algorithm name to parameter mapping
pub mod registry;

/// Zeroizing buffers for transient key material
pub mod secret;

pub use config::DecryptorConfig;
pub use crypto::{
    concat_kdf, AesGcmDecryption, ContentDecryption, EcPrivateKey, EcPublicKey,
    EcdhKeyAgreement, KeyAgreement,
};
pub use decrypt::{DecryptionStage, EcdhDirectDecryptor, ECDH_ES};
pub use error::{DecryptionError, Error, KdfError, KeyAgreementError, OrchestratorError, Result};
pub use jwk::Jwk;
pub use message::{JweHeader, JweMessage};
pub use registry::{AlgorithmRegistry, ContentEncryptionAlgorithm, Curve, KdfDigest};
pub use secret::SecretBytes;

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
