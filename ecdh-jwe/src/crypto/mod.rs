//! Cryptographic primitives for ECDH-ES direct decryption
//!
//! This module provides:
//! - ECDH key agreement over P-256, P-384, P-521 and secp256k1
//! - ECDH-ES key derivation (Concat KDF per NIST SP 800-56A)
//! - AES-GCM content decryption
//!
//! Key agreement and content decryption are exposed as traits so the
//! orchestrator can be assembled from other implementations.

mod aead;
mod kdf;
mod key_agreement;

pub use aead::{check_parameter_lengths, AesGcmDecryption, ContentDecryption};
pub use kdf::{concat_kdf, concat_kdf_with};
pub use key_agreement::{ecdh, EcPrivateKey, EcPublicKey, EcdhKeyAgreement, KeyAgreement};
