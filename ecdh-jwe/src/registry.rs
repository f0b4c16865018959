//! Algorithm registry
//!
//! Maps JWA content encryption names and JWK curve names to the parameters
//! the decryptor needs: CEK size, IV and tag sizes, curve field width and the
//! digest used by the Concat KDF. A registry is immutable once built; the
//! standard one is built once per process and handed to the decryptor
//! explicitly.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// JWE content encryption algorithm (the `enc` header value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncryptionAlgorithm {
    /// AES-GCM with 128-bit key
    A128Gcm,
    /// AES-GCM with 192-bit key
    A192Gcm,
    /// AES-GCM with 256-bit key
    A256Gcm,
}

impl ContentEncryptionAlgorithm {
    /// Returns the algorithm identifier as a string
    pub fn name(&self) -> &'static str {
        match self {
            ContentEncryptionAlgorithm::A128Gcm => "A128GCM",
            ContentEncryptionAlgorithm::A192Gcm => "A192GCM",
            ContentEncryptionAlgorithm::A256Gcm => "A256GCM",
        }
    }

    /// Content encryption key size in bits
    pub fn key_bits(&self) -> usize {
        match self {
            ContentEncryptionAlgorithm::A128Gcm => 128,
            ContentEncryptionAlgorithm::A192Gcm => 192,
            ContentEncryptionAlgorithm::A256Gcm => 256,
        }
    }

    /// Initialization vector size in bytes
    pub fn iv_len(&self) -> usize {
        12
    }

    /// Authentication tag size in bytes
    pub fn tag_len(&self) -> usize {
        16
    }
}

impl fmt::Display for ContentEncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named elliptic curve usable for ECDH-ES
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256
    P256,
    /// NIST P-384
    P384,
    /// NIST P-521
    P521,
    /// SECG secp256k1
    Secp256k1,
}

impl Curve {
    /// JWK `crv` name
    pub fn name(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    /// Width in bytes of a field element, which is also the shared secret size
    pub fn field_len(&self) -> usize {
        match self {
            Curve::P256 | Curve::Secp256k1 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    /// Size of the field in bits
    pub fn field_bits(&self) -> usize {
        match self {
            Curve::P521 => 521,
            other => other.field_len() * 8,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest driving the Concat KDF rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KdfDigest {
    /// SHA-256, the digest JWA specifies for ECDH-ES
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl KdfDigest {
    /// Digest output size in bits
    pub fn output_bits(&self) -> usize {
        match self {
            KdfDigest::Sha256 => 256,
            KdfDigest::Sha384 => 384,
            KdfDigest::Sha512 => 512,
        }
    }
}

static STANDARD: Lazy<AlgorithmRegistry> = Lazy::new(|| AlgorithmRegistry::builder().build());

/// Immutable algorithm name to parameter mapping
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    content: HashMap<&'static str, ContentEncryptionAlgorithm>,
    curves: HashMap<&'static str, Curve>,
    kdf_digest: KdfDigest,
}

impl AlgorithmRegistry {
    /// The process-wide registry with every supported algorithm and SHA-256
    pub fn standard() -> &'static AlgorithmRegistry {
        &STANDARD
    }

    /// Starts a registry with every supported algorithm registered
    pub fn builder() -> AlgorithmRegistryBuilder {
        AlgorithmRegistryBuilder::default()
    }

    /// Looks up a content encryption algorithm by its `enc` name
    pub fn content_algorithm(&self, name: &str) -> Option<ContentEncryptionAlgorithm> {
        self.content.get(name).copied()
    }

    /// Looks up a curve by its JWK `crv` name
    pub fn curve(&self, name: &str) -> Option<Curve> {
        self.curves.get(name).copied()
    }

    /// Digest used by the Concat KDF
    pub fn kdf_digest(&self) -> KdfDigest {
        self.kdf_digest
    }
}

/// Builder for [`AlgorithmRegistry`]
#[derive(Debug, Clone)]
pub struct AlgorithmRegistryBuilder {
    content: Vec<ContentEncryptionAlgorithm>,
    curves: Vec<Curve>,
    kdf_digest: KdfDigest,
}

impl Default for AlgorithmRegistryBuilder {
    fn default() -> Self {
        let mut curves = Vec::new();
        #[cfg(feature = "crypto-p256")]
        curves.push(Curve::P256);
        #[cfg(feature = "crypto-p384")]
        curves.push(Curve::P384);
        #[cfg(feature = "crypto-p521")]
        curves.push(Curve::P521);
        #[cfg(feature = "crypto-secp256k1")]
        curves.push(Curve::Secp256k1);

        Self {
            content: vec![
                ContentEncryptionAlgorithm::A128Gcm,
                ContentEncryptionAlgorithm::A192Gcm,
                ContentEncryptionAlgorithm::A256Gcm,
            ],
            curves,
            kdf_digest: KdfDigest::Sha256,
        }
    }
}

impl AlgorithmRegistryBuilder {
    /// Registers only the given content encryption algorithms
    pub fn content_algorithms(mut self, algorithms: &[ContentEncryptionAlgorithm]) -> Self {
        self.content = algorithms.to_vec();
        self
    }

    /// Registers only the given curves
    pub fn curves(mut self, curves: &[Curve]) -> Self {
        self.curves = curves.to_vec();
        self
    }

    /// Sets the Concat KDF digest
    pub fn kdf_digest(mut self, digest: KdfDigest) -> Self {
        self.kdf_digest = digest;
        self
    }

    /// Freezes the registry
    pub fn build(self) -> AlgorithmRegistry {
        AlgorithmRegistry {
            content: self.content.into_iter().map(|a| (a.name(), a)).collect(),
            curves: self.curves.into_iter().map(|c| (c.name(), c)).collect(),
            kdf_digest: self.kdf_digest,
        }
    }
}
