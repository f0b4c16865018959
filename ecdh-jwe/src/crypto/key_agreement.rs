//! Elliptic-curve Diffie-Hellman key agreement
//!
//! Point arithmetic and point validation come from the RustCrypto curve
//! crates; this module only binds keys to named curves and refuses to mix
//! them.

use crate::error::KeyAgreementError;
use crate::registry::Curve;
use crate::secret::SecretBytes;
use std::fmt;

#[cfg(feature = "crypto-secp256k1")]
use k256::elliptic_curve::sec1::ToEncodedPoint as _;
#[cfg(feature = "crypto-p256")]
use p256::elliptic_curve::sec1::ToEncodedPoint as _;
#[cfg(feature = "crypto-p384")]
use p384::elliptic_curve::sec1::ToEncodedPoint as _;
#[cfg(feature = "crypto-p521")]
use p521::elliptic_curve::sec1::ToEncodedPoint as _;

/// A static elliptic-curve private key bound to its curve
#[derive(Clone)]
pub enum EcPrivateKey {
    /// NIST P-256 scalar
    #[cfg(feature = "crypto-p256")]
    P256(p256::SecretKey),
    /// NIST P-384 scalar
    #[cfg(feature = "crypto-p384")]
    P384(p384::SecretKey),
    /// NIST P-521 scalar
    #[cfg(feature = "crypto-p521")]
    P521(p521::SecretKey),
    /// secp256k1 scalar
    #[cfg(feature = "crypto-secp256k1")]
    Secp256k1(k256::SecretKey),
}

impl EcPrivateKey {
    /// Decodes a big-endian private scalar of exactly the curve's field width
    pub fn from_bytes(curve: Curve, d: &[u8]) -> Result<Self, KeyAgreementError> {
        if d.len() != curve.field_len() {
            return Err(KeyAgreementError::InvalidPrivateKey(curve));
        }
        let invalid = |_| KeyAgreementError::InvalidPrivateKey(curve);

        match curve {
            #[cfg(feature = "crypto-p256")]
            Curve::P256 => p256::SecretKey::from_slice(d).map(Self::P256).map_err(invalid),
            #[cfg(feature = "crypto-p384")]
            Curve::P384 => p384::SecretKey::from_slice(d).map(Self::P384).map_err(invalid),
            #[cfg(feature = "crypto-p521")]
            Curve::P521 => p521::SecretKey::from_slice(d).map(Self::P521).map_err(invalid),
            #[cfg(feature = "crypto-secp256k1")]
            Curve::Secp256k1 => k256::SecretKey::from_slice(d)
                .map(Self::Secp256k1)
                .map_err(invalid),
            #[allow(unreachable_patterns)]
            _ => Err(KeyAgreementError::InvalidPrivateKey(curve)),
        }
    }

    /// Curve this key belongs to
    pub fn curve(&self) -> Curve {
        match self {
            #[cfg(feature = "crypto-p256")]
            Self::P256(_) => Curve::P256,
            #[cfg(feature = "crypto-p384")]
            Self::P384(_) => Curve::P384,
            #[cfg(feature = "crypto-p521")]
            Self::P521(_) => Curve::P521,
            #[cfg(feature = "crypto-secp256k1")]
            Self::Secp256k1(_) => Curve::Secp256k1,
        }
    }

    /// Public half of this key
    pub fn public_key(&self) -> EcPublicKey {
        match self {
            #[cfg(feature = "crypto-p256")]
            Self::P256(sk) => EcPublicKey::P256(sk.public_key()),
            #[cfg(feature = "crypto-p384")]
            Self::P384(sk) => EcPublicKey::P384(sk.public_key()),
            #[cfg(feature = "crypto-p521")]
            Self::P521(sk) => EcPublicKey::P521(sk.public_key()),
            #[cfg(feature = "crypto-secp256k1")]
            Self::Secp256k1(sk) => EcPublicKey::Secp256k1(sk.public_key()),
        }
    }
}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("curve", &self.curve())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "crypto-p256")]
impl From<p256::SecretKey> for EcPrivateKey {
    fn from(key: p256::SecretKey) -> Self {
        Self::P256(key)
    }
}

#[cfg(feature = "crypto-p384")]
impl From<p384::SecretKey> for EcPrivateKey {
    fn from(key: p384::SecretKey) -> Self {
        Self::P384(key)
    }
}

#[cfg(feature = "crypto-p521")]
impl From<p521::SecretKey> for EcPrivateKey {
    fn from(key: p521::SecretKey) -> Self {
        Self::P521(key)
    }
}

#[cfg(feature = "crypto-secp256k1")]
impl From<k256::SecretKey> for EcPrivateKey {
    fn from(key: k256::SecretKey) -> Self {
        Self::Secp256k1(key)
    }
}

/// A validated elliptic-curve public key bound to its curve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcPublicKey {
    /// NIST P-256 point
    #[cfg(feature = "crypto-p256")]
    P256(p256::PublicKey),
    /// NIST P-384 point
    #[cfg(feature = "crypto-p384")]
    P384(p384::PublicKey),
    /// NIST P-521 point
    #[cfg(feature = "crypto-p521")]
    P521(p521::PublicKey),
    /// secp256k1 point
    #[cfg(feature = "crypto-secp256k1")]
    Secp256k1(k256::PublicKey),
}

impl EcPublicKey {
    /// Builds a public key from affine coordinates.
    ///
    /// The point must lie on `curve` and must not be the identity; anything
    /// else is [`KeyAgreementError::InvalidPeerKey`]. This is the guard
    /// against invalid-curve attacks, so it runs before any scalar
    /// multiplication.
    pub fn from_coordinates(curve: Curve, x: &[u8], y: &[u8]) -> Result<Self, KeyAgreementError> {
        let n = curve.field_len();
        if x.len() != n || y.len() != n {
            return Err(KeyAgreementError::InvalidPeerKey);
        }

        let mut sec1 = Vec::with_capacity(1 + 2 * n);
        sec1.push(0x04); // Uncompressed point format
        sec1.extend_from_slice(x);
        sec1.extend_from_slice(y);

        let invalid = |_| KeyAgreementError::InvalidPeerKey;
        match curve {
            #[cfg(feature = "crypto-p256")]
            Curve::P256 => p256::PublicKey::from_sec1_bytes(&sec1)
                .map(Self::P256)
                .map_err(invalid),
            #[cfg(feature = "crypto-p384")]
            Curve::P384 => p384::PublicKey::from_sec1_bytes(&sec1)
                .map(Self::P384)
                .map_err(invalid),
            #[cfg(feature = "crypto-p521")]
            Curve::P521 => p521::PublicKey::from_sec1_bytes(&sec1)
                .map(Self::P521)
                .map_err(invalid),
            #[cfg(feature = "crypto-secp256k1")]
            Curve::Secp256k1 => k256::PublicKey::from_sec1_bytes(&sec1)
                .map(Self::Secp256k1)
                .map_err(invalid),
            #[allow(unreachable_patterns)]
            _ => Err(KeyAgreementError::InvalidPeerKey),
        }
    }

    /// Curve this key belongs to
    pub fn curve(&self) -> Curve {
        match self {
            #[cfg(feature = "crypto-p256")]
            Self::P256(_) => Curve::P256,
            #[cfg(feature = "crypto-p384")]
            Self::P384(_) => Curve::P384,
            #[cfg(feature = "crypto-p521")]
            Self::P521(_) => Curve::P521,
            #[cfg(feature = "crypto-secp256k1")]
            Self::Secp256k1(_) => Curve::Secp256k1,
        }
    }

    /// Affine `(x, y)` coordinates, each exactly the curve's field width
    pub fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let point = match self {
            #[cfg(feature = "crypto-p256")]
            Self::P256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            #[cfg(feature = "crypto-p384")]
            Self::P384(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            #[cfg(feature = "crypto-p521")]
            Self::P521(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            #[cfg(feature = "crypto-secp256k1")]
            Self::Secp256k1(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        };
        let n = self.curve().field_len();
        (point[1..1 + n].to_vec(), point[1 + n..].to_vec())
    }
}

/// Computes a shared secret from a local private key and a peer public key.
///
/// Implemented by [`EcdhKeyAgreement`] and by any function or closure with
/// the same shape, so the orchestrator can be handed a different agreement
/// step without subclassing anything.
pub trait KeyAgreement: Send + Sync {
    /// Returns the agreed secret (Z)
    fn agree(
        &self,
        private_key: &EcPrivateKey,
        peer_public_key: &EcPublicKey,
    ) -> Result<SecretBytes, KeyAgreementError>;
}

impl<F> KeyAgreement for F
where
    F: Fn(&EcPrivateKey, &EcPublicKey) -> Result<SecretBytes, KeyAgreementError> + Send + Sync,
{
    fn agree(
        &self,
        private_key: &EcPrivateKey,
        peer_public_key: &EcPublicKey,
    ) -> Result<SecretBytes, KeyAgreementError> {
        self(private_key, peer_public_key)
    }
}

/// Static-ephemeral ECDH over the supported curves
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdhKeyAgreement;

impl KeyAgreement for EcdhKeyAgreement {
    fn agree(
        &self,
        private_key: &EcPrivateKey,
        peer_public_key: &EcPublicKey,
    ) -> Result<SecretBytes, KeyAgreementError> {
        ecdh(private_key, peer_public_key)
    }
}

/// ECDH shared secret: the x-coordinate of `d * Q`, field-width bytes long
pub fn ecdh(
    private_key: &EcPrivateKey,
    peer_public_key: &EcPublicKey,
) -> Result<SecretBytes, KeyAgreementError> {
    // The SharedSecret values zeroize themselves when dropped at the end of each arm
    match (private_key, peer_public_key) {
        #[cfg(feature = "crypto-p256")]
        (EcPrivateKey::P256(sk), EcPublicKey::P256(pk)) => {
            let shared = p256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
            Ok(SecretBytes::from_slice(shared.raw_secret_bytes()))
        }
        #[cfg(feature = "crypto-p384")]
        (EcPrivateKey::P384(sk), EcPublicKey::P384(pk)) => {
            let shared = p384::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
            Ok(SecretBytes::from_slice(shared.raw_secret_bytes()))
        }
        #[cfg(feature = "crypto-p521")]
        (EcPrivateKey::P521(sk), EcPublicKey::P521(pk)) => {
            let shared = p521::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
            Ok(SecretBytes::from_slice(shared.raw_secret_bytes()))
        }
        #[cfg(feature = "crypto-secp256k1")]
        (EcPrivateKey::Secp256k1(sk), EcPublicKey::Secp256k1(pk)) => {
            let shared = k256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
            Ok(SecretBytes::from_slice(shared.raw_secret_bytes()))
        }
        #[allow(unreachable_patterns)]
        _ => Err(KeyAgreementError::CurveMismatch {
            private: private_key.curve(),
            peer: peer_public_key.curve(),
        }),
    }
}
