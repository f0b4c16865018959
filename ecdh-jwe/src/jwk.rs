//! JSON Web Key decoding for elliptic-curve keys.
//!
//! Only the `EC` key type is understood. Coordinates and the private scalar
//! are base64url without padding, as RFC 7518 Section 6.2 requires.

use crate::crypto::{EcPrivateKey, EcPublicKey};
use crate::error::{Error, KeyAgreementError, OrchestratorError};
use crate::registry::{AlgorithmRegistry, Curve};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// An elliptic-curve JWK
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `EC`
    pub kty: String,
    /// Curve name
    pub crv: String,
    /// Base64url x-coordinate
    pub x: String,
    /// Base64url y-coordinate
    pub y: String,
    /// Base64url private scalar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// Key ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl std::fmt::Debug for Jwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .field("kid", &self.kid)
            .finish()
    }
}

impl Jwk {
    /// Public JWK for `key`
    pub fn from_public_key(key: &EcPublicKey) -> Self {
        let (x, y) = key.coordinates();
        Self {
            kty: "EC".to_string(),
            crv: key.curve().name().to_string(),
            x: URL_SAFE_NO_PAD.encode(x),
            y: URL_SAFE_NO_PAD.encode(y),
            d: None,
            kid: None,
        }
    }

    /// Resolves `crv` against the registry after checking `kty`
    pub fn curve(&self, registry: &AlgorithmRegistry) -> Result<Curve, OrchestratorError> {
        if self.kty != "EC" {
            return Err(OrchestratorError::MalformedHeader(format!(
                "unsupported key type {:?}",
                self.kty
            )));
        }
        registry.curve(&self.crv).ok_or_else(|| {
            OrchestratorError::MalformedHeader(format!("unsupported curve {:?}", self.crv))
        })
    }

    /// Decodes and validates the public point
    pub fn to_public_key(&self, registry: &AlgorithmRegistry) -> Result<EcPublicKey, Error> {
        let curve = self.curve(registry)?;
        let x = decode_coordinate(&self.x, "x", curve)?;
        let y = decode_coordinate(&self.y, "y", curve)?;
        Ok(EcPublicKey::from_coordinates(curve, &x, &y)?)
    }

    /// Decodes the private scalar and checks it against the public point
    pub fn to_private_key(&self, registry: &AlgorithmRegistry) -> Result<EcPrivateKey, Error> {
        let curve = self.curve(registry)?;
        let d = self
            .d
            .as_deref()
            .ok_or(KeyAgreementError::InvalidPrivateKey(curve))?;
        let d = zeroize::Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(d)
                .map_err(|_| KeyAgreementError::InvalidPrivateKey(curve))?,
        );
        let private_key = EcPrivateKey::from_bytes(curve, &d)?;

        if private_key.public_key() != self.to_public_key(registry)? {
            return Err(KeyAgreementError::InvalidPrivateKey(curve).into());
        }
        Ok(private_key)
    }
}

fn decode_coordinate(
    value: &str,
    name: &str,
    curve: Curve,
) -> Result<Vec<u8>, OrchestratorError> {
    let bytes = URL_SAFE_NO_PAD.decode(value).map_err(|_| {
        OrchestratorError::MalformedHeader(format!("{} coordinate is not base64url", name))
    })?;
    if bytes.len() != curve.field_len() {
        return Err(OrchestratorError::MalformedHeader(format!(
            "{} coordinate must be {} bytes for {}, got {}",
            name,
            curve.field_len(),
            curve,
            bytes.len()
        )));
    }
    Ok(bytes)
}
