//! JWE message types
//!
//! [`JweMessage`] holds a JWE in its decoded compact form. The protected
//! header is kept twice: decoded into [`JweHeader`] for field access and as
//! the raw base64url segment, which is the AES-GCM additional authenticated
//! data and is never re-encoded.

use crate::error::OrchestratorError;
use crate::jwk::Jwk;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protected header of an ECDH-ES JWE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JweHeader {
    /// Key management algorithm
    pub alg: String,

    /// Content encryption algorithm
    pub enc: String,

    /// Ephemeral public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epk: Option<Jwk>,

    /// Ephemeral public key under its pre-RFC member name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epv: Option<Jwk>,

    /// Base64url PartyUInfo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apu: Option<String>,

    /// Base64url PartyVInfo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apv: Option<String>,

    /// Recipient key ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Media type of the complete JWE
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Media type of the plaintext
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// Any other header parameters
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl JweHeader {
    /// Header with just `alg` and `enc` set
    pub fn new(alg: &str, enc: &str) -> Self {
        Self {
            alg: alg.to_string(),
            enc: enc.to_string(),
            epk: None,
            epv: None,
            apu: None,
            apv: None,
            kid: None,
            typ: None,
            cty: None,
            additional: Map::new(),
        }
    }

    /// Serializes and base64url-encodes the header for use as a protected segment
    pub fn encode(&self) -> Result<String, OrchestratorError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| OrchestratorError::MalformedHeader(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

/// A parsed JWE ready for decryption
#[derive(Debug, Clone)]
pub struct JweMessage {
    protected: String,
    header: JweHeader,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

impl JweMessage {
    /// Assembles a message from already decoded parts.
    ///
    /// `protected` must be the base64url protected header exactly as it was
    /// transmitted.
    pub fn new(
        protected: impl Into<String>,
        header: JweHeader,
        encrypted_key: Vec<u8>,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Vec<u8>,
    ) -> Self {
        Self {
            protected: protected.into(),
            header,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        }
    }

    /// Parses the compact serialization
    /// `protected.encrypted_key.iv.ciphertext.tag`
    pub fn from_compact(compact: &str) -> Result<Self, OrchestratorError> {
        let segments: Vec<&str> = compact.trim().split('.').collect();
        let [protected, encrypted_key, iv, ciphertext, tag] = segments[..] else {
            return Err(OrchestratorError::MalformedHeader(format!(
                "compact JWE must have 5 segments, found {}",
                segments.len()
            )));
        };

        let header_json = decode_segment(protected, "protected header")?;
        let header: JweHeader = serde_json::from_slice(&header_json)
            .map_err(|e| OrchestratorError::MalformedHeader(e.to_string()))?;

        Ok(Self {
            protected: protected.to_string(),
            header,
            encrypted_key: decode_segment(encrypted_key, "encrypted key")?,
            iv: decode_segment(iv, "initialization vector")?,
            ciphertext: decode_segment(ciphertext, "ciphertext")?,
            tag: decode_segment(tag, "authentication tag")?,
        })
    }

    /// Re-assembles the compact serialization
    pub fn to_compact(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            self.protected,
            URL_SAFE_NO_PAD.encode(&self.encrypted_key),
            URL_SAFE_NO_PAD.encode(&self.iv),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
            URL_SAFE_NO_PAD.encode(&self.tag),
        )
    }

    /// Decoded protected header
    pub fn header(&self) -> &JweHeader {
        &self.header
    }

    /// Additional authenticated data: the protected segment's ASCII bytes
    pub fn aad(&self) -> &[u8] {
        self.protected.as_bytes()
    }

    /// Encrypted key segment, empty in direct mode
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// Initialization vector
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Ciphertext
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Authentication tag
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, OrchestratorError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| OrchestratorError::MalformedHeader(format!("{} is not base64url", name)))
}
