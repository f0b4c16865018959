//! Shared fixtures for integration tests
//!
//! Produces ECDH-ES direct JWEs the way a sender would: ephemeral key
//! agreement, Concat KDF over `enc`, then AES-GCM with the protected header
//! as AAD.

#![allow(dead_code)]

use aes_gcm::aead::consts::U12;
use aes_gcm::{AeadInPlace, Aes128Gcm, Aes256Gcm, AesGcm, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ecdh_jwe::crypto::ecdh;
use ecdh_jwe::{
    concat_kdf, ContentEncryptionAlgorithm, Curve, EcPrivateKey, EcPublicKey, Jwk, JweHeader,
    JweMessage, KdfDigest,
};
use rand::rngs::OsRng;
use rand::RngCore;

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

/// RFC 7518 Appendix C: Bob's static private key
pub const BOB_D: &str = "VEmDZpDXXK8p8N0Cndsxs924q6nS1RXFASRl6BfUqdw";
/// RFC 7518 Appendix C: Alice's ephemeral public key
pub const ALICE_EPK_X: &str = "gI0GAILBdu7T53akrFmMyGcsF3n5dO7MmwNBHKW5SV0";
pub const ALICE_EPK_Y: &str = "SLW_xSffzlPWrHEVI30DHM_4egVwt3NQqeUD7nMFpps";

pub fn bob() -> EcPrivateKey {
    let d = URL_SAFE_NO_PAD.decode(BOB_D).unwrap();
    EcPrivateKey::from_bytes(Curve::P256, &d).unwrap()
}

pub fn random_key(curve: Curve) -> EcPrivateKey {
    match curve {
        Curve::P256 => p256::SecretKey::random(&mut OsRng).into(),
        Curve::P384 => p384::SecretKey::random(&mut OsRng).into(),
        Curve::P521 => p521::SecretKey::random(&mut OsRng).into(),
        Curve::Secp256k1 => k256::SecretKey::random(&mut OsRng).into(),
    }
}

/// Options for building a test JWE
pub struct Sealed<'a> {
    pub enc: ContentEncryptionAlgorithm,
    pub apu: Option<&'a [u8]>,
    pub apv: Option<&'a [u8]>,
    pub iv: [u8; 12],
}

impl Default for Sealed<'_> {
    fn default() -> Self {
        let mut iv = [0u8; 12];
        OsRng.fill_bytes(&mut iv);
        Self {
            enc: ContentEncryptionAlgorithm::A256Gcm,
            apu: None,
            apv: None,
            iv,
        }
    }
}

/// Encrypts `plaintext` to `recipient` with a fresh ephemeral key
pub fn seal(recipient: &EcPublicKey, plaintext: &[u8], options: Sealed<'_>) -> JweMessage {
    let ephemeral = random_key(recipient.curve());
    seal_with_ephemeral(recipient, &ephemeral, plaintext, options)
}

/// Encrypts `plaintext` to `recipient` with the given ephemeral key
pub fn seal_with_ephemeral(
    recipient: &EcPublicKey,
    ephemeral: &EcPrivateKey,
    plaintext: &[u8],
    options: Sealed<'_>,
) -> JweMessage {
    let mut header = JweHeader::new("ECDH-ES", options.enc.name());
    header.epk = Some(Jwk::from_public_key(&ephemeral.public_key()));
    header.apu = options.apu.map(|v| URL_SAFE_NO_PAD.encode(v));
    header.apv = options.apv.map(|v| URL_SAFE_NO_PAD.encode(v));
    let protected = header.encode().unwrap();

    let z = ecdh(ephemeral, recipient).unwrap();
    let cek = concat_kdf(
        KdfDigest::Sha256,
        z.expose(),
        options.enc.name(),
        options.apu,
        options.apv,
        options.enc.key_bits(),
    )
    .unwrap();

    let nonce = Nonce::from_slice(&options.iv);
    let mut buffer = plaintext.to_vec();
    let tag = match options.enc {
        ContentEncryptionAlgorithm::A128Gcm => Aes128Gcm::new_from_slice(cek.expose())
            .unwrap()
            .encrypt_in_place_detached(nonce, protected.as_bytes(), &mut buffer),
        ContentEncryptionAlgorithm::A192Gcm => Aes192Gcm::new_from_slice(cek.expose())
            .unwrap()
            .encrypt_in_place_detached(nonce, protected.as_bytes(), &mut buffer),
        ContentEncryptionAlgorithm::A256Gcm => Aes256Gcm::new_from_slice(cek.expose())
            .unwrap()
            .encrypt_in_place_detached(nonce, protected.as_bytes(), &mut buffer),
    }
    .unwrap();

    JweMessage::new(
        protected,
        header,
        Vec::new(),
        options.iv.to_vec(),
        buffer,
        tag.to_vec(),
    )
}

/// Rebuilds `message` with some parts replaced
pub fn rebuild(
    message: &JweMessage,
    protected: Option<String>,
    encrypted_key: Option<Vec<u8>>,
    iv: Option<Vec<u8>>,
    ciphertext: Option<Vec<u8>>,
    tag: Option<Vec<u8>>,
) -> JweMessage {
    JweMessage::new(
        protected.unwrap_or_else(|| String::from_utf8(message.aad().to_vec()).unwrap()),
        message.header().clone(),
        encrypted_key.unwrap_or_else(|| message.encrypted_key().to_vec()),
        iv.unwrap_or_else(|| message.iv().to_vec()),
        ciphertext.unwrap_or_else(|| message.ciphertext().to_vec()),
        tag.unwrap_or_else(|| message.tag().to_vec()),
    )
}

/// Installs a tracing subscriber once; honors RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
