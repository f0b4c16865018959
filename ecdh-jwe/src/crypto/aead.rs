//! AES-GCM content decryption
//!
//! The tag is checked by `aes-gcm` in constant time before the keystream is
//! applied; the working buffer is zeroizing so a rejected message leaves no
//! plaintext behind.

use crate::error::DecryptionError;
use crate::registry::ContentEncryptionAlgorithm;
use crate::secret::SecretBytes;
use aes_gcm::aead::consts::U12;
use aes_gcm::{AeadInPlace, Aes128Gcm, Aes256Gcm, AesGcm, KeyInit, Nonce, Tag};
use zeroize::Zeroizing;

/// AES-192 in GCM mode with a 96-bit nonce
type Aes192Gcm = AesGcm<aes::Aes192, U12>;

/// Authenticated decryption of JWE content.
///
/// Implemented by [`AesGcmDecryption`] and by any function or closure with
/// the same shape.
pub trait ContentDecryption: Send + Sync {
    /// Verifies `tag` over `aad` and `ciphertext`, then returns the plaintext
    fn decrypt(
        &self,
        algorithm: ContentEncryptionAlgorithm,
        cek: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, DecryptionError>;
}

impl<F> ContentDecryption for F
where
    F: Fn(
            ContentEncryptionAlgorithm,
            &SecretBytes,
            &[u8],
            &[u8],
            &[u8],
            &[u8],
        ) -> Result<Vec<u8>, DecryptionError>
        + Send
        + Sync,
{
    fn decrypt(
        &self,
        algorithm: ContentEncryptionAlgorithm,
        cek: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, DecryptionError> {
        self(algorithm, cek, iv, aad, ciphertext, tag)
    }
}

/// AES-GCM per RFC 7518 Section 5.3
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmDecryption;

impl ContentDecryption for AesGcmDecryption {
    fn decrypt(
        &self,
        algorithm: ContentEncryptionAlgorithm,
        cek: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, DecryptionError> {
        check_parameter_lengths(algorithm, iv, tag)?;
        check_length("content encryption key", algorithm.key_bits() / 8, cek.len())?;

        let nonce = Nonce::from_slice(iv);
        let tag = Tag::from_slice(tag);
        let mut buffer = Zeroizing::new(ciphertext.to_vec());

        // Key lengths were checked above, so new_from_slice cannot fail here
        let verified = match algorithm {
            ContentEncryptionAlgorithm::A128Gcm => Aes128Gcm::new_from_slice(cek.expose())
                .map_err(|_| DecryptionError::AuthenticationFailed)?
                .decrypt_in_place_detached(nonce, aad, buffer.as_mut_slice(), tag),
            ContentEncryptionAlgorithm::A192Gcm => Aes192Gcm::new_from_slice(cek.expose())
                .map_err(|_| DecryptionError::AuthenticationFailed)?
                .decrypt_in_place_detached(nonce, aad, buffer.as_mut_slice(), tag),
            ContentEncryptionAlgorithm::A256Gcm => Aes256Gcm::new_from_slice(cek.expose())
                .map_err(|_| DecryptionError::AuthenticationFailed)?
                .decrypt_in_place_detached(nonce, aad, buffer.as_mut_slice(), tag),
        };
        verified.map_err(|_| DecryptionError::AuthenticationFailed)?;

        Ok(std::mem::take(&mut *buffer))
    }
}

/// Rejects IVs and tags whose size differs from what `algorithm` fixes
pub fn check_parameter_lengths(
    algorithm: ContentEncryptionAlgorithm,
    iv: &[u8],
    tag: &[u8],
) -> Result<(), DecryptionError> {
    check_length("initialization vector", algorithm.iv_len(), iv.len())?;
    check_length("authentication tag", algorithm.tag_len(), tag.len())
}

fn check_length(
    parameter: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), DecryptionError> {
    if expected != actual {
        return Err(DecryptionError::InvalidParameterLength {
            parameter,
            expected,
            actual,
        });
    }
    Ok(())
}
