//! ECDH-ES Key Derivation Function (Concat KDF)
//!
//! Implements the Concat KDF per NIST SP 800-56A and RFC 7518 Section 4.6.
//! In direct key agreement mode the derived key is the content encryption
//! key itself, so the algorithm identifier is the `enc` header value.

use crate::error::KdfError;
use crate::registry::KdfDigest;
use crate::secret::SecretBytes;
use sha2::{Digest, Sha256, Sha384, Sha512};
use zeroize::Zeroize;

/// Derive a key using Concat KDF (NIST SP 800-56A)
///
/// Dispatches to [`concat_kdf_with`] for the registry's digest.
///
/// # Arguments
/// * `digest` - Hash function for each round
/// * `shared_secret` - The raw ECDH shared secret (Z value)
/// * `algorithm_id` - JWA algorithm name bound into the derivation
/// * `apu` - Agreement PartyUInfo, `None` when the header has no `apu`
/// * `apv` - Agreement PartyVInfo, `None` when the header has no `apv`
/// * `key_len_bits` - Desired output length in bits (positive multiple of 8)
pub fn concat_kdf(
    digest: KdfDigest,
    shared_secret: &[u8],
    algorithm_id: &str,
    apu: Option<&[u8]>,
    apv: Option<&[u8]>,
    key_len_bits: usize,
) -> Result<SecretBytes, KdfError> {
    match digest {
        KdfDigest::Sha256 => {
            concat_kdf_with::<Sha256>(shared_secret, algorithm_id, apu, apv, key_len_bits)
        }
        KdfDigest::Sha384 => {
            concat_kdf_with::<Sha384>(shared_secret, algorithm_id, apu, apv, key_len_bits)
        }
        KdfDigest::Sha512 => {
            concat_kdf_with::<Sha512>(shared_secret, algorithm_id, apu, apv, key_len_bits)
        }
    }
}

/// Concat KDF over an arbitrary digest
///
/// # Algorithm
/// The OtherInfo structure per RFC 7518 Section 4.6.2:
/// - AlgorithmID: length (4 bytes) || algorithm_id
/// - PartyUInfo: length (4 bytes) || apu
/// - PartyVInfo: length (4 bytes) || apv
/// - SuppPubInfo: keydatalen in bits (4 bytes, big-endian)
///
/// DerivedKey = Hash(counter || Z || OtherInfo) for each round, concatenated
/// and cut to `key_len_bits` at the tail.
pub fn concat_kdf_with<D: Digest>(
    shared_secret: &[u8],
    algorithm_id: &str,
    apu: Option<&[u8]>,
    apv: Option<&[u8]>,
    key_len_bits: usize,
) -> Result<SecretBytes, KdfError> {
    if key_len_bits == 0 || key_len_bits % 8 != 0 {
        return Err(KdfError::UnsupportedKeyLength(key_len_bits));
    }
    let supp_pub_info = u32::try_from(key_len_bits)
        .map_err(|_| KdfError::UnsupportedKeyLength(key_len_bits))?
        .to_be_bytes();

    let other_info = other_info(algorithm_id.as_bytes(), apu, apv, supp_pub_info)?;

    let key_len_bytes = key_len_bits / 8;
    let hash_len = <D as Digest>::output_size();
    let reps = (key_len_bytes + hash_len - 1) / hash_len;

    let mut derived = SecretBytes::with_capacity(reps * hash_len);

    for counter in 1..=reps {
        let mut hasher = D::new();
        // reps <= key_len_bits, which already fits in u32
        hasher.update((counter as u32).to_be_bytes());
        hasher.update(shared_secret);
        hasher.update(&other_info);

        let mut block = hasher.finalize();
        derived.extend_from_slice(&block);
        block.as_mut_slice().zeroize();
    }

    derived.truncate(key_len_bytes);
    Ok(derived)
}

/// Builds OtherInfo. An absent field is encoded exactly like an empty one.
fn other_info(
    algorithm_id: &[u8],
    apu: Option<&[u8]>,
    apv: Option<&[u8]>,
    supp_pub_info: [u8; 4],
) -> Result<Vec<u8>, KdfError> {
    let apu = apu.unwrap_or_default();
    let apv = apv.unwrap_or_default();

    let mut other_info =
        Vec::with_capacity(16 + algorithm_id.len() + apu.len() + apv.len());

    other_info.extend_from_slice(&length_prefix(algorithm_id, "AlgorithmID")?);
    other_info.extend_from_slice(algorithm_id);

    other_info.extend_from_slice(&length_prefix(apu, "PartyUInfo")?);
    other_info.extend_from_slice(apu);

    other_info.extend_from_slice(&length_prefix(apv, "PartyVInfo")?);
    other_info.extend_from_slice(apv);

    other_info.extend_from_slice(&supp_pub_info);
    Ok(other_info)
}

fn length_prefix(field: &[u8], name: &'static str) -> Result<[u8; 4], KdfError> {
    u32::try_from(field.len())
        .map(u32::to_be_bytes)
        .map_err(|_| KdfError::ContextTooLarge(name))
}
