//! End-to-end tests for ECDH-ES direct decryption

mod common;

use assert_matches::assert_matches;
use common::{rebuild, seal, Sealed};
use ecdh_jwe::{
    AlgorithmRegistry, ContentEncryptionAlgorithm, Curve, DecryptionError, DecryptorConfig,
    EcdhDirectDecryptor, Error, JweMessage, KeyAgreementError, OrchestratorError,
};
use std::sync::Arc;
use std::thread;

const PLAINTEXT: &[u8] = b"Transaction authorized: 100.00 USDC to the beneficiary";

fn flip_bit(bytes: &[u8], bit: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out[bit / 8] ^= 1 << (bit % 8);
    out
}

#[test]
fn test_round_trip_all_curves_and_algorithms() {
    common::init_tracing();
    let decryptor = EcdhDirectDecryptor::standard();

    for curve in [Curve::P256, Curve::P384, Curve::P521, Curve::Secp256k1] {
        for enc in [
            ContentEncryptionAlgorithm::A128Gcm,
            ContentEncryptionAlgorithm::A192Gcm,
            ContentEncryptionAlgorithm::A256Gcm,
        ] {
            let recipient = common::random_key(curve);
            let message = seal(
                &recipient.public_key(),
                PLAINTEXT,
                Sealed {
                    enc,
                    ..Default::default()
                },
            );

            let plaintext = decryptor
                .decrypt_compact(&recipient, &message.to_compact())
                .unwrap_or_else(|e| panic!("{} / {}: {}", curve, enc, e));
            assert_eq!(plaintext, PLAINTEXT);
        }
    }
}

#[test]
fn test_round_trip_with_party_info() {
    let recipient = common::random_key(Curve::P256);
    let message = seal(
        &recipient.public_key(),
        PLAINTEXT,
        Sealed {
            apu: Some(b"Alice"),
            apv: Some(b"Bob"),
            ..Default::default()
        },
    );

    let plaintext = EcdhDirectDecryptor::standard()
        .decrypt(&recipient, &message)
        .unwrap();
    assert_eq!(plaintext, PLAINTEXT);
}

#[test]
fn test_empty_plaintext() {
    let recipient = common::random_key(Curve::P384);
    let message = seal(&recipient.public_key(), b"", Sealed::default());
    let plaintext = EcdhDirectDecryptor::standard()
        .decrypt(&recipient, &message)
        .unwrap();
    assert!(plaintext.is_empty());
}

#[test]
fn test_wrong_recipient_fails_authentication() {
    let recipient = common::random_key(Curve::P256);
    let someone_else = common::random_key(Curve::P256);
    let message = seal(&recipient.public_key(), PLAINTEXT, Sealed::default());

    assert_matches!(
        EcdhDirectDecryptor::standard().decrypt(&someone_else, &message),
        Err(Error::Decryption(DecryptionError::AuthenticationFailed))
    );
}

#[test]
fn test_any_flipped_bit_fails_authentication() {
    let recipient = common::random_key(Curve::P256);
    let message = seal(&recipient.public_key(), b"short message", Sealed::default());
    let decryptor = EcdhDirectDecryptor::standard();

    let expect_auth_failure = |tampered: JweMessage, what: &str| {
        assert_matches!(
            decryptor.decrypt(&recipient, &tampered),
            Err(Error::Decryption(DecryptionError::AuthenticationFailed)),
            "tampered {}",
            what
        );
    };

    for bit in 0..message.ciphertext().len() * 8 {
        let ciphertext = flip_bit(message.ciphertext(), bit);
        expect_auth_failure(
            rebuild(&message, None, None, None, Some(ciphertext), None),
            "ciphertext",
        );
    }
    for bit in 0..message.tag().len() * 8 {
        let tag = flip_bit(message.tag(), bit);
        expect_auth_failure(rebuild(&message, None, None, None, None, Some(tag)), "tag");
    }
    for bit in 0..message.iv().len() * 8 {
        let iv = flip_bit(message.iv(), bit);
        expect_auth_failure(rebuild(&message, None, None, Some(iv), None, None), "iv");
    }
    // Low seven bits of each character keep the protected segment ASCII
    for bit in (0..message.aad().len() * 8).filter(|b| b % 8 != 7) {
        let aad = String::from_utf8(flip_bit(message.aad(), bit)).unwrap();
        expect_auth_failure(rebuild(&message, Some(aad), None, None, None, None), "aad");
    }
}

#[test]
fn test_encrypted_key_in_direct_mode() {
    let recipient = common::random_key(Curve::P256);
    let message = seal(&recipient.public_key(), PLAINTEXT, Sealed::default());
    let wrapped = rebuild(&message, None, Some(vec![0u8; 40]), None, None, None);

    assert_matches!(
        EcdhDirectDecryptor::standard().decrypt(&recipient, &wrapped),
        Err(Error::Orchestrator(OrchestratorError::UnexpectedEncryptedKey(40)))
    );
}

#[test]
fn test_truncated_tag() {
    let recipient = common::random_key(Curve::P256);
    let message = seal(&recipient.public_key(), PLAINTEXT, Sealed::default());
    let tag = message.tag()[..15].to_vec();

    assert_matches!(
        EcdhDirectDecryptor::standard()
            .decrypt(&recipient, &rebuild(&message, None, None, None, None, Some(tag))),
        Err(Error::Decryption(DecryptionError::InvalidParameterLength {
            parameter: "authentication tag",
            expected: 16,
            actual: 15,
        }))
    );
}

#[test]
fn test_short_iv() {
    let recipient = common::random_key(Curve::P256);
    let message = seal(&recipient.public_key(), PLAINTEXT, Sealed::default());
    let iv = message.iv()[..8].to_vec();

    assert_matches!(
        EcdhDirectDecryptor::standard()
            .decrypt(&recipient, &rebuild(&message, None, None, Some(iv), None, None)),
        Err(Error::Decryption(DecryptionError::InvalidParameterLength {
            parameter: "initialization vector",
            ..
        }))
    );
}

#[test]
fn test_peer_key_on_other_curve() {
    let recipient = common::random_key(Curve::P256);
    let p384_recipient = common::random_key(Curve::P384);
    let message = seal(&p384_recipient.public_key(), PLAINTEXT, Sealed::default());

    assert_matches!(
        EcdhDirectDecryptor::standard().decrypt(&recipient, &message),
        Err(Error::KeyAgreement(KeyAgreementError::CurveMismatch {
            private: Curve::P256,
            peer: Curve::P384,
        }))
    );
}

#[test]
fn test_restricted_registry_rejects_curve() {
    let registry = AlgorithmRegistry::builder().curves(&[Curve::P384]).build();
    let decryptor = EcdhDirectDecryptor::new(
        &registry,
        DecryptorConfig::default(),
        ecdh_jwe::EcdhKeyAgreement,
        ecdh_jwe::AesGcmDecryption,
    );
    let recipient = common::random_key(Curve::P256);
    let message = seal(&recipient.public_key(), PLAINTEXT, Sealed::default());

    assert_matches!(
        decryptor.decrypt(&recipient, &message),
        Err(Error::Orchestrator(OrchestratorError::MalformedHeader(_)))
    );
}

#[test]
fn test_malformed_compact() {
    let recipient = common::random_key(Curve::P256);
    assert_matches!(
        EcdhDirectDecryptor::standard().decrypt_compact(&recipient, "only.three.parts"),
        Err(Error::Orchestrator(OrchestratorError::MalformedHeader(_)))
    );
}

#[test]
fn test_concurrent_decryption() {
    let decryptor = Arc::new(EcdhDirectDecryptor::standard());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let decryptor = Arc::clone(&decryptor);
            thread::spawn(move || {
                let recipient = common::random_key(Curve::P256);
                let plaintext = format!("message {}", i).into_bytes();
                let message = seal(&recipient.public_key(), &plaintext, Sealed::default());
                assert_eq!(decryptor.decrypt(&recipient, &message).unwrap(), plaintext);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
