#![allow(dead_code)]

use std::sync::OnceLock;

use ecdsa::signature::hazmat::PrehashVerifier;
use rsa::signature::Verifier;
use sctkit::key::KeyPair;
use sha2::{Digest, Sha256};

/// The fields of a serialized SCT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSct {
    pub version: u8,
    pub key_id: [u8; 32],
    pub timestamp: u64,
    /// Extension records, without the block length.
    pub extensions: Vec<u8>,
    pub hash_algorithm: u8,
    pub signature_algorithm: u8,
    pub signature: Vec<u8>,
}

/// Splits an SCT into its fields, checking that every length prefix
/// matches the data that follows it.
pub fn parse_sct(bytes: &[u8]) -> ParsedSct {
    let version = bytes[0];
    let key_id: [u8; 32] = bytes[1..33].try_into().unwrap();
    let timestamp = u64::from_be_bytes(bytes[33..41].try_into().unwrap());
    let extensions_len = u16::from_be_bytes([bytes[41], bytes[42]]) as usize;
    let extensions = bytes[43..43 + extensions_len].to_vec();
    let rest = &bytes[43 + extensions_len..];
    let signature_len = u16::from_be_bytes([rest[2], rest[3]]) as usize;
    assert_eq!(rest.len(), 4 + signature_len, "trailing or missing bytes");
    ParsedSct {
        version,
        key_id,
        timestamp,
        extensions,
        hash_algorithm: rest[0],
        signature_algorithm: rest[1],
        signature: rest[4..].to_vec(),
    }
}

/// A 1024-bit RSA key shared by the tests of one binary.
pub fn rsa_key() -> KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| KeyPair::generate_rsa(1024).unwrap())
        .clone()
}

/// Verifies a signature over SHA-256 of `message`.
pub fn verify(key: &KeyPair, message: &[u8], signature: &[u8]) -> bool {
    match key {
        KeyPair::Rsa { public, .. } => {
            let verifying_key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public.clone());
            rsa::pkcs1v15::Signature::try_from(signature)
                .is_ok_and(|signature| verifying_key.verify(message, &signature).is_ok())
        }
        KeyPair::EcdsaP256 { verifying_key, .. } => p256::ecdsa::Signature::from_der(signature)
            .is_ok_and(|signature| {
                verifying_key
                    .verify_prehash(&Sha256::digest(message), &signature)
                    .is_ok()
            }),
        KeyPair::EcdsaP384 { verifying_key, .. } => p384::ecdsa::Signature::from_der(signature)
            .is_ok_and(|signature| {
                verifying_key
                    .verify_prehash(&Sha256::digest(message), &signature)
                    .is_ok()
            }),
        KeyPair::Ed25519 { .. } => false,
    }
}
