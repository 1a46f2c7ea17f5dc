use ecdsa::signature::hazmat::PrehashSigner;
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::Sha256;

use crate::error::Result;
use crate::key::{HashAlgorithm, KeyPair};

/// Hashes `data` with `hash` and signs it with `key`.
///
/// ECDSA signatures are deterministic (RFC 6979) and DER-encoded. RSA keys
/// produce PKCS#1 v1.5 signatures, which are deterministic as well. Ed25519
/// signs `data` directly; the hash argument does not apply to it.
pub fn sign_data(data: &[u8], key: &KeyPair, hash: HashAlgorithm) -> Result<Vec<u8>> {
    match key {
        KeyPair::Rsa { private, .. } => match hash {
            HashAlgorithm::Sha256 => {
                let signing_key: RsaSigningKey<Sha256> = RsaSigningKey::new((**private).clone());
                let signature = signing_key.try_sign(data)?;
                Ok(signature.to_vec())
            }
        },
        KeyPair::EcdsaP256 { signing_key, .. } => {
            let prehash = hash.digest(data);
            let signature: p256::ecdsa::Signature = signing_key.sign_prehash(&prehash)?;
            Ok(signature.to_der().as_bytes().to_vec())
        }
        KeyPair::EcdsaP384 { signing_key, .. } => {
            let prehash = hash.digest(data);
            let signature: p384::ecdsa::Signature = signing_key.sign_prehash(&prehash)?;
            Ok(signature.to_der().as_bytes().to_vec())
        }
        KeyPair::Ed25519 { signing_key } => {
            let signature = signing_key.try_sign(data)?;
            Ok(signature.to_bytes().to_vec())
        }
    }
}
