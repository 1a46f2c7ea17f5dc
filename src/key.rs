use std::fmt;

use const_oid::db::{rfc5912, rfc8410};
use ed25519_dalek::{SigningKey as Ed25519SigningKey, VerifyingKey as Ed25519VerifyingKey};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePublicKey, PrivateKeyInfo};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha512};

use crate::error::{Result, SctError};

/// The family a key belongs to.
///
/// SCTs can only be signed by elliptic-curve or RSA keys. Ed25519 keys are
/// still usable for issuing test certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    EllipticCurve,
    Rsa,
    Ed25519,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::EllipticCurve => f.write_str("ECC"),
            KeyKind::Rsa => f.write_str("RSA"),
            KeyKind::Ed25519 => f.write_str("Ed25519"),
        }
    }
}

/// Hash algorithms a key can be asked to sign with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
}

impl HashAlgorithm {
    /// The `HashAlgorithm` code from RFC 5246 section 7.4.1.4.1.
    pub fn tls_code(self) -> u8 {
        match self {
            HashAlgorithm::Sha256 => 4,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// Access to the public half of a key.
pub trait PublicKeyInfo {
    /// Returns the family of the key.
    fn kind(&self) -> KeyKind;

    /// Returns the DER-encoded `SubjectPublicKeyInfo` of the key.
    fn subject_public_key_info_der(&self) -> Result<Vec<u8>>;
}

/// A key that can produce signatures.
///
/// Implementations perform the hashing themselves: `sign` receives the
/// complete message and must hash it with `hash` before signing. The
/// returned bytes are the plain signature encoding for the key type
/// (ASN.1 DER for ECDSA, the raw PKCS#1 v1.5 block for RSA). Services that
/// report signatures as text go through
/// [`HexBitStringKey`](crate::sct::HexBitStringKey).
pub trait KeyHandle: PublicKeyInfo {
    fn sign(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>>;
}

impl<T: PublicKeyInfo + ?Sized> PublicKeyInfo for &T {
    fn kind(&self) -> KeyKind {
        (**self).kind()
    }

    fn subject_public_key_info_der(&self) -> Result<Vec<u8>> {
        (**self).subject_public_key_info_der()
    }
}

impl<T: KeyHandle + ?Sized> KeyHandle for &T {
    fn sign(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
        (**self).sign(message, hash)
    }
}

/// Supported key types for certificate and SCT operations.
#[derive(Clone)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
    Ed25519 {
        signing_key: Ed25519SigningKey,
    },
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        Ok(Self::from_rsa(private))
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P256SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P384SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key: Ed25519SigningKey = Ed25519SigningKey::generate(&mut rng);
        KeyPair::Ed25519 { signing_key }
    }

    /// Derive a P-256 key pair from a seed.
    ///
    /// The same seed always yields the same key, which keeps test fixtures
    /// and their key ids stable across runs.
    pub fn derive_ecdsa_p256(seed: &[u8]) -> Result<Self> {
        let scalar = Sha512::digest(seed);
        let signing_key = P256SigningKey::from_slice(&scalar[..32])
            .map_err(|e| SctError::KeyError(e.to_string()))?;
        let verifying_key = signing_key.verifying_key().to_owned();
        Ok(KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        })
    }

    /// Derive a P-384 key pair from a seed.
    pub fn derive_ecdsa_p384(seed: &[u8]) -> Result<Self> {
        let scalar = Sha512::digest(seed);
        let signing_key = P384SigningKey::from_slice(&scalar[..48])
            .map_err(|e| SctError::KeyError(e.to_string()))?;
        let verifying_key = signing_key.verifying_key().to_owned();
        Ok(KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        })
    }

    /// Derive an Ed25519 key pair from a seed.
    pub fn derive_ed25519(seed: &[u8]) -> Self {
        let digest = Sha512::digest(seed);
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&digest[..32]);
        KeyPair::Ed25519 {
            signing_key: Ed25519SigningKey::from_bytes(&secret),
        }
    }

    /// Derive an RSA key pair of `bits` bits from `seed`.
    ///
    /// The primes are drawn from ChaCha20 keyed with SHA-256 of `seed`.
    pub fn derive_rsa(seed: &[u8], bits: usize) -> Result<Self> {
        let mut rng = ChaCha20Rng::from_seed(Sha256::digest(seed).into());
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        Ok(Self::from_rsa(private))
    }

    fn from_rsa(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        KeyPair::Rsa {
            private: Box::new(private),
            public,
        }
    }

    /// Import a key pair from a DER-encoded PKCS#8 `PrivateKeyInfo`.
    ///
    /// The key type is taken from the algorithm identifier.
    pub fn import_from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)?;
        match info.algorithm.oid {
            rfc5912::RSA_ENCRYPTION => Ok(Self::from_rsa(RsaPrivateKey::from_pkcs8_der(der)?)),
            rfc5912::ID_EC_PUBLIC_KEY => match info.algorithm.parameters_oid()? {
                rfc5912::SECP_256_R_1 => {
                    let signing_key = P256SigningKey::from_pkcs8_der(der)?;
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP256 {
                        signing_key,
                        verifying_key,
                    })
                }
                rfc5912::SECP_384_R_1 => {
                    let signing_key = P384SigningKey::from_pkcs8_der(der)?;
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP384 {
                        signing_key,
                        verifying_key,
                    })
                }
                curve => Err(SctError::UnsupportedKeyType(format!("EC curve {curve}"))),
            },
            rfc8410::ID_ED_25519 => Ok(KeyPair::Ed25519 {
                signing_key: Ed25519SigningKey::from_pkcs8_der(der)?,
            }),
            oid => Err(SctError::UnsupportedKeyType(format!("algorithm {oid}"))),
        }
    }

    /// Import a key pair from a PEM-encoded PKCS#8 private key.
    pub fn import_from_pkcs8_pem(pem: &str) -> Result<Self> {
        let der = crate::pem_utils::pem_to_der(pem)?;
        Self::import_from_pkcs8_der(&der)
    }

    /// Returns the public half of the key pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_key_pair(self)
    }
}

impl PublicKeyInfo for KeyPair {
    fn kind(&self) -> KeyKind {
        match self {
            KeyPair::Rsa { .. } => KeyKind::Rsa,
            KeyPair::EcdsaP256 { .. } | KeyPair::EcdsaP384 { .. } => KeyKind::EllipticCurve,
            KeyPair::Ed25519 { .. } => KeyKind::Ed25519,
        }
    }

    fn subject_public_key_info_der(&self) -> Result<Vec<u8>> {
        self.public_key().subject_public_key_info_der()
    }
}

impl KeyHandle for KeyPair {
    fn sign(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
        crate::pki::sign_data(message, self, hash)
    }
}

/// The public half of a [`KeyPair`].
#[derive(Clone, Debug, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
    Ed25519(Ed25519VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
            KeyPair::Ed25519 { signing_key } => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }
}

impl PublicKeyInfo for PublicKey {
    fn kind(&self) -> KeyKind {
        match self {
            PublicKey::Rsa(_) => KeyKind::Rsa,
            PublicKey::EcdsaP256(_) | PublicKey::EcdsaP384(_) => KeyKind::EllipticCurve,
            PublicKey::Ed25519(_) => KeyKind::Ed25519,
        }
    }

    fn subject_public_key_info_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            PublicKey::Rsa(public) => public.to_public_key_der()?,
            PublicKey::EcdsaP256(verifying_key) => verifying_key.to_public_key_der()?,
            PublicKey::EcdsaP384(verifying_key) => verifying_key.to_public_key_der()?,
            PublicKey::Ed25519(verifying_key) => verifying_key.to_public_key_der()?,
        };
        Ok(document.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_keys_are_stable() {
        let a = KeyPair::derive_ecdsa_p256(b"secp256r1").unwrap();
        let b = KeyPair::derive_ecdsa_p256(b"secp256r1").unwrap();
        let c = KeyPair::derive_ecdsa_p256(b"secp256r1:alternate").unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());
    }

    #[test]
    fn derived_rsa_keys_are_stable() {
        let a = KeyPair::derive_rsa(b"rsa1024", 1024).unwrap();
        let b = KeyPair::derive_rsa(b"rsa1024", 1024).unwrap();
        assert_eq!(a.kind(), KeyKind::Rsa);
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(
            a.public_key(),
            KeyPair::derive_rsa(b"rsa1024:other", 1024).unwrap().public_key()
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(KeyPair::generate_ecdsa_p256().kind(), KeyKind::EllipticCurve);
        assert_eq!(
            KeyPair::derive_ecdsa_p384(b"p384").unwrap().kind(),
            KeyKind::EllipticCurve
        );
        assert_eq!(KeyPair::derive_ed25519(b"ed").kind(), KeyKind::Ed25519);
        assert!(matches!(KeyPair::generate_ecdsa_p384(), KeyPair::EcdsaP384 { .. }));
        assert_eq!(KeyPair::generate_ed25519().public_key().kind(), KeyKind::Ed25519);
    }

    #[test]
    fn spki_der_starts_with_sequence() {
        let key = KeyPair::derive_ecdsa_p256(b"spki").unwrap();
        let der = key.subject_public_key_info_der().unwrap();
        assert_eq!(der[0], 0x30);
        // 91 bytes for an uncompressed P-256 point.
        assert_eq!(der.len(), 91);
    }

    #[test]
    fn pkcs8_import_detects_the_curve() {
        use pkcs8::EncodePrivateKey;

        let KeyPair::EcdsaP384 { signing_key, .. } = KeyPair::derive_ecdsa_p384(b"import").unwrap()
        else {
            panic!("expected a P-384 key");
        };
        let der = signing_key.to_pkcs8_der().unwrap();
        let imported = KeyPair::import_from_pkcs8_der(der.as_bytes()).unwrap();
        assert!(matches!(imported, KeyPair::EcdsaP384 { .. }));
    }
}
