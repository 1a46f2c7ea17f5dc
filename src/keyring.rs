//! Resolution of textual key specifications to key pairs.
//!
//! A key specification is either the name of a key registered in the
//! [`KeyRing`] (usually loaded from a directory of PKCS#8 files), or one of
//! the derivable names below, optionally followed by `:<label>` to get a
//! distinct key of the same kind:
//!
//! - `default`, `alternate` - RSA 2048
//! - `rsa<bits>` - RSA of 1024 to 4096 bits, e.g. `rsa2048`
//! - `secp256r1` - ECDSA P-256
//! - `secp384r1` - ECDSA P-384
//! - `ed25519` - Ed25519
//!
//! Derived keys are a pure function of the specification, so SCTs built from
//! them have stable key ids. RSA derivation is slow, so derived RSA keys are
//! kept for the life of the process.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use crate::error::{Result, SctError};
use crate::key::KeyPair;

/// A set of named key pairs.
#[derive(Clone, Debug, Default)]
pub struct KeyRing {
    keys: BTreeMap<String, KeyPair>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` under `name`, replacing any key with that name.
    pub fn with_key(mut self, name: impl Into<String>, key: KeyPair) -> Self {
        self.keys.insert(name.into(), key);
        self
    }

    /// Loads every `*.pem` and `*.key` file of `dir` as a PKCS#8 private key.
    /// The file stem becomes the key name.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut ring = Self::new();
        let entries = fs::read_dir(dir)
            .map_err(|e| SctError::ConfigError(format!("{}: {e}", dir.display())))?;
        for entry in entries {
            let path = entry
                .map_err(|e| SctError::ConfigError(format!("{}: {e}", dir.display())))?
                .path();
            let is_key_file = path
                .extension()
                .is_some_and(|ext| ext == "pem" || ext == "key");
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if !is_key_file {
                continue;
            }
            let contents = fs::read_to_string(&path)
                .map_err(|e| SctError::ConfigError(format!("{}: {e}", path.display())))?;
            let key = KeyPair::import_from_pkcs8_pem(&contents)
                .map_err(|e| SctError::KeyError(format!("{}: {e}", path.display())))?;
            tracing::debug!(name, path = %path.display(), "loaded key");
            ring.keys.insert(name.to_string(), key);
        }
        Ok(ring)
    }

    /// Returns the names of the registered keys.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Resolves a key specification.
    pub fn resolve(&self, specification: &str) -> Result<KeyPair> {
        let specification = specification.trim();
        if let Some(key) = self.keys.get(specification) {
            return Ok(key.clone());
        }
        let family = specification
            .split_once(':')
            .map_or(specification, |(family, _)| family);
        match family {
            "default" | "alternate" => derive_rsa(specification, 2048),
            _ if family.starts_with("rsa") => derive_rsa(specification, rsa_bits(family)?),
            "secp256r1" => KeyPair::derive_ecdsa_p256(specification.as_bytes()),
            "secp384r1" => KeyPair::derive_ecdsa_p384(specification.as_bytes()),
            "ed25519" => Ok(KeyPair::derive_ed25519(specification.as_bytes())),
            _ => Err(SctError::KeyError(format!(
                "unknown key specification \"{specification}\""
            ))),
        }
    }
}

const RSA_BITS: std::ops::RangeInclusive<usize> = 1024..=4096;

fn rsa_bits(family: &str) -> Result<usize> {
    family
        .strip_prefix("rsa")
        .and_then(|bits| bits.parse().ok())
        .filter(|bits| RSA_BITS.contains(bits) && bits % 8 == 0)
        .ok_or_else(|| SctError::KeyError(format!("unknown key specification \"{family}\"")))
}

fn derive_rsa(specification: &str, bits: usize) -> Result<KeyPair> {
    static DERIVED: OnceLock<Mutex<BTreeMap<String, KeyPair>>> = OnceLock::new();
    let derived = DERIVED.get_or_init(Default::default);
    if let Some(key) = derived
        .lock()
        .ok()
        .and_then(|keys| keys.get(specification).cloned())
    {
        return Ok(key);
    }
    tracing::debug!(specification, bits, "deriving RSA key");
    let key = KeyPair::derive_rsa(specification.as_bytes(), bits)?;
    if let Ok(mut keys) = derived.lock() {
        keys.insert(specification.to_string(), key.clone());
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyKind, PublicKeyInfo};

    #[test]
    fn registered_keys_take_precedence() {
        let registered = KeyPair::derive_ecdsa_p384(b"registered").unwrap();
        let ring = KeyRing::new().with_key("secp256r1", registered.clone());
        let resolved = ring.resolve("secp256r1").unwrap();
        assert_eq!(resolved.public_key(), registered.public_key());
    }

    #[test]
    fn derivable_names() {
        let ring = KeyRing::new();
        assert_eq!(ring.resolve("secp256r1").unwrap().kind(), KeyKind::EllipticCurve);
        assert_eq!(ring.resolve("secp384r1:other").unwrap().kind(), KeyKind::EllipticCurve);
        assert_eq!(ring.resolve(" ed25519 ").unwrap().kind(), KeyKind::Ed25519);
        assert_ne!(
            ring.resolve("secp256r1").unwrap().public_key(),
            ring.resolve("secp256r1:other").unwrap().public_key()
        );
    }

    #[test]
    fn rsa_names() {
        let ring = KeyRing::new();
        let key = ring.resolve("rsa1024:log").unwrap();
        assert_eq!(key.kind(), KeyKind::Rsa);
        assert_eq!(
            key.public_key(),
            KeyPair::derive_rsa(b"rsa1024:log", 1024).unwrap().public_key()
        );
        assert_eq!(ring.resolve("default").unwrap().kind(), KeyKind::Rsa);
    }

    #[test]
    fn unknown_names_are_rejected() {
        for name in ["dsa1024", "rsa", "rsa512", "rsa1025", "rsa8192", "rsafoo"] {
            let err = KeyRing::new().resolve(name).unwrap_err();
            assert!(matches!(err, SctError::KeyError(_)), "{name}");
        }
    }
}
