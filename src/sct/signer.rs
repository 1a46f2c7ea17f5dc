use crate::error::{Result, SctError};
use crate::key::{HashAlgorithm, KeyHandle, KeyKind, PublicKeyInfo};

/// The largest signature a `u16` length prefix can carry.
pub const MAX_SIGNATURE_LENGTH: usize = 0xffff;

/// The `SignatureAlgorithm` code from RFC 5246 section 7.4.1.4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureAlgorithm {
    Rsa = 1,
    Ecdsa = 3,
}

impl SignatureAlgorithm {
    /// Selects the algorithm for a signing key.
    pub fn for_key_kind(kind: KeyKind) -> Result<Self> {
        match kind {
            KeyKind::EllipticCurve => Ok(SignatureAlgorithm::Ecdsa),
            KeyKind::Rsa => Ok(SignatureAlgorithm::Rsa),
            KeyKind::Ed25519 => Err(SctError::UnsupportedKeyType(format!(
                "signing key of type {kind}"
            ))),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A signature together with the algorithms that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitallySigned {
    pub hash_algorithm: HashAlgorithm,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature: Vec<u8>,
}

/// Signs `signing_input` with SHA-256.
///
/// The key provider hashes the input itself.
pub fn sign<K: KeyHandle + ?Sized>(key: &K, signing_input: &[u8]) -> Result<DigitallySigned> {
    let signature_algorithm = SignatureAlgorithm::for_key_kind(key.kind())?;
    let hash_algorithm = HashAlgorithm::Sha256;
    let signature = key
        .sign(signing_input, hash_algorithm)
        .map_err(|err| match err {
            SctError::SigningFailure(_) => err,
            other => SctError::SigningFailure(other.to_string()),
        })?;
    if signature.is_empty() {
        return Err(SctError::SigningFailure(
            "key provider returned an empty signature".to_string(),
        ));
    }
    if signature.len() > MAX_SIGNATURE_LENGTH {
        return Err(SctError::SigningFailure(format!(
            "signature is {} bytes long",
            signature.len()
        )));
    }
    tracing::debug!(
        algorithm = ?signature_algorithm,
        signature_len = signature.len(),
        "signed SCT input"
    );
    Ok(DigitallySigned {
        hash_algorithm,
        signature_algorithm,
        signature,
    })
}

/// Normalizes an ASN.1 value-notation hex bit string (`'0A1B'H`) to bytes.
///
/// Key services that report signatures in textual form use this notation.
pub fn decode_hex_bit_string(literal: &str) -> Result<Vec<u8>> {
    let hex_digits = literal
        .trim()
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix("'H"))
        .ok_or_else(|| SctError::SigningFailure(format!("not a hex bit string: {literal}")))?;
    hex::decode(hex_digits).map_err(|err| SctError::SigningFailure(err.to_string()))
}

/// A key service that reports signatures in ASN.1 value notation.
pub trait HexBitStringSigner: PublicKeyInfo {
    /// Signs `message`, hashing it with `hash`, and returns the signature as
    /// a hex bit string such as `'3045...'H`.
    fn sign_to_hex_bit_string(&self, message: &[u8], hash: HashAlgorithm) -> Result<String>;
}

/// A [`KeyHandle`] over a [`HexBitStringSigner`] that returns plain bytes.
#[derive(Debug, Clone)]
pub struct HexBitStringKey<K>(pub K);

impl<K: HexBitStringSigner> PublicKeyInfo for HexBitStringKey<K> {
    fn kind(&self) -> KeyKind {
        self.0.kind()
    }

    fn subject_public_key_info_der(&self) -> Result<Vec<u8>> {
        self.0.subject_public_key_info_der()
    }
}

impl<K: HexBitStringSigner> KeyHandle for HexBitStringKey<K> {
    fn sign(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
        decode_hex_bit_string(&self.0.sign_to_hex_bit_string(message, hash)?)
    }
}
