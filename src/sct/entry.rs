use std::fmt;

use byteorder::{BigEndian, WriteBytesExt};

use super::public_key_hash;
use crate::codec::WriteLengthPrefixedBytesExt;
use crate::error::{Result, SctError};
use crate::key::{KeyKind, PublicKey, PublicKeyInfo};

/// The `LogEntryType` of RFC 6962 section 3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryType {
    X509 = 0,
    Precert = 1,
}

impl EntryType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::X509 => f.write_str("x509_entry"),
            EntryType::Precert => f.write_str("precert_entry"),
        }
    }
}

impl TryFrom<u16> for EntryType {
    type Error = SctError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(EntryType::X509),
            1 => Ok(EntryType::Precert),
            other => Err(SctError::UnsupportedEntryType(format!("entry type {other}"))),
        }
    }
}

/// The entry an SCT is issued for.
#[derive(Debug, Clone, PartialEq)]
pub enum SignedEntry {
    /// A DER-encoded certificate.
    X509 { certificate: Vec<u8> },
    /// A DER-encoded TBSCertificate and the key of the certificate's issuer.
    Precert {
        tbs_certificate: Vec<u8>,
        issuer_key: PublicKey,
    },
}

/// The type tag and payload of a [`SignedEntry`], ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEntry {
    pub entry_type: EntryType,
    pub payload: Vec<u8>,
}

impl SignedEntry {
    pub fn entry_type(&self) -> EntryType {
        match self {
            SignedEntry::X509 { .. } => EntryType::X509,
            SignedEntry::Precert { .. } => EntryType::Precert,
        }
    }

    /// Encodes the entry payload.
    ///
    /// An X509 entry becomes `u24 length ‖ certificate`. A precert entry
    /// becomes `SHA-256(issuer SPKI) ‖ u24 length ‖ tbs_certificate`.
    pub fn encode(&self) -> Result<EncodedEntry> {
        let mut payload = Vec::new();
        match self {
            SignedEntry::X509 { certificate } => {
                payload.write_length_prefixed("certificate", certificate, 3)?;
            }
            SignedEntry::Precert {
                tbs_certificate,
                issuer_key,
            } => {
                payload.extend_from_slice(&issuer_key_hash(issuer_key)?);
                payload.write_length_prefixed("tbs_certificate", tbs_certificate, 3)?;
            }
        }
        let entry_type = self.entry_type();
        tracing::debug!(%entry_type, payload_len = payload.len(), "encoded signed entry");
        Ok(EncodedEntry {
            entry_type,
            payload,
        })
    }
}

impl EncodedEntry {
    /// Writes the two-byte entry type followed by the payload.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        out.write_u16::<BigEndian>(u16::from(self.entry_type.tag()))?;
        out.extend_from_slice(&self.payload);
        Ok(())
    }
}

/// SHA-256 of the DER `SubjectPublicKeyInfo` of an issuer key.
pub fn issuer_key_hash(issuer_key: &impl PublicKeyInfo) -> Result<[u8; 32]> {
    match issuer_key.kind() {
        KeyKind::EllipticCurve | KeyKind::Rsa => public_key_hash(issuer_key),
        kind @ KeyKind::Ed25519 => Err(SctError::UnsupportedKeyType(format!(
            "issuer key of type {kind}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;
    use sha2::{Digest, Sha256};

    #[test]
    fn x509_payload_is_length_prefixed() {
        let entry = SignedEntry::X509 {
            certificate: vec![0x5a; 500],
        };
        let encoded = entry.encode().unwrap();
        assert_eq!(encoded.entry_type.tag(), 0);
        assert_eq!(&encoded.payload[..3], &[0x00, 0x01, 0xf4]);
        assert_eq!(encoded.payload.len(), 503);
    }

    #[test]
    fn precert_payload_starts_with_issuer_key_hash() {
        let issuer = KeyPair::derive_ecdsa_p256(b"issuer").unwrap().public_key();
        let spki = issuer.subject_public_key_info_der().unwrap();
        let entry = SignedEntry::Precert {
            tbs_certificate: vec![1, 2, 3],
            issuer_key: issuer,
        };
        let encoded = entry.encode().unwrap();
        assert_eq!(encoded.entry_type.tag(), 1);
        assert_eq!(&encoded.payload[..32], Sha256::digest(&spki).as_slice());
        assert_eq!(&encoded.payload[32..], &[0, 0, 3, 1, 2, 3]);
    }

    #[test]
    fn oversized_certificates_overflow() {
        let entry = SignedEntry::X509 {
            certificate: vec![0; 1 << 24],
        };
        assert!(matches!(
            entry.encode(),
            Err(SctError::EncodingOverflow {
                field: "certificate",
                ..
            })
        ));
    }

    #[test]
    fn oversized_tbs_certificates_overflow() {
        let entry = SignedEntry::Precert {
            tbs_certificate: vec![0; 1 << 24],
            issuer_key: KeyPair::derive_ecdsa_p256(b"issuer").unwrap().public_key(),
        };
        assert_eq!(
            entry.encode().unwrap_err(),
            SctError::EncodingOverflow {
                field: "tbs_certificate",
                length: 1 << 24,
                max: (1 << 24) - 1,
            }
        );
    }

    #[test]
    fn ed25519_issuers_are_rejected() {
        let entry = SignedEntry::Precert {
            tbs_certificate: vec![],
            issuer_key: KeyPair::derive_ed25519(b"issuer").public_key(),
        };
        assert!(matches!(
            entry.encode(),
            Err(SctError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn unknown_entry_type_tags() {
        assert_eq!(EntryType::try_from(1u16).unwrap(), EntryType::Precert);
        assert_eq!(
            EntryType::try_from(2u16).unwrap_err(),
            SctError::UnsupportedEntryType("entry type 2".to_string())
        );
    }
}
