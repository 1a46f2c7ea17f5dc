//! Signed Certificate Timestamps (RFC 6962 section 3.2).
//!
//! A [`SigningRequest`] goes through these stages:
//!
//! 1. the [`SignedEntry`] is encoded to its type tag and payload,
//! 2. the optional leaf index becomes the extensions block,
//! 3. both are assembled with the timestamp into the signing input,
//! 4. the key signs the input with SHA-256,
//! 5. tamper mode optionally corrupts the signature,
//! 6. the result is encoded as an on-the-wire SCT.
//!
//! ```rust
//! use sctkit::key::KeyPair;
//! use sctkit::sct::{SignedEntry, SigningRequest, Timestamp, sign_and_encode};
//!
//! # fn main() -> Result<(), sctkit::error::SctError> {
//! let request = SigningRequest::builder()
//!     .key(KeyPair::derive_ecdsa_p256(b"log")?)
//!     .timestamp(Timestamp::parse_date("20200101")?)
//!     .signed_entry(SignedEntry::X509 { certificate: vec![0x30, 0x00] })
//!     .build();
//! let sct = sign_and_encode(&request)?;
//! assert_eq!(sct[0], 0);
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod extensions;
pub mod request;
pub mod signer;
pub mod signing_input;
pub mod tamper;

use byteorder::{BigEndian, WriteBytesExt};
use sha2::{Digest, Sha256};

pub use entry::{EncodedEntry, EntryType, SignedEntry};
pub use extensions::{Extension, LeafIndex};
pub use request::{SigningRequest, Timestamp};
pub use signer::{DigitallySigned, HexBitStringKey, HexBitStringSigner, SignatureAlgorithm};

use crate::codec::WriteLengthPrefixedBytesExt;
use crate::error::Result;
use crate::key::{KeyHandle, PublicKeyInfo};

/// SHA-256 of the DER `SubjectPublicKeyInfo` of `key`.
pub fn public_key_hash(key: &(impl PublicKeyInfo + ?Sized)) -> Result<[u8; 32]> {
    Ok(Sha256::digest(key.subject_public_key_info_der()?).into())
}

/// A signed SCT, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificateTimestamp {
    key_id: [u8; 32],
    timestamp: Timestamp,
    extensions: Vec<u8>,
    signed: DigitallySigned,
}

impl SignedCertificateTimestamp {
    /// Runs the signing pipeline for `request`.
    pub fn sign<K: KeyHandle>(request: &SigningRequest<K>) -> Result<Self> {
        let entry = request.signed_entry().encode()?;
        let extensions = extensions::encode_extensions(&extensions::extensions_for(
            request.leaf_index(),
        ))?;
        let input = signing_input::signing_input(request.timestamp(), &entry, &extensions)?;
        let mut signed = signer::sign(request.key(), &input)?;
        if request.tamper() {
            tamper::tamper_signature(&mut signed.signature);
            tracing::warn!("tampered with the SCT signature");
        }
        let key_id = public_key_hash(request.key())?;
        Ok(Self {
            key_id,
            timestamp: request.timestamp(),
            extensions,
            signed,
        })
    }

    /// SHA-256 of the signing key's `SubjectPublicKeyInfo`.
    pub fn key_id(&self) -> &[u8; 32] {
        &self.key_id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The encoded extensions block, length prefix included.
    pub fn extensions(&self) -> &[u8] {
        &self.extensions
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signed.signature_algorithm
    }

    pub fn signature(&self) -> &[u8] {
        &self.signed.signature
    }

    /// Serializes the SCT:
    /// `version ‖ key_id ‖ timestamp ‖ extensions ‖ hash ‖ signature algorithm
    /// ‖ u16 length ‖ signature`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(
            1 + 32 + 8 + self.extensions.len() + 4 + self.signed.signature.len(),
        );
        out.write_u8(signing_input::SCT_VERSION_V1)?;
        out.extend_from_slice(&self.key_id);
        out.write_u64::<BigEndian>(self.timestamp.as_millis())?;
        out.extend_from_slice(&self.extensions);
        out.write_u8(self.signed.hash_algorithm.tls_code())?;
        out.write_u8(self.signed.signature_algorithm.code())?;
        out.write_length_prefixed("signature", &self.signed.signature, 2)?;
        Ok(out)
    }
}

/// Builds and serializes the SCT for `request`.
pub fn sign_and_encode<K: KeyHandle>(request: &SigningRequest<K>) -> Result<Vec<u8>> {
    let sct = SignedCertificateTimestamp::sign(request)?.to_bytes()?;
    tracing::info!(
        entry_type = %request.signed_entry().entry_type(),
        timestamp = request.timestamp().as_millis(),
        len = sct.len(),
        "built SCT"
    );
    Ok(sct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;

    fn request(tamper: bool, leaf_index: Option<u64>) -> SigningRequest<KeyPair> {
        SigningRequest::builder()
            .key(KeyPair::derive_ecdsa_p256(b"log").unwrap())
            .timestamp(Timestamp::from_millis(1_577_836_800_000))
            .signed_entry(SignedEntry::X509 {
                certificate: vec![0x30, 0x03, 0x02, 0x01, 0x01],
            })
            .tamper(tamper)
            .maybe_leaf_index(leaf_index.map(|v| LeafIndex::new(v).unwrap()))
            .build()
    }

    #[test]
    fn layout() {
        let sct = SignedCertificateTimestamp::sign(&request(false, None)).unwrap();
        let bytes = sct.to_bytes().unwrap();
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..33], sct.key_id());
        assert_eq!(&bytes[33..41], &1_577_836_800_000u64.to_be_bytes());
        assert_eq!(&bytes[41..43], &[0, 0]);
        assert_eq!(&bytes[43..45], &[4, 3]);
        let len = u16::from_be_bytes([bytes[45], bytes[46]]) as usize;
        assert_eq!(len, sct.signature().len());
        assert_eq!(bytes.len(), 47 + len);
    }

    #[test]
    fn tamper_flips_the_final_byte() {
        let clean = sign_and_encode(&request(false, Some(0))).unwrap();
        let tampered = sign_and_encode(&request(true, Some(0))).unwrap();
        let last = clean.len() - 1;
        assert_eq!(clean.len(), tampered.len());
        assert_eq!(clean[..last], tampered[..last]);
        assert_eq!(tampered[last], !clean[last]);
    }

    #[test]
    fn key_id_ignores_other_inputs() {
        let a = SignedCertificateTimestamp::sign(&request(false, None)).unwrap();
        let b = SignedCertificateTimestamp::sign(&request(true, Some(7))).unwrap();
        assert_eq!(a.key_id(), b.key_id());
    }
}
