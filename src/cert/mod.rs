pub mod extensions;
pub mod params;

use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::error::Result;
use crate::key::KeyKind;
use crate::pem_utils::der_to_pem;

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    Sha256WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
    /// Ed25519.
    Ed25519,
}

impl SignatureAlgorithm {
    /// The algorithm a key of the given kind signs certificates with.
    pub fn for_key_kind(kind: KeyKind) -> Self {
        match kind {
            KeyKind::Rsa => SignatureAlgorithm::Sha256WithRSA,
            KeyKind::EllipticCurve => SignatureAlgorithm::Sha256WithECDSA,
            KeyKind::Ed25519 => SignatureAlgorithm::Ed25519,
        }
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    fn from(value: SignatureAlgorithm) -> Self {
        use const_oid::db::{rfc5912, rfc8410};
        let oid = match value {
            SignatureAlgorithm::Sha256WithRSA => rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha256WithECDSA => rfc5912::ECDSA_WITH_SHA_256,
            SignatureAlgorithm::Ed25519 => rfc8410::ID_ED_25519,
        };
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid,
            parameters: None,
        }
    }
}

/// Represents an X.509 certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.inner.to_der()?)
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        Ok(der_to_pem(&self.to_der()?, "CERTIFICATE"))
    }
}
