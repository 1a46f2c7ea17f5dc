//! use sctkit::error::SctError;

use thiserror::Error;

/// Represents errors that can occur while building a Signed Certificate Timestamp.
///
/// The first six variants are the failures of the SCT pipeline itself. The
/// remaining ones are reported by the collaborators around it (keys,
/// certificates, configuration). Every error is terminal for the SCT being
/// built: nothing is emitted once one is raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SctError {
    /// An entry type outside {x509_entry, precert_entry} was supplied.
    #[error("Unsupported SignedEntry type: \"{0}\"")]
    UnsupportedEntryType(String),

    /// A signing or issuer key is neither elliptic-curve nor RSA.
    #[error("Unsupported key type: \"{0}\"")]
    UnsupportedKeyType(String),

    /// A length-prefixed field is too large for its prefix.
    #[error("{field} is {length} bytes long, which exceeds the maximum of {max}")]
    EncodingOverflow {
        field: &'static str,
        length: u64,
        max: u64,
    },

    /// The key provider failed to sign or returned malformed output.
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    /// The specification contains a line that is not a known directive.
    #[error("Unknown directive: \"{0}\"")]
    UnknownDirective(String),

    /// The specification is structurally invalid.
    #[error("Malformed specification: {0}")]
    MalformedSpecification(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error while generating, deriving or resolving a key.
    #[error("Key error: {0}")]
    KeyError(String),

    /// Error related to certificate operations.
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// Error while loading the configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SctError>;

impl From<der::Error> for SctError {
    /// Converts a `der::Error` into a `SctError`.
    fn from(err: der::Error) -> Self {
        SctError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for SctError {
    fn from(err: pkcs8::Error) -> Self {
        SctError::KeyError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for SctError {
    fn from(err: pkcs8::spki::Error) -> Self {
        SctError::EncodingError(err.to_string())
    }
}

impl From<rsa::Error> for SctError {
    fn from(err: rsa::Error) -> Self {
        SctError::KeyError(err.to_string())
    }
}

impl From<ecdsa::Error> for SctError {
    fn from(err: ecdsa::Error) -> Self {
        SctError::SigningFailure(err.to_string())
    }
}

impl From<std::io::Error> for SctError {
    fn from(err: std::io::Error) -> Self {
        SctError::EncodingError(err.to_string())
    }
}

impl From<pem::PemError> for SctError {
    fn from(err: pem::PemError) -> Self {
        SctError::DecodingError(err.to_string())
    }
}
