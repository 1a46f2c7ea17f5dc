//! # SctKit - Signed Certificate Timestamps for testing
//!
//! SctKit builds RFC 6962 Signed Certificate Timestamps deterministically from
//! a signing key, a date and a certificate or pre-certificate. It is meant
//! for producing test fixtures for Certificate Transparency verifiers,
//! including deliberately broken ones.
//!
//! ## Supported Key Types
//!
//! - **ECDSA**: P-256 and P-384 (signature algorithm 3)
//! - **RSA**: PKCS#1 v1.5 (signature algorithm 1)
//! - **Ed25519**: for issuing test certificates only, SCTs cannot be signed
//!   with it
//!
//! ## Key Features
//!
//! - **Bit-exact encoding**: `SignedCertificateTimestamp` and the
//!   `digitally-signed` input of RFC 6962 section 3.2
//! - **X509 and pre-certificate entries**
//! - **Leaf index extension**, with index 0 encoded like any other
//! - **Tamper mode**: complements the last signature byte
//! - **Text specifications**: the `make_sct` format, with nested
//!   certificate specifications
//!
//! ## Quick Start
//!
//! ### Building an SCT for a certificate
//!
//! ```rust,no_run
//! use sctkit::{
//!     key::KeyPair,
//!     sct::{LeafIndex, SignedEntry, SigningRequest, Timestamp, sign_and_encode},
//! };
//!
//! # fn main() -> Result<(), sctkit::error::SctError> {
//! let log_key = KeyPair::generate_ecdsa_p256();
//! let certificate = std::fs::read("leaf.der").map_err(sctkit::error::SctError::from)?;
//!
//! let request = SigningRequest::builder()
//!     .key(log_key)
//!     .timestamp(Timestamp::parse_date("20200101")?)
//!     .signed_entry(SignedEntry::X509 { certificate })
//!     .leaf_index(LeafIndex::new(0)?)
//!     .build();
//!
//! let sct = sign_and_encode(&request)?;
//! println!("{} bytes", sct.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Building an SCT from a specification
//!
//! ```rust
//! use sctkit::{
//!     certspec::SpecCertificateBuilder,
//!     keyring::KeyRing,
//!     sct::sign_and_encode,
//!     specification::{Defaults, signing_request_from_specification},
//! };
//!
//! # fn main() -> Result<(), sctkit::error::SctError> {
//! let keys = KeyRing::new();
//! let defaults = Defaults::default();
//! let builder = SpecCertificateBuilder::new(&keys, &defaults.key);
//!
//! let request = signing_request_from_specification(
//!     "timestamp:20200101\n\
//!      leafIndex:12345\n\
//!      certificate:\n\
//!      issuer:Test CA\n\
//!      subject:example.com\n\
//!      extension:subjectAlternativeName:example.com\n",
//!     &defaults,
//!     &keys,
//!     &builder,
//! )?;
//! let sct = sign_and_encode(&request)?;
//! assert_eq!(&sct[41..51], &[0, 8, 0, 0, 5, 0, 0, 0, 0x30, 0x39]);
//! # Ok(())
//! # }
//! ```

pub mod cert;
pub mod certspec;
pub mod codec;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod keyring;
pub mod pem_utils;
pub mod pki;
pub mod sct;
pub mod specification;
pub mod tbs_certificate;
