//! The text format SCTs are described in.
//!
//! ```text
//! timestamp:<YYYYMMDD>
//! [key:<key specification>]
//! [tamper]
//! [leafIndex:<leaf index>]
//! certificate:
//! <certificate specification>
//! ```
//!
//! Directives before `certificate:` may come in any order and a repeated
//! directive replaces the earlier one. Blank lines are skipped. Every line
//! after `certificate:` belongs to the certificate specification and is
//! handed to a [`CertificateBuilder`].

use time::Date;

use crate::certspec::CertificateBuilder;
use crate::error::{Result, SctError};
use crate::key::KeyPair;
use crate::keyring::KeyRing;
use crate::sct::request::parse_yyyymmdd;
use crate::sct::{LeafIndex, SigningRequest, Timestamp};

const CERTIFICATE_MARKER: &str = "certificate:";

/// The directives of an SCT specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SctSpecification {
    pub timestamp: Option<Date>,
    pub key: Option<String>,
    pub tamper: bool,
    pub leaf_index: Option<u64>,
    /// The nested certificate specification, one trimmed line per line.
    pub certificate: String,
}

impl SctSpecification {
    pub fn parse(text: &str) -> Result<Self> {
        let mut spec = Self::default();
        let mut lines = text.lines();
        let mut found_certificate = false;

        for line in lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == CERTIFICATE_MARKER {
                found_certificate = true;
                break;
            }
            if line == "tamper" {
                spec.tamper = true;
            } else if let Some(value) = line.strip_prefix("timestamp:") {
                spec.timestamp = Some(parse_yyyymmdd(value.trim())?);
            } else if let Some(value) = line.strip_prefix("key:") {
                spec.key = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("leafIndex:") {
                let index = value.trim().parse().map_err(|_| {
                    SctError::MalformedSpecification(format!("invalid leaf index \"{value}\""))
                })?;
                spec.leaf_index = Some(index);
            } else {
                return Err(SctError::UnknownDirective(line.to_string()));
            }
        }

        if !found_certificate {
            return Err(SctError::MalformedSpecification(
                "missing certificate: block".to_string(),
            ));
        }
        spec.certificate = lines.map(|line| format!("{}\n", line.trim())).collect();
        Ok(spec)
    }
}

/// Values used when a specification leaves a directive out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub key: String,
    pub timestamp: Option<Date>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            key: crate::config::DEFAULT_KEY.to_string(),
            timestamp: None,
        }
    }
}

/// Turns an SCT specification into a signing request.
pub fn signing_request_from_specification(
    text: &str,
    defaults: &Defaults,
    keys: &KeyRing,
    builder: &impl CertificateBuilder,
) -> Result<SigningRequest<KeyPair>> {
    let spec = SctSpecification::parse(text)?;
    let date = spec.timestamp.or(defaults.timestamp).ok_or_else(|| {
        SctError::MalformedSpecification("missing timestamp: directive".to_string())
    })?;
    let key = keys.resolve(spec.key.as_deref().unwrap_or(&defaults.key))?;
    let leaf_index = spec
        .leaf_index
        .map(LeafIndex::new)
        .transpose()
        .map_err(|err| SctError::MalformedSpecification(err.to_string()))?;
    let signed_entry = builder.build_entry(&spec.certificate)?;
    tracing::debug!(
        %date,
        key = spec.key.as_deref().unwrap_or(&defaults.key),
        tamper = spec.tamper,
        leaf_index = ?spec.leaf_index,
        "parsed SCT specification"
    );

    Ok(SigningRequest::builder()
        .key(key)
        .timestamp(Timestamp::from_date(date)?)
        .signed_entry(signed_entry)
        .tamper(spec.tamper)
        .maybe_leaf_index(leaf_index)
        .build())
}
