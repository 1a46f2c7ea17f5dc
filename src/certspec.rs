//! Certificates described by a nested, line-oriented specification.
//!
//! Each non-empty line is one directive:
//!
//! ```text
//! issuer:<name>
//! subject:<name>
//! serialNumber:<decimal>
//! validity:<YYYYMMDD>-<YYYYMMDD>
//! issuerKey:<key specification>
//! subjectKey:<key specification>
//! extension:basicConstraints:[cA],[pathLen]
//! extension:keyUsage:<name>[,<name>...]
//! extension:extKeyUsage:<name>[,<name>...]
//! extension:subjectAlternativeName:<dns name>[,<dns name>...]
//! precertificate
//! ```
//!
//! A name is either a bare common name or `/`-separated attributes such as
//! `/C=US/O=Example/CN=Test CA`.
//!
//! Key specifications are resolved through a [`KeyRing`]. Extensions are
//! encoded in the order they appear.

use time::Date;

use crate::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, FlagSet, KeyUsage, KeyUsages,
    SubjectAltName,
};
use crate::cert::params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, Validity};
use crate::error::{Result, SctError};
use crate::issuer::{Issuer, NamedIssuer};
use crate::keyring::KeyRing;
use crate::sct::SignedEntry;
use crate::sct::request::parse_yyyymmdd;

pub const DEFAULT_ISSUER: &str = "Default Issuer";
pub const DEFAULT_SUBJECT: &str = "Default End-entity";

/// Turns a nested certificate specification into the entry an SCT is
/// issued for.
pub trait CertificateBuilder {
    fn build_entry(&self, specification: &str) -> Result<SignedEntry>;
}

/// The parsed form of a nested certificate specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateSpecification {
    pub issuer: DistinguishedName,
    pub subject: DistinguishedName,
    pub serial_number: u64,
    pub validity: Validity,
    pub issuer_key: String,
    pub subject_key: String,
    pub extensions: Vec<ExtensionParam>,
    pub precertificate: bool,
}

impl CertificateSpecification {
    /// Parses `text`, using `default_key` for keys it does not name.
    pub fn parse(text: &str, default_key: &str) -> Result<Self> {
        let mut spec = Self {
            issuer: DistinguishedName::from_common_name(DEFAULT_ISSUER),
            subject: DistinguishedName::from_common_name(DEFAULT_SUBJECT),
            serial_number: 1,
            validity: Validity {
                not_before: midnight(time::macros::date!(2021 - 01 - 01)),
                not_after: midnight(time::macros::date!(2023 - 01 - 01)),
            },
            issuer_key: default_key.to_string(),
            subject_key: default_key.to_string(),
            extensions: Vec::new(),
            precertificate: false,
        };

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if line == "precertificate" {
                spec.precertificate = true;
                continue;
            }
            let Some((directive, value)) = line.split_once(':') else {
                return Err(SctError::UnknownDirective(line.to_string()));
            };
            match directive {
                "issuer" => spec.issuer = parse_name(line, value)?,
                "subject" => spec.subject = parse_name(line, value)?,
                "serialNumber" => {
                    spec.serial_number =
                        value.parse().map_err(|_| malformed(line, "serial number"))?
                }
                "validity" => spec.validity = parse_validity(line, value)?,
                "issuerKey" => spec.issuer_key = value.to_string(),
                "subjectKey" => spec.subject_key = value.to_string(),
                "extension" => spec.extensions.push(parse_extension(line, value)?),
                _ => return Err(SctError::UnknownDirective(line.to_string())),
            }
        }
        Ok(spec)
    }

    fn request(&self, keys: &KeyRing) -> Result<CertificationRequestInfo> {
        let subject_key = keys.resolve(&self.subject_key)?;
        Ok(CertificationRequestInfo::builder()
            .subject(self.subject.clone())
            .subject_public_key(subject_key.public_key())
            .serial_number(self.serial_number)
            .validity(self.validity.clone())
            .extensions(self.extensions.clone())
            .build())
    }
}

fn midnight(date: Date) -> time::OffsetDateTime {
    date.midnight().assume_utc()
}

fn malformed(line: &str, what: &str) -> SctError {
    SctError::MalformedSpecification(format!("invalid {what} in \"{line}\""))
}

fn parse_name(line: &str, value: &str) -> Result<DistinguishedName> {
    DistinguishedName::parse(value)
        .map_err(|err| SctError::MalformedSpecification(format!("{line}: {err}")))
}

fn parse_validity(line: &str, value: &str) -> Result<Validity> {
    let (not_before, not_after) = value
        .split_once('-')
        .ok_or_else(|| malformed(line, "validity"))?;
    let validity = Validity {
        not_before: midnight(parse_yyyymmdd(not_before)?),
        not_after: midnight(parse_yyyymmdd(not_after)?),
    };
    if validity.not_after < validity.not_before {
        return Err(malformed(line, "validity"));
    }
    Ok(validity)
}

fn names(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|name| !name.is_empty())
}

fn parse_extension(line: &str, value: &str) -> Result<ExtensionParam> {
    let (name, arguments) = value.split_once(':').unwrap_or((value, ""));
    let in_line = |err: SctError| SctError::MalformedSpecification(format!("{line}: {err}"));
    match name {
        "basicConstraints" => {
            let (ca, path_length) = arguments.split_once(',').unwrap_or((arguments, ""));
            let is_ca = match ca.trim() {
                "cA" => true,
                "" => false,
                _ => return Err(malformed(line, "basicConstraints")),
            };
            let max_path_length = match path_length.trim() {
                "" => None,
                length => Some(length.parse().map_err(|_| malformed(line, "path length"))?),
            };
            ExtensionParam::from_extension(
                BasicConstraints {
                    is_ca,
                    max_path_length,
                },
                true,
            )
        }
        "keyUsage" => {
            let mut usages: FlagSet<KeyUsages> = FlagSet::default();
            for usage in names(arguments) {
                usages |= KeyUsage::parse_flag(usage).map_err(in_line)?;
            }
            ExtensionParam::from_extension(KeyUsage(usages), true)
        }
        "extKeyUsage" => {
            let usage = names(arguments)
                .map(str::parse::<ExtendedKeyUsageOption>)
                .collect::<Result<Vec<_>>>()
                .map_err(in_line)?;
            ExtensionParam::from_extension(ExtendedKeyUsage { usage }, false)
        }
        "subjectAlternativeName" => ExtensionParam::from_extension(
            SubjectAltName {
                names: names(arguments).map(str::to_string).collect(),
            },
            false,
        )
        .map_err(in_line),
        _ => Err(SctError::UnknownDirective(line.to_string())),
    }
}

/// Builds certificates from [`CertificateSpecification`]s with keys from a
/// [`KeyRing`].
#[derive(Debug, Clone)]
pub struct SpecCertificateBuilder<'a> {
    keys: &'a KeyRing,
    default_key: String,
}

impl<'a> SpecCertificateBuilder<'a> {
    pub fn new(keys: &'a KeyRing, default_key: impl Into<String>) -> Self {
        Self {
            keys,
            default_key: default_key.into(),
        }
    }
}

impl CertificateBuilder for SpecCertificateBuilder<'_> {
    fn build_entry(&self, specification: &str) -> Result<SignedEntry> {
        let spec = CertificateSpecification::parse(specification, &self.default_key)?;
        let issuer = NamedIssuer {
            name: spec.issuer.clone(),
            key: self.keys.resolve(&spec.issuer_key)?,
        };
        let request = spec.request(self.keys)?;
        tracing::debug!(
            issuer = %spec.issuer.common_name,
            subject = %spec.subject.common_name,
            precertificate = spec.precertificate,
            "building certificate"
        );
        if spec.precertificate {
            Ok(SignedEntry::Precert {
                tbs_certificate: issuer.prepare(&request)?.to_der()?,
                issuer_key: issuer.issuer_public_key(),
            })
        } else {
            Ok(SignedEntry::X509 {
                certificate: issuer.issue(&request)?.to_der()?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use der::Decode;

    use super::*;
    use crate::cert::extensions::ToX509Extension;

    #[test]
    fn defaults() {
        let spec = CertificateSpecification::parse("", "secp256r1").unwrap();
        assert_eq!(spec.issuer.common_name, DEFAULT_ISSUER);
        assert_eq!(spec.subject.common_name, DEFAULT_SUBJECT);
        assert_eq!(spec.serial_number, 1);
        assert_eq!(spec.issuer_key, "secp256r1");
        assert!(!spec.precertificate);
        assert!(spec.extensions.is_empty());
    }

    #[test]
    fn directives() {
        let spec = CertificateSpecification::parse(
            "issuer:Test CA\n\
             subject:example.com\n\
             serialNumber:1234\n\
             validity:20200101-20210101\n\
             subjectKey:secp384r1\n\
             extension:basicConstraints:cA,0\n\
             extension:keyUsage:digitalSignature,keyCertSign\n\
             extension:subjectAlternativeName:example.com,www.example.com\n\
             precertificate",
            "secp256r1",
        )
        .unwrap();
        assert_eq!(spec.issuer, DistinguishedName::from_common_name("Test CA"));
        assert_eq!(spec.serial_number, 1234);
        assert_eq!(spec.validity.not_before.year(), 2020);
        assert_eq!(spec.subject_key, "secp384r1");
        assert_eq!(spec.issuer_key, "secp256r1");
        assert!(spec.precertificate);
        assert_eq!(spec.extensions.len(), 3);
        let basic_constraints =
            x509_cert::ext::pkix::BasicConstraints::from_der(&spec.extensions[0].value).unwrap();
        assert!(basic_constraints.ca);
        assert_eq!(basic_constraints.path_len_constraint, Some(0));
        assert!(spec.extensions[0].critical);
        assert_eq!(spec.extensions[2].oid, SubjectAltName::OID);
    }

    #[test]
    fn unknown_directives() {
        assert_eq!(
            CertificateSpecification::parse("color:blue", "secp256r1").unwrap_err(),
            SctError::UnknownDirective("color:blue".to_string())
        );
        assert_eq!(
            CertificateSpecification::parse("extension:nameConstraints:x", "secp256r1")
                .unwrap_err(),
            SctError::UnknownDirective("extension:nameConstraints:x".to_string())
        );
        assert!(matches!(
            CertificateSpecification::parse("validity:20230101-20200101", "secp256r1"),
            Err(SctError::MalformedSpecification(_))
        ));
        assert!(matches!(
            CertificateSpecification::parse("subject:/CN=x/EMAIL=x@example.com", "secp256r1"),
            Err(SctError::MalformedSpecification(_))
        ));
    }

    #[test]
    fn full_names_reach_the_certificate() {
        let keys = KeyRing::new();
        let builder = SpecCertificateBuilder::new(&keys, "secp256r1");
        let SignedEntry::X509 { certificate } = builder
            .build_entry("issuer:/C=US/O=Example/CN=Example CA\nsubject:/O=Example/CN=leaf")
            .unwrap()
        else {
            panic!("expected an X509 entry");
        };
        let parsed = x509_cert::Certificate::from_der(&certificate).unwrap();
        let issuer = parsed.tbs_certificate.issuer.to_string();
        let subject = parsed.tbs_certificate.subject.to_string();
        for part in ["CN=Example CA", "O=Example", "C=US"] {
            assert!(issuer.contains(part), "{issuer}");
        }
        assert!(subject.contains("CN=leaf"), "{subject}");
        assert!(subject.contains("O=Example"), "{subject}");
        assert!(!subject.contains("C=US"), "{subject}");
    }

    #[test]
    fn builds_certificates_and_precertificates() {
        let keys = KeyRing::new();
        let builder = SpecCertificateBuilder::new(&keys, "secp256r1");

        let SignedEntry::X509 { certificate } = builder
            .build_entry("subject:leaf\nissuerKey:secp256r1:ca")
            .unwrap()
        else {
            panic!("expected an X509 entry");
        };
        let parsed = x509_cert::Certificate::from_der(&certificate).unwrap();
        assert_eq!(parsed.tbs_certificate.subject.to_string(), "CN=leaf");
        assert_eq!(parsed.tbs_certificate.issuer.to_string(), "CN=Default Issuer");

        let SignedEntry::Precert {
            tbs_certificate,
            issuer_key,
        } = builder
            .build_entry("subject:leaf\nissuerKey:secp256r1:ca\nprecertificate")
            .unwrap()
        else {
            panic!("expected a precert entry");
        };
        assert_eq!(
            parsed.tbs_certificate,
            x509_cert::TbsCertificate::from_der(&tbs_certificate).unwrap()
        );
        assert_eq!(issuer_key, keys.resolve("secp256r1:ca").unwrap().public_key());
    }
}
