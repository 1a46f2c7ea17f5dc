use core::str::FromStr;

use const_oid::AssociatedOid;
use der::{
    Encode,
    asn1::{Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use crate::error::SctError;

/// An X.509 extension that certificate specifications can ask for.
///
/// # Example
/// ```
/// use sctkit::cert::extensions::{SubjectAltName, ToX509Extension};
/// let san = SubjectAltName { names: vec!["example.com".to_string()] };
/// let encoded = san.to_x509_extension_value().unwrap();
/// assert_eq!(encoded[0], 0x30);
/// ```
pub trait ToX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension value (the contents of `extnValue`) as DER.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SctError>;
}

/// Subject Alternative Name with DNS names only.
#[derive(Debug, Clone)]
pub struct SubjectAltName {
    pub names: Vec<String>,
}

impl ToX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SctError> {
        let names = self
            .names
            .iter()
            .map(|name| {
                Ia5String::new(name)
                    .map(GeneralName::DnsName)
                    .map_err(|e| SctError::InvalidInput(format!("DNS name \"{name}\": {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(x509_cert::ext::pkix::SubjectAltName(names).to_der()?)
    }
}

/// Basic Constraints.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SctError> {
        Ok(x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        }
        .to_der()?)
    }
}

/// Key Usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl KeyUsage {
    /// Parses a key usage name (`digitalSignature`, `keyCertSign`, ...).
    pub fn parse_flag(name: &str) -> Result<KeyUsages, SctError> {
        match name {
            "digitalSignature" => Ok(KeyUsages::DigitalSignature),
            "nonRepudiation" => Ok(KeyUsages::NonRepudiation),
            "keyEncipherment" => Ok(KeyUsages::KeyEncipherment),
            "dataEncipherment" => Ok(KeyUsages::DataEncipherment),
            "keyAgreement" => Ok(KeyUsages::KeyAgreement),
            "keyCertSign" => Ok(KeyUsages::KeyCertSign),
            "cRLSign" => Ok(KeyUsages::CRLSign),
            "encipherOnly" => Ok(KeyUsages::EncipherOnly),
            "decipherOnly" => Ok(KeyUsages::DecipherOnly),
            _ => Err(SctError::InvalidInput(format!("unknown key usage \"{name}\""))),
        }
    }
}

impl ToX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SctError> {
        Ok(X509KeyUsage::from(self.0).to_der()?)
    }
}

/// Extended Key Usage, in the order given.
#[derive(Debug, Clone, Default)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SctError> {
        let oids = self.usage.iter().copied().map(ObjectIdentifier::from).collect();
        Ok(x509_cert::ext::pkix::ExtendedKeyUsage(oids).to_der()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        use const_oid::db::rfc5912;
        match value {
            ExtendedKeyUsageOption::ServerAuth => rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => rfc5912::ID_KP_EMAIL_PROTECTION,
            ExtendedKeyUsageOption::TimeStamping => rfc5912::ID_KP_TIME_STAMPING,
            ExtendedKeyUsageOption::OcspSigning => rfc5912::ID_KP_OCSP_SIGNING,
        }
    }
}

impl FromStr for ExtendedKeyUsageOption {
    type Err = SctError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serverAuth" => Ok(ExtendedKeyUsageOption::ServerAuth),
            "clientAuth" => Ok(ExtendedKeyUsageOption::ClientAuth),
            "codeSigning" => Ok(ExtendedKeyUsageOption::CodeSigning),
            "emailProtection" => Ok(ExtendedKeyUsageOption::EmailProtection),
            "timeStamping" => Ok(ExtendedKeyUsageOption::TimeStamping),
            "OCSPSigning" => Ok(ExtendedKeyUsageOption::OcspSigning),
            _ => Err(SctError::InvalidInput(format!(
                "unknown extended key usage \"{s}\""
            ))),
        }
    }
}

/// Authority Key Identifier carrying only a key identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl ToX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::AuthorityKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SctError> {
        Ok(x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(self.key_identifier.as_slice())?),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        }
        .to_der()?)
    }
}

#[cfg(test)]
mod tests {
    use der::Decode;

    use super::*;

    #[test]
    fn basic_constraints_path_length() {
        let encoded = BasicConstraints {
            is_ca: true,
            max_path_length: Some(3),
        }
        .to_x509_extension_value()
        .unwrap();
        let decoded = x509_cert::ext::pkix::BasicConstraints::from_der(&encoded).unwrap();
        assert!(decoded.ca);
        assert_eq!(decoded.path_len_constraint, Some(3));
    }

    #[test]
    fn key_usage_names() {
        let mut usages: FlagSet<KeyUsages> = FlagSet::default();
        for name in ["digitalSignature", "keyEncipherment"] {
            usages |= KeyUsage::parse_flag(name).unwrap();
        }
        assert_eq!(usages, KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment);
        assert!(KeyUsage::parse_flag("signEverything").is_err());
    }

    #[test]
    fn extended_key_usage_keeps_order() {
        let usage = ["clientAuth", "serverAuth"]
            .iter()
            .map(|name| name.parse::<ExtendedKeyUsageOption>())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let encoded = ExtendedKeyUsage { usage }.to_x509_extension_value().unwrap();
        let decoded = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(&encoded).unwrap();
        assert_eq!(
            decoded.0,
            vec![
                const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
                const_oid::db::rfc5912::ID_KP_SERVER_AUTH
            ]
        );
        assert!("anyPurpose".parse::<ExtendedKeyUsageOption>().is_err());
    }

    #[test]
    fn dns_names_must_be_ascii() {
        let san = SubjectAltName {
            names: vec!["bücher.example".to_string()],
        };
        assert!(matches!(
            san.to_x509_extension_value(),
            Err(SctError::InvalidInput(_))
        ));
    }
}
