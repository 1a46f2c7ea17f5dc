use bon::Builder;
use const_oid::ObjectIdentifier;
use time::OffsetDateTime;
use x509_cert::name::RdnSequence;

use super::extensions::ToX509Extension;
use crate::error::{Result, SctError};
use crate::key::PublicKey;

/// Parameters for building an X.509 certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `serial_number` - The certificate serial number.
/// * `validity` - The validity period of the certificate.
/// * `extensions` - X.509 extensions, in the order they are encoded.
#[derive(Clone, Debug, Builder)]
pub struct CertificationRequestInfo {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default = 1)]
    pub serial_number: u64,
    pub validity: Validity,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// Distinguished name parameters for building an X.509 certificate.
///
/// Only the attributes that are set end up in the encoded name.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// A name consisting of only a common name.
    pub fn from_common_name(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            ..Self::default()
        }
    }

    /// Parses a name given either as a bare common name or as a sequence of
    /// `/<attribute>=<value>` components, e.g. `/C=US/O=Example/CN=Test CA`.
    ///
    /// The attributes are `CN`, `C`, `ST`, `L`, `O` and `OU`.
    pub fn parse(text: &str) -> Result<Self> {
        let Some(components) = text.strip_prefix('/') else {
            return Ok(Self::from_common_name(text));
        };
        let mut name = Self::default();
        for component in components.split('/') {
            let (attribute, value) = component.split_once('=').ok_or_else(|| {
                SctError::InvalidInput(format!("name component \"{component}\" has no value"))
            })?;
            let value = value.to_string();
            match attribute {
                "CN" => name.common_name = value,
                "C" => name.country = Some(value),
                "ST" => name.state = Some(value),
                "L" => name.locality = Some(value),
                "O" => name.organization = Some(value),
                "OU" => name.organization_unit = Some(value),
                _ => {
                    return Err(SctError::InvalidInput(format!(
                        "unknown name attribute \"{attribute}\""
                    )));
                }
            }
        }
        Ok(name)
    }

    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        use core::str::FromStr;

        let attributes = [
            ("CN", Some(&self.common_name).filter(|name| !name.is_empty())),
            ("OU", self.organization_unit.as_ref()),
            ("O", self.organization.as_ref()),
            ("L", self.locality.as_ref()),
            ("ST", self.state.as_ref()),
            ("C", self.country.as_ref()),
        ];
        let rfc4514_name = attributes
            .iter()
            .filter_map(|(tag, value)| value.map(|v| format!("{tag}={}", escape_rfc4514(v))))
            .collect::<Vec<_>>()
            .join(",");
        RdnSequence::from_str(&rfc4514_name).map_err(|e| {
            SctError::CertificateError(format!("invalid name \"{rfc4514_name}\": {e}"))
        })
    }
}

fn escape_rfc4514(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_attributes_are_left_out() {
        let name = DistinguishedName::builder()
            .common_name("Test, Inc.".to_string())
            .organization("Example".to_string())
            .build()
            .as_x509_name()
            .unwrap();
        let rendered = name.to_string();
        assert!(rendered.contains("CN=Test"), "{rendered}");
        assert!(rendered.contains("Inc."), "{rendered}");
        assert!(rendered.contains("O=Example"), "{rendered}");
        assert!(!rendered.contains("OU="), "{rendered}");
        assert!(!rendered.contains("C="), "{rendered}");
    }

    #[test]
    fn slash_separated_names() {
        let name = DistinguishedName::parse("/C=US/O=Example Org/OU=CT/CN=Test CA").unwrap();
        assert_eq!(name.common_name, "Test CA");
        assert_eq!(name.country.as_deref(), Some("US"));
        assert_eq!(name.organization.as_deref(), Some("Example Org"));
        assert_eq!(name.organization_unit.as_deref(), Some("CT"));
        assert_eq!(name.state, None);

        let rendered = name.as_x509_name().unwrap().to_string();
        for part in ["CN=Test CA", "O=Example Org", "OU=CT", "C=US"] {
            assert!(rendered.contains(part), "{rendered}");
        }

        let organization_only = DistinguishedName::parse("/O=Example").unwrap();
        let rendered = organization_only.as_x509_name().unwrap().to_string();
        assert_eq!(rendered, "O=Example");
    }

    #[test]
    fn bare_names_are_common_names() {
        assert_eq!(
            DistinguishedName::parse("example.com").unwrap(),
            DistinguishedName::from_common_name("example.com")
        );
        assert!(DistinguishedName::parse("/CN").is_err());
        assert!(DistinguishedName::parse("/E=ca@example.com").is_err());
    }
}
