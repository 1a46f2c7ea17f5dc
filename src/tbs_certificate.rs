use der::asn1::{GeneralizedTime, OctetString};
use der::{Decode, Encode};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::{DistinguishedName, ExtensionParam, Validity};
use crate::error::{Result, SctError};
use crate::key::{PublicKey, PublicKeyInfo};

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// This is also what a pre-certificate entry of an SCT carries.
///
/// # Fields
/// * `serial_number` - The unique identifier for the certificate.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The validity period of the certificate.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `extensions` - Additional X.509 extensions for the certificate.
pub struct TbsCertificate {
    pub serial_number: u64,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let algorithm_id: x509_cert::spki::AlgorithmIdentifierOwned =
            self.signature_algorithm.into();

        let extensions = self
            .extensions
            .iter()
            .map(|ext| -> Result<x509_cert::ext::Extension> {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: x509_time(self.validity.not_before)?,
            not_after: x509_time(self.validity.not_after)?,
        };

        let serial_number = SerialNumber::new(&serial_number_bytes(self.serial_number))?;

        let spki_der = self.subject_public_key.subject_public_key_info_der()?;
        let subject_public_key_info = SubjectPublicKeyInfoOwned::from_der(&spki_der)?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: algorithm_id,
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: if extensions.is_empty() {
                None
            } else {
                Some(extensions)
            },
        })
    }

    /// Encodes the `TbsCertificate` into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_tbs_certificate_inner()?.to_der()?)
    }
}

/// RFC 5280 section 4.1.2.5: UTCTime through 2049, GeneralizedTime after.
fn x509_time(when: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let seconds = u64::try_from(when.unix_timestamp())
        .map_err(|_| SctError::CertificateError(format!("{when} is before the Unix epoch")))?;
    let duration = core::time::Duration::from_secs(seconds);
    if when.year() < 2050 {
        Ok(x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_unix_duration(duration)?,
        ))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_unix_duration(duration)?,
        ))
    }
}

/// Minimal positive big-endian encoding of a serial number.
fn serial_number_bytes(serial: u64) -> Vec<u8> {
    let bytes = serial.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    let mut encoded = bytes[first..].to_vec();
    if encoded[0] & 0x80 != 0 {
        encoded.insert(0, 0);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serial_numbers_stay_positive() {
        assert_eq!(serial_number_bytes(0), vec![0]);
        assert_eq!(serial_number_bytes(1), vec![1]);
        assert_eq!(serial_number_bytes(0x80), vec![0, 0x80]);
        assert_eq!(serial_number_bytes(0x0102), vec![1, 2]);
    }

    #[test]
    fn time_encoding_switches_in_2050() {
        assert!(matches!(
            x509_time(datetime!(2049-12-31 23:59:59 UTC)).unwrap(),
            x509_cert::time::Time::UtcTime(_)
        ));
        assert!(matches!(
            x509_time(datetime!(2050-01-01 0:00 UTC)).unwrap(),
            x509_cert::time::Time::GeneralTime(_)
        ));
        assert!(x509_time(datetime!(1969-12-31 0:00 UTC)).is_err());
    }
}
