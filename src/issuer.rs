use der::{Decode, Encode};
use der::asn1::BitString;
use sha1::{Digest, Sha1};
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::Certificate;
use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{AuthorityKeyIdentifier, ToX509Extension};
use crate::cert::params::{CertificationRequestInfo, DistinguishedName, ExtensionParam};
use crate::error::Result;
use crate::key::{HashAlgorithm, KeyHandle, KeyPair, PublicKey, PublicKeyInfo};
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> &DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Returns the public key that identifies this issuer, e.g. in the
    /// issuer key hash of a pre-certificate entry.
    fn issuer_public_key(&self) -> PublicKey {
        self.signing_key().public_key()
    }

    /// Builds the to-be-signed part of a certificate for `cert_request`.
    ///
    /// An Authority Key Identifier derived from the issuer key is appended
    /// unless the request already carries one.
    fn prepare(&self, cert_request: &CertificationRequestInfo) -> Result<TbsCertificate> {
        let mut extensions = cert_request.extensions.clone();
        if !extensions
            .iter()
            .any(|ext| ext.oid == AuthorityKeyIdentifier::OID)
        {
            let issuer_spki = SubjectPublicKeyInfoOwned::from_der(
                &self.signing_key().subject_public_key_info_der()?,
            )?;
            let key_id = Sha1::digest(issuer_spki.subject_public_key.raw_bytes());
            extensions.push(ExtensionParam::from_extension(
                AuthorityKeyIdentifier {
                    key_identifier: key_id.to_vec(),
                },
                false,
            )?);
        }

        Ok(TbsCertificate {
            serial_number: cert_request.serial_number,
            signature_algorithm: SignatureAlgorithm::for_key_kind(self.signing_key().kind()),
            issuer: self.issuer_name().clone(),
            validity: cert_request.validity.clone(),
            subject: cert_request.subject.clone(),
            subject_public_key: cert_request.subject_public_key.clone(),
            extensions,
        })
    }

    /// Issues a certificate based on the provided certification request information.
    fn issue(&self, cert_request: &CertificationRequestInfo) -> Result<Certificate> {
        let tbs_certificate = self.prepare(cert_request)?.to_tbs_certificate_inner()?;
        let signature = self
            .signing_key()
            .sign(&tbs_certificate.to_der()?, HashAlgorithm::Sha256)?;

        Ok(Certificate {
            inner: CertificateInner {
                signature_algorithm: tbs_certificate.signature.clone(),
                tbs_certificate,
                signature: BitString::from_bytes(&signature)?,
            },
        })
    }
}

/// An issuer described by a name and a key, with no certificate of its own.
#[derive(Debug, Clone)]
pub struct NamedIssuer {
    pub name: DistinguishedName,
    pub key: KeyPair,
}

impl Issuer for NamedIssuer {
    fn issuer_name(&self) -> &DistinguishedName {
        &self.name
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }
}
