use const_oid::ObjectIdentifier;
use der::flagset::FlagSet;
use sha1::{Digest, Sha1};
use x509_cert::Version;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::Certificate;
use crate::cert::params::{CertificationRequestInfo, Validity};
use crate::error::Result;
use crate::key::KeyPair;
use crate::pki::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption,
    KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use crate::pki::{Extension, RelativeDistinguishedNames, Time};
use crate::signature;
use crate::tbs_certificate::TbsCertificate;

/// SHA-1 over the subjectPublicKey bits (RFC 5280 §4.2.1.2 method 1).
pub fn key_identifier(spki: &SubjectPublicKeyInfoOwned) -> Vec<u8> {
    Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec()
}

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> RelativeDistinguishedNames;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Issues a certificate based on the provided certification request information.
    ///
    /// BasicConstraints, KeyUsage, SubjectKeyIdentifier, AuthorityKeyIdentifier and,
    /// when usages are requested, ExtendedKeyUsage are generated unless the request
    /// already carries an extension with the same OID.
    ///
    /// # Arguments
    /// * `cert_request` - The certification request information containing details about the certificate to be issued.
    /// * `validity` - The validity period of the new certificate.
    ///
    /// # Returns
    /// The signed `Certificate`.
    fn issue(
        &self,
        cert_request: &CertificationRequestInfo,
        validity: Validity,
    ) -> Result<Certificate> {
        let subject_public_key_info = cert_request.subject_public_key.to_spki()?;
        let issuer_public_key_info = self.signing_key().as_spki()?;

        let mut key_usage_flags: FlagSet<KeyUsages> = FlagSet::default();
        if cert_request.is_ca {
            key_usage_flags |= KeyUsages::KeyCertSign;
            key_usage_flags |= KeyUsages::CRLSign;
            key_usage_flags |= KeyUsages::DigitalSignature;
        }
        for usage in &cert_request.usages {
            match usage {
                ExtendedKeyUsageOption::ClientAuth
                | ExtendedKeyUsageOption::ServerAuth
                | ExtendedKeyUsageOption::EmailProtection => {
                    key_usage_flags |= KeyUsages::DigitalSignature;
                    key_usage_flags |= KeyUsages::KeyEncipherment;
                }
                ExtendedKeyUsageOption::CodeSigning
                | ExtendedKeyUsageOption::TimeStamping
                | ExtendedKeyUsageOption::OcspSigning => {
                    key_usage_flags |= KeyUsages::DigitalSignature;
                }
            }
        }
        if key_usage_flags.is_empty() {
            key_usage_flags |= KeyUsages::DigitalSignature;
        }

        let supplied = |oid: ObjectIdentifier| {
            cert_request
                .extensions
                .iter()
                .any(|extension| extension.extn_id == oid)
        };
        let mut extensions = cert_request.extensions.clone();
        let mut generate = |extension: Extension| {
            if !supplied(extension.extn_id) {
                extensions.push(extension);
            }
        };

        generate(Extension::new(
            BasicConstraints {
                is_ca: cert_request.is_ca,
                max_path_length: cert_request.max_path_length,
            },
            true,
        )?);
        generate(Extension::new(KeyUsage(key_usage_flags), true)?);
        generate(Extension::new(
            SubjectKeyIdentifier(key_identifier(&subject_public_key_info)),
            false,
        )?);
        generate(Extension::new(
            AuthorityKeyIdentifier {
                key_identifier: Some(key_identifier(&issuer_public_key_info)),
                ..Default::default()
            },
            false,
        )?);
        if !cert_request.usages.is_empty() {
            generate(Extension::new(
                ExtendedKeyUsage::from_options(&cert_request.usages),
                false,
            )?);
        }

        let (signature_algorithm, _) =
            signature::signature_algorithm(self.signing_key(), cert_request.hash)?;
        let tbs_cert = TbsCertificate {
            version: Version::V3,
            serial_number: cert_request.serial_number.clone(),
            signature: signature_algorithm,
            issuer: self.issuer_name(),
            not_before: Time::from_date(validity.not_before)?,
            not_after: Time::from_date(validity.not_after)?,
            subject: cert_request.subject.to_rdns()?,
            subject_public_key_info,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        };

        let mut cert = Certificate::from_tbs_certificate(tbs_cert)?;
        cert.sign(self.signing_key(), cert_request.hash)?;
        Ok(cert)
    }
}
