pub mod params;

use der::asn1::BitString;
use der::{Any, Decode, Encode};
use params::{CertificationRequestInfo, Validity};
use time::OffsetDateTime;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::crypto::RustCrypto;
use crate::error::{CertPathError, Result};
use crate::issuer::Issuer;
use crate::key::KeyPair;
use crate::oid::HashAlgorithm;
use crate::pem_utils::{self, CERTIFICATE_LABEL};
use crate::pki::extension::{KnownExtension, find_extension};
use crate::pki::extensions::{BasicConstraints, KeyUsage, KeyUsages};
use crate::pki::schema::SignedSchema;
use crate::pki::{AlgorithmIdentifier, Extension, RelativeDistinguishedNames, Simplified};
use crate::signature::{self, SignerKey};
use crate::tbs_certificate::TbsCertificate;

/// Represents an X.509 certificate.
///
/// `tbs` holds the exact bytes of the signed part. Decoding keeps them as read, so
/// verification and [`Simplified::to_der`] work on the original encoding even when
/// it is not canonical. [`Certificate::encode_tbs`] rebuilds them from
/// `tbs_certificate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub tbs: Vec<u8>,
    pub tbs_certificate: TbsCertificate,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature_value: BitString,
}

impl Simplified for Certificate {
    type Schema = SignedSchema;
    const NAME: &'static str = "Certificate";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let tbs = schema.tbs.to_der()?;
        Ok(Self {
            tbs_certificate: TbsCertificate::from_der(&tbs)?,
            tbs,
            signature_algorithm: schema.signature_algorithm.into(),
            signature_value: schema.signature,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(SignedSchema {
            tbs: Any::from_der(&self.tbs)?,
            signature_algorithm: self.signature_algorithm.clone().into_owned(),
            signature: self.signature_value.clone(),
        })
    }
}

impl Certificate {
    /// Wraps an unsigned `TbsCertificate`; call [`Certificate::sign`] next.
    pub fn from_tbs_certificate(tbs_certificate: TbsCertificate) -> Result<Self> {
        Ok(Self {
            tbs: tbs_certificate.to_der()?,
            signature_algorithm: tbs_certificate.signature.clone(),
            tbs_certificate,
            signature_value: BitString::from_bytes(&[])?,
        })
    }

    /// Decodes a PEM `CERTIFICATE` block.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem_str, CERTIFICATE_LABEL)?)
    }

    /// Encodes the certificate into PEM format.
    ///
    /// # Returns
    /// A string containing the PEM-encoded certificate.
    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    /// Re-encodes `tbs` from the current field values.
    pub fn encode_tbs(&mut self) -> Result<()> {
        self.tbs = self.tbs_certificate.to_der()?;
        Ok(())
    }

    /// Signs the certificate with `key`.
    ///
    /// The signature algorithm follows the key: PKCS#1 v1.5 or RSASSA-PSS for RSA
    /// keys, ECDSA for EC keys. It is written to both the signed part and the outer
    /// structure before the signed part is re-encoded.
    pub fn sign(&mut self, key: &KeyPair, hash: HashAlgorithm) -> Result<()> {
        let (algorithm, _) = signature::signature_algorithm(key, hash)?;
        self.tbs_certificate.signature = algorithm;
        self.encode_tbs()?;

        let (algorithm, value) = signature::sign_tbs(&RustCrypto, key, hash, &self.tbs)?;
        self.signature_algorithm = algorithm;
        self.signature_value = value;
        Ok(())
    }

    /// Verifies the signature.
    ///
    /// Without a `signer`, only a self-signed certificate can be verified, with its
    /// own key. `Ok(false)` is a signature that does not match.
    pub fn verify(&self, signer: Option<SignerKey<'_>>) -> Result<bool> {
        let spki = match signer {
            Some(signer) => signer.public_key_info(),
            None if self.is_self_signed() => &self.tbs_certificate.subject_public_key_info,
            None => {
                return Err(CertPathError::InvalidArgument(
                    "an issuer certificate or public key is required".to_string(),
                ));
            }
        };
        signature::verify_tbs(
            &RustCrypto,
            &self.signature_algorithm,
            spki,
            &self.signature_value,
            &self.tbs,
        )
    }

    /// Subject and issuer are the same name.
    pub fn is_self_signed(&self) -> bool {
        self.tbs_certificate.subject == self.tbs_certificate.issuer
    }

    pub fn subject(&self) -> &RelativeDistinguishedNames {
        &self.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &RelativeDistinguishedNames {
        &self.tbs_certificate.issuer
    }

    pub fn serial_number(&self) -> &[u8] {
        &self.tbs_certificate.serial_number
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfoOwned {
        &self.tbs_certificate.subject_public_key_info
    }

    pub fn extensions(&self) -> &[Extension] {
        self.tbs_certificate.extensions.as_deref().unwrap_or_default()
    }

    /// The decoded payload of the first extension of type `T`.
    pub fn extension<T: KnownExtension>(&self) -> Option<&T> {
        find_extension(self.extensions())
    }

    /// BasicConstraints says cA.
    pub fn is_ca(&self) -> bool {
        self.extension::<BasicConstraints>()
            .is_some_and(|constraints| constraints.is_ca)
    }

    /// `None` when the certificate has no KeyUsage extension.
    pub fn key_usage(&self, usage: KeyUsages) -> Option<bool> {
        self.extension::<KeyUsage>().map(|ku| ku.contains(usage))
    }

    /// Whether `date` lies within notBefore..=notAfter.
    pub fn is_valid_at(&self, date: OffsetDateTime) -> bool {
        self.tbs_certificate.not_before.value() <= date
            && date <= self.tbs_certificate.not_after.value()
    }

    /// Creates a new self-signed certificate.
    ///
    /// # Arguments
    /// * `cert_info` - The certification request information.
    /// * `key` - The key pair used to sign the certificate.
    ///
    /// # Returns
    /// A `Certificate` object representing the self-signed certificate.
    pub fn new_self_signed(cert_info: &CertificationRequestInfo, key: &KeyPair) -> Result<Self> {
        // For self-signed certificates, the issuer is the same as the subject
        let self_issuer = SelfIssuer {
            name: cert_info.subject.to_rdns()?,
            key,
        };
        self_issuer.issue(cert_info, Validity::for_days(365))
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: RelativeDistinguishedNames,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> RelativeDistinguishedNames {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}

/// A certificate together with the private key of its subject, able to issue.
#[derive(Debug, Clone)]
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issuer for CertificateWithPrivateKey {
    fn issuer_name(&self) -> RelativeDistinguishedNames {
        // The name of the issuer is the subject of the certificate
        self.cert.subject().clone()
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }
}
