//! Certificate revocation lists (RFC 5280 §5).

use der::asn1::BitString;
use der::{Any, Decode, Encode};
use x509_cert::Version;
use x509_cert::crl::RevokedCert;
use x509_cert::serial_number::SerialNumber;

use crate::cert::Certificate;
use crate::crypto::RustCrypto;
use crate::error::Result;
use crate::key::KeyPair;
use crate::oid::HashAlgorithm;
use crate::pem_utils::{self, CRL_LABEL};
use crate::pki::extension::{KnownExtension, find_extension};
use crate::pki::schema::{SignedSchema, TbsCertListSchema};
use crate::pki::{AlgorithmIdentifier, Extension, RelativeDistinguishedNames, Simplified, Time};
use crate::signature::{self, SignerKey};

/// One `revokedCertificates` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedCertificate {
    /// Serial number content octets.
    pub user_certificate: Vec<u8>,
    pub revocation_date: Time,
    pub crl_entry_extensions: Option<Vec<Extension>>,
}

impl RevokedCertificate {
    pub fn new(user_certificate: Vec<u8>, revocation_date: Time) -> Self {
        Self {
            user_certificate,
            revocation_date,
            crl_entry_extensions: None,
        }
    }

    pub fn entry_extension<T: KnownExtension>(&self) -> Option<&T> {
        find_extension(self.crl_entry_extensions.as_deref().unwrap_or_default())
    }
}

fn extensions_from(schema: Option<Vec<x509_cert::ext::Extension>>) -> Result<Option<Vec<Extension>>> {
    schema
        .map(|extensions| {
            extensions
                .into_iter()
                .map(Extension::from_schema)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()
}

fn extensions_to(extensions: &Option<Vec<Extension>>) -> Result<Option<Vec<x509_cert::ext::Extension>>> {
    extensions
        .as_ref()
        .map(|extensions| extensions.iter().map(Extension::to_schema).collect())
        .transpose()
}

impl Simplified for RevokedCertificate {
    type Schema = RevokedCert;
    const NAME: &'static str = "RevokedCertificate";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            user_certificate: schema.serial_number.as_bytes().to_vec(),
            revocation_date: Time::from_schema(schema.revocation_date)?,
            crl_entry_extensions: extensions_from(schema.crl_entry_extensions)?,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(RevokedCert {
            serial_number: SerialNumber::new(&self.user_certificate)?,
            revocation_date: self.revocation_date.to_schema()?,
            crl_entry_extensions: extensions_to(&self.crl_entry_extensions)?,
        })
    }
}

/// The signed part of a CRL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsCertList {
    /// `None` for v1 lists that omit the field.
    pub version: Option<Version>,
    pub signature: AlgorithmIdentifier,
    pub issuer: RelativeDistinguishedNames,
    pub this_update: Time,
    pub next_update: Option<Time>,
    pub revoked_certificates: Vec<RevokedCertificate>,
    pub crl_extensions: Option<Vec<Extension>>,
}

impl Simplified for TbsCertList {
    type Schema = TbsCertListSchema;
    const NAME: &'static str = "TBSCertList";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            version: schema.version,
            signature: schema.signature.into(),
            issuer: RelativeDistinguishedNames::from_schema(schema.issuer)?,
            this_update: Time::from_schema(schema.this_update)?,
            next_update: schema.next_update.map(Time::from_schema).transpose()?,
            revoked_certificates: schema
                .revoked_certificates
                .unwrap_or_default()
                .into_iter()
                .map(RevokedCertificate::from_schema)
                .collect::<Result<Vec<_>>>()?,
            crl_extensions: extensions_from(schema.crl_extensions)?,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let revoked_certificates = if self.revoked_certificates.is_empty() {
            None
        } else {
            Some(
                self.revoked_certificates
                    .iter()
                    .map(RevokedCertificate::to_schema)
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        Ok(TbsCertListSchema {
            version: self.version,
            signature: self.signature.clone().into_owned(),
            issuer: self.issuer.to_schema()?,
            this_update: self.this_update.to_schema()?,
            next_update: self.next_update.map(|time| time.to_schema()).transpose()?,
            revoked_certificates,
            crl_extensions: extensions_to(&self.crl_extensions)?,
        })
    }
}

/// A certificate revocation list with its exact signed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crl {
    pub tbs: Vec<u8>,
    pub tbs_cert_list: TbsCertList,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature_value: BitString,
}

impl Simplified for Crl {
    type Schema = SignedSchema;
    const NAME: &'static str = "CertificateList";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let tbs = schema.tbs.to_der()?;
        Ok(Self {
            tbs_cert_list: TbsCertList::from_der(&tbs)?,
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

impl Crl {
    /// An unsigned v2 CRL; call [`Crl::sign`] next.
    pub fn new(
        issuer: RelativeDistinguishedNames,
        this_update: Time,
        next_update: Option<Time>,
        revoked_certificates: Vec<RevokedCertificate>,
    ) -> Result<Self> {
        let tbs_cert_list = TbsCertList {
            version: Some(Version::V2),
            signature: AlgorithmIdentifier::new(crate::oid::ECDSA_WITH_SHA_256),
            issuer,
            this_update,
            next_update,
            revoked_certificates,
            crl_extensions: None,
        };
        Ok(Self {
            tbs: tbs_cert_list.to_der()?,
            signature_algorithm: tbs_cert_list.signature.clone(),
            tbs_cert_list,
            signature_value: BitString::from_bytes(&[])?,
        })
    }

    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem_str, CRL_LABEL)?)
    }

    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CRL_LABEL))
    }

    pub fn issuer(&self) -> &RelativeDistinguishedNames {
        &self.tbs_cert_list.issuer
    }

    pub fn revoked_certificates(&self) -> &[RevokedCertificate] {
        &self.tbs_cert_list.revoked_certificates
    }

    pub fn extension<T: KnownExtension>(&self) -> Option<&T> {
        find_extension(self.tbs_cert_list.crl_extensions.as_deref().unwrap_or_default())
    }

    /// Re-encodes `tbs` from the current field values.
    pub fn encode_tbs(&mut self) -> Result<()> {
        self.tbs = self.tbs_cert_list.to_der()?;
        Ok(())
    }

    /// Signs the list with the issuer's key.
    pub fn sign(&mut self, key: &KeyPair, hash: HashAlgorithm) -> Result<()> {
        let (algorithm, _) = signature::signature_algorithm(key, hash)?;
        self.tbs_cert_list.signature = algorithm;
        self.encode_tbs()?;

        let (algorithm, value) = signature::sign_tbs(&RustCrypto, key, hash, &self.tbs)?;
        self.signature_algorithm = algorithm;
        self.signature_value = value;
        Ok(())
    }

    /// Verifies the signature with the issuer's key.
    pub fn verify(&self, issuer: SignerKey<'_>) -> Result<bool> {
        signature::verify_tbs(
            &RustCrypto,
            &self.signature_algorithm,
            issuer.public_key_info(),
            &self.signature_value,
            &self.tbs,
        )
    }

    /// The entry revoking `certificate`: issuers must match and serials must be equal.
    pub fn revoked_entry(&self, certificate: &Certificate) -> Option<&RevokedCertificate> {
        if certificate.issuer() != self.issuer() {
            return None;
        }
        self.revoked_certificates()
            .iter()
            .find(|entry| same_serial(&entry.user_certificate, certificate.serial_number()))
    }

    pub fn is_certificate_revoked(&self, certificate: &Certificate) -> bool {
        self.revoked_entry(certificate).is_some()
    }
}

/// Compares INTEGER content octets, ignoring leading zero octets.
fn same_serial(left: &[u8], right: &[u8]) -> bool {
    let trim = |bytes: &[u8]| -> Vec<u8> {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        bytes[start..].to_vec()
    };
    trim(left) == trim(right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertificateWithPrivateKey;
    use crate::cert::params::{CertificationRequestInfo, DistinguishedName, Validity};
    use crate::issuer::Issuer;
    use crate::key::PublicKey;
    use crate::pki::extensions::{CrlNumber, CrlReason, ReasonCode};
    use time::OffsetDateTime;

    fn issue(
        ca: &CertificateWithPrivateKey,
        common_name: &str,
        serial_number: Vec<u8>,
    ) -> Certificate {
        let key = KeyPair::generate_ecdsa_p256();
        let info = CertificationRequestInfo::builder()
            .subject(
                DistinguishedName::builder()
                    .common_name(common_name.to_string())
                    .build(),
            )
            .subject_public_key(PublicKey::from_key_pair(&key))
            .serial_number(serial_number)
            .build();
        ca.issue(&info, Validity::for_days(10)).unwrap()
    }

    fn ca(common_name: &str) -> CertificateWithPrivateKey {
        let key = KeyPair::generate_ecdsa_p256();
        let info = CertificationRequestInfo::builder()
            .subject(
                DistinguishedName::builder()
                    .common_name(common_name.to_string())
                    .build(),
            )
            .subject_public_key(PublicKey::from_key_pair(&key))
            .is_ca(true)
            .build();
        CertificateWithPrivateKey {
            cert: Certificate::new_self_signed(&info, &key).unwrap(),
            key,
        }
    }

    #[test]
    fn revocation_matches_issuer_and_serial() {
        let authority = ca("crl-ca.test");
        let stranger = ca("other-ca.test");
        let now = Time::from_date(OffsetDateTime::now_utc()).unwrap();

        let mut crl = Crl::new(
            authority.cert.subject().clone(),
            now,
            None,
            vec![RevokedCertificate::new(vec![0x01], now)],
        )
        .unwrap();
        crl.sign(&authority.key, HashAlgorithm::Sha256).unwrap();

        assert!(crl.is_certificate_revoked(&issue(&authority, "a", vec![0x01])));
        assert!(!crl.is_certificate_revoked(&issue(&authority, "b", vec![0x02])));
        assert!(!crl.is_certificate_revoked(&issue(&stranger, "c", vec![0x01])));
    }

    #[test]
    fn signed_list_verifies_with_issuer_only() {
        let authority = ca("crl-ca.test");
        let stranger = ca("other-ca.test");
        let now = Time::from_date(OffsetDateTime::now_utc()).unwrap();

        let mut entry = RevokedCertificate::new(vec![0x05], now);
        entry.crl_entry_extensions =
            Some(vec![Extension::new(CrlReason(ReasonCode::KeyCompromise), false).unwrap()]);
        let mut crl = Crl::new(authority.cert.subject().clone(), now, Some(now), vec![entry]).unwrap();
        crl.tbs_cert_list.crl_extensions =
            Some(vec![Extension::new(CrlNumber(vec![0x07]), false).unwrap()]);
        crl.sign(&authority.key, HashAlgorithm::Sha384).unwrap();

        let decoded = Crl::from_pem(&crl.to_pem().unwrap()).unwrap();
        assert_eq!(decoded, crl);
        assert!(decoded.verify(SignerKey::IssuerCertificate(&authority.cert)).unwrap());
        assert!(!decoded.verify(SignerKey::IssuerCertificate(&stranger.cert)).unwrap());
        assert_eq!(decoded.extension::<CrlNumber>(), Some(&CrlNumber(vec![0x07])));
        assert_eq!(
            decoded.revoked_certificates()[0].entry_extension::<CrlReason>(),
            Some(&CrlReason(ReasonCode::KeyCompromise))
        );
    }

    #[test]
    fn v1_list_without_version_decodes() {
        let authority = ca("v1.test");
        let now = Time::from_date(OffsetDateTime::now_utc()).unwrap();
        let mut crl = Crl::new(authority.cert.subject().clone(), now, None, vec![]).unwrap();
        crl.tbs_cert_list.version = None;
        crl.sign(&authority.key, HashAlgorithm::Sha256).unwrap();

        let decoded = Crl::from_der(&crl.to_der().unwrap()).unwrap();
        assert_eq!(decoded.tbs_cert_list.version, None);
        assert!(decoded.revoked_certificates().is_empty());
    }

    #[test]
    fn serial_comparison_ignores_sign_octet() {
        assert!(same_serial(&[0x00, 0x80], &[0x80]));
        assert!(!same_serial(&[0x01], &[0x01, 0x00]));
    }
}
