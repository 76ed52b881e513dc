use der::asn1::BitString;
use x509_cert::Version;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::Result;
use crate::pki::{AlgorithmIdentifier, Extension, RelativeDistinguishedNames, Simplified, Time};

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// # Fields
/// * `version` - Certificate version, V3 whenever extensions are present.
/// * `serial_number` - Content octets of the serial number INTEGER.
/// * `signature` - The signature algorithm, repeated inside the signed part.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `not_before` - The start of the certificate's validity period.
/// * `not_after` - The end of the certificate's validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The public key of the certificate subject.
/// * `extensions` - X.509 extensions, `None` when the field is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsCertificate {
    pub version: Version,
    pub serial_number: Vec<u8>,
    pub signature: AlgorithmIdentifier,
    pub issuer: RelativeDistinguishedNames,
    pub not_before: Time,
    pub not_after: Time,
    pub subject: RelativeDistinguishedNames,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub issuer_unique_id: Option<BitString>,
    pub subject_unique_id: Option<BitString>,
    pub extensions: Option<Vec<Extension>>,
}

impl Simplified for TbsCertificate {
    type Schema = x509_cert::TbsCertificate;
    const NAME: &'static str = "TBSCertificate";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let extensions = schema
            .extensions
            .map(|extensions| {
                extensions
                    .into_iter()
                    .map(Extension::from_schema)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            version: schema.version,
            serial_number: schema.serial_number.as_bytes().to_vec(),
            signature: schema.signature.into(),
            issuer: RelativeDistinguishedNames::from_schema(schema.issuer)?,
            not_before: Time::from_schema(schema.validity.not_before)?,
            not_after: Time::from_schema(schema.validity.not_after)?,
            subject: RelativeDistinguishedNames::from_schema(schema.subject)?,
            subject_public_key_info: schema.subject_public_key_info,
            issuer_unique_id: schema.issuer_unique_id,
            subject_unique_id: schema.subject_unique_id,
            extensions,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let extensions = self
            .extensions
            .as_ref()
            .map(|extensions| {
                extensions
                    .iter()
                    .map(Extension::to_schema)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(x509_cert::TbsCertificate {
            version: self.version,
            serial_number: SerialNumber::new(&self.serial_number)?,
            signature: self.signature.clone().into_owned(),
            issuer: self.issuer.to_schema()?,
            validity: x509_cert::time::Validity {
                not_before: self.not_before.to_schema()?,
                not_after: self.not_after.to_schema()?,
            },
            subject: self.subject.to_schema()?,
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: self.issuer_unique_id.clone(),
            subject_unique_id: self.subject_unique_id.clone(),
            extensions,
        })
    }
}
