//! PKCS#10 certification requests.

use der::asn1::{BitString, SetOfVec};
use der::{Any, Decode, Encode};
use x509_cert::request::{CertReqInfo, Version};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::crypto::RustCrypto;
use crate::error::{CertPathError, Result};
use crate::key::KeyPair;
use crate::oid::{self, HashAlgorithm};
use crate::pem_utils::{self, CSR_LABEL};
use crate::pki::schema::SignedSchema;
use crate::pki::{
    AlgorithmIdentifier, Attribute, Extension, RelativeDistinguishedNames, Simplified, convert,
};
use crate::signature::{self, SignerKey};

/// A certification request. The signature is made with the key it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationRequest {
    pub tbs: Vec<u8>,
    pub subject: RelativeDistinguishedNames,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub attributes: Vec<Attribute>,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature_value: BitString,
}

fn request_info_from(tbs: &[u8]) -> Result<CertReqInfo> {
    CertReqInfo::from_der(tbs).map_err(|e| CertPathError::schema("CertificationRequestInfo", e))
}

impl Simplified for CertificationRequest {
    type Schema = SignedSchema;
    const NAME: &'static str = "CertificationRequest";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let tbs = schema.tbs.to_der()?;
        let info = request_info_from(&tbs)?;
        Ok(Self {
            subject: RelativeDistinguishedNames::from_schema(info.subject)?,
            subject_public_key_info: info.public_key,
            attributes: info
                .attributes
                .iter()
                .cloned()
                .map(Attribute::from_schema)
                .collect::<Result<Vec<_>>>()?,
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

impl CertificationRequest {
    /// An unsigned request; call [`CertificationRequest::sign`] next.
    pub fn new(
        subject: RelativeDistinguishedNames,
        subject_public_key_info: SubjectPublicKeyInfoOwned,
        attributes: Vec<Attribute>,
    ) -> Result<Self> {
        let mut request = Self {
            tbs: Vec::new(),
            subject,
            subject_public_key_info,
            attributes,
            signature_algorithm: AlgorithmIdentifier::new(oid::ECDSA_WITH_SHA_256),
            signature_value: BitString::from_bytes(&[])?,
        };
        request.encode_tbs()?;
        Ok(request)
    }

    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem_str, CSR_LABEL)?)
    }

    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CSR_LABEL))
    }

    /// Re-encodes `tbs` from the current field values.
    pub fn encode_tbs(&mut self) -> Result<()> {
        let attributes = self
            .attributes
            .iter()
            .map(Attribute::to_schema)
            .collect::<Result<Vec<_>>>()?;
        let info = CertReqInfo {
            version: Version::V1,
            subject: self.subject.to_schema()?,
            public_key: self.subject_public_key_info.clone(),
            attributes: SetOfVec::try_from(attributes)?,
        };
        self.tbs = info.to_der()?;
        Ok(())
    }

    /// Adds a PKCS#9 extensionRequest attribute carrying `extensions`.
    pub fn request_extensions(&mut self, extensions: &[Extension]) -> Result<()> {
        let extensions = extensions
            .iter()
            .map(Extension::to_schema)
            .collect::<Result<Vec<_>>>()?;
        self.attributes
            .retain(|attribute| attribute.attr_type != oid::PKCS9_EXTENSION_REQUEST);
        self.attributes.push(Attribute {
            attr_type: oid::PKCS9_EXTENSION_REQUEST,
            values: vec![Any::encode_from(&extensions)?],
        });
        Ok(())
    }

    /// Extensions from the extensionRequest attribute, empty when there is none.
    pub fn requested_extensions(&self) -> Result<Vec<Extension>> {
        let Some(attribute) = self
            .attributes
            .iter()
            .find(|attribute| attribute.attr_type == oid::PKCS9_EXTENSION_REQUEST)
        else {
            return Ok(Vec::new());
        };
        let mut requested = Vec::new();
        for value in &attribute.values {
            let extensions: Vec<x509_cert::ext::Extension> = convert(value)?;
            for extension in extensions {
                requested.push(Extension::from_schema(extension)?);
            }
        }
        Ok(requested)
    }

    /// Signs the request with the subject's own key.
    pub fn sign(&mut self, key: &KeyPair, hash: HashAlgorithm) -> Result<()> {
        self.encode_tbs()?;
        let (algorithm, value) = signature::sign_tbs(&RustCrypto, key, hash, &self.tbs)?;
        self.signature_algorithm = algorithm;
        self.signature_value = value;
        Ok(())
    }

    /// Verifies the signature with the public key in the request.
    pub fn verify(&self) -> Result<bool> {
        let signer = SignerKey::PublicKeyInfo(&self.subject_public_key_info);
        signature::verify_tbs(
            &RustCrypto,
            &self.signature_algorithm,
            signer.public_key_info(),
            &self.signature_value,
            &self.tbs,
        )
    }
}
