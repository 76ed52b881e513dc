//! PKCS#8 private key containers.

use der::asn1::{BitString, OctetString, SetOfVec};

use crate::crypto::{CryptoEngine, RustCrypto};
use crate::error::{CertPathError, Result};
use crate::key::KeyPair;
use crate::oid;
use crate::pem_utils::{self, PRIVATE_KEY_LABEL};
use crate::pki::algorithm::RsaPrivateKey;
use crate::pki::schema::PrivateKeyInfoSchema;
use crate::pki::{AlgorithmIdentifier, Attribute, Simplified};

/// An unencrypted `PrivateKeyInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyInfo {
    pub version: u8,
    pub private_key_algorithm: AlgorithmIdentifier,
    /// Algorithm-specific key encoding, e.g. PKCS#1 `RSAPrivateKey` for RSA.
    pub private_key: Vec<u8>,
    pub attributes: Vec<Attribute>,
    pub public_key: Option<BitString>,
}

impl Simplified for PrivateKeyInfo {
    type Schema = PrivateKeyInfoSchema;
    const NAME: &'static str = "PrivateKeyInfo";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            version: schema.version,
            private_key_algorithm: schema.private_key_algorithm.into(),
            private_key: schema.private_key.into_bytes(),
            attributes: schema
                .attributes
                .map(|attributes| {
                    attributes
                        .iter()
                        .cloned()
                        .map(Attribute::from_schema)
                        .collect::<Result<Vec<_>>>()
                })
                .transpose()?
                .unwrap_or_default(),
            public_key: schema.public_key,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let attributes = if self.attributes.is_empty() {
            None
        } else {
            let attributes = self
                .attributes
                .iter()
                .map(Attribute::to_schema)
                .collect::<Result<Vec<_>>>()?;
            Some(SetOfVec::try_from(attributes)?)
        };
        Ok(PrivateKeyInfoSchema {
            version: self.version,
            private_key_algorithm: self.private_key_algorithm.clone().into_owned(),
            private_key: OctetString::new(self.private_key.clone())?,
            attributes,
            public_key: self.public_key.clone(),
        })
    }
}

impl PrivateKeyInfo {
    pub fn from_key_pair(key: &KeyPair) -> Result<Self> {
        Self::from_der(&key.to_pkcs8_der()?)
    }

    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem_str, PRIVATE_KEY_LABEL)?)
    }

    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, PRIVATE_KEY_LABEL))
    }

    /// Imports the key through the crypto provider.
    pub fn to_key_pair(&self) -> Result<KeyPair> {
        RustCrypto.import_private_key(&self.to_der()?)
    }

    /// The PKCS#1 structure inside an RSA key.
    pub fn rsa_private_key(&self) -> Result<RsaPrivateKey> {
        match self.private_key_algorithm.algorithm_id {
            oid::RSA_ENCRYPTION | oid::ID_RSASSA_PSS => RsaPrivateKey::from_der(&self.private_key),
            other => Err(CertPathError::InvalidInput(format!(
                "{other} is not an RSA key"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PublicKey;
    use rsa::traits::PublicKeyParts;

    #[test]
    fn imported_key_signs_like_the_original() {
        let key = KeyPair::generate_ecdsa_p256();
        let info = PrivateKeyInfo::from_pem(
            &PrivateKeyInfo::from_key_pair(&key).unwrap().to_pem().unwrap(),
        )
        .unwrap();
        assert_eq!(info.private_key_algorithm.algorithm_id, oid::ID_EC_PUBLIC_KEY);

        let imported = info.to_key_pair().unwrap();
        let (PublicKey::EcdsaP256(original), PublicKey::EcdsaP256(restored)) =
            (PublicKey::from_key_pair(&key), imported.public_key())
        else {
            panic!("expected P-256 keys");
        };
        assert_eq!(original, restored);
    }

    #[test]
    fn rsa_key_exposes_pkcs1_fields() {
        let key = KeyPair::generate_rsa(1024).unwrap();
        let info = PrivateKeyInfo::from_key_pair(&key).unwrap();
        let rsa = info.rsa_private_key().unwrap();
        let KeyPair::Rsa { public, .. } = &key else {
            panic!("expected an RSA key");
        };
        assert_eq!(rsa.modulus, public.n().to_bytes_be());
        assert_eq!(rsa.public_exponent, public.e().to_bytes_be());

        let ec = PrivateKeyInfo::from_key_pair(&KeyPair::generate_ecdsa_p256()).unwrap();
        assert!(ec.rsa_private_key().is_err());
    }

    #[test]
    fn schema_mismatch_names_the_structure() {
        let err = PrivateKeyInfo::from_der(&[0x30, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            CertPathError::SchemaMismatch {
                structure: "PrivateKeyInfo",
                ..
            }
        ));
    }
}
