use der::{Decode, Encode};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::{RsaPrivateKey, RsaPublicKey, pkcs1::DecodeRsaPublicKey};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::error::{CertPathError, Result};
use crate::oid;

/// P-521 verifying key. Only verification is offered for this curve.
pub type P521VerifyingKey = ecdsa::VerifyingKey<p521::NistP521>;

/// Padding scheme an RSA key signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsaPadding {
    #[default]
    Pkcs1v15,
    Pss,
}

/// Supported key types for signing operations.
#[derive(Debug, Clone)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
        padding: RsaPadding,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CertPathError::KeyGenerationError(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
            padding: RsaPadding::Pkcs1v15,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P256SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P384SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Marks an RSA key to sign with RSASSA-PSS. Other keys are returned unchanged.
    pub fn with_rsa_pss(self) -> Self {
        match self {
            KeyPair::Rsa { private, public, .. } => KeyPair::Rsa {
                private,
                public,
                padding: RsaPadding::Pss,
            },
            other => other,
        }
    }

    /// Returns the public half of the key pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_key_pair(self)
    }

    /// Builds the SubjectPublicKeyInfo for the public half of the key pair.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        self.public_key().to_spki()
    }

    /// Imports an unencrypted PKCS#8 `PrivateKeyInfo` (RSA, P-256 or P-384).
    pub fn import_from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = pkcs8::PrivateKeyInfo::try_from(der)?;
        match info.algorithm.oid {
            oid::RSA_ENCRYPTION | oid::ID_RSASSA_PSS => {
                let private = RsaPrivateKey::from_pkcs8_der(der)?;
                let public = RsaPublicKey::from(&private);
                let padding = if info.algorithm.oid == oid::ID_RSASSA_PSS {
                    RsaPadding::Pss
                } else {
                    RsaPadding::Pkcs1v15
                };
                Ok(KeyPair::Rsa {
                    private: Box::new(private),
                    public,
                    padding,
                })
            }
            oid::ID_EC_PUBLIC_KEY => match info.algorithm.parameters_oid()? {
                oid::SECP_256_R_1 => {
                    let signing_key = P256SigningKey::from_pkcs8_der(der)?;
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP256 {
                        signing_key,
                        verifying_key,
                    })
                }
                oid::SECP_384_R_1 => {
                    let signing_key = P384SigningKey::from_pkcs8_der(der)?;
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP384 {
                        signing_key,
                        verifying_key,
                    })
                }
                curve => Err(CertPathError::UnsupportedAlgorithm(format!(
                    "unsupported named curve {curve}"
                ))),
            },
            other => Err(CertPathError::UnsupportedAlgorithm(format!(
                "unsupported private key algorithm {other}"
            ))),
        }
    }

    /// Imports a PEM `PRIVATE KEY` block.
    pub fn import_from_pkcs8_pem(pem_str: &str) -> Result<Self> {
        let der = crate::pem_utils::pem_to_der(pem_str, crate::pem_utils::PRIVATE_KEY_LABEL)?;
        Self::import_from_pkcs8_der(&der)
    }

    /// Exports the key as an unencrypted PKCS#8 `PrivateKeyInfo`.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            KeyPair::Rsa { private, .. } => private.to_pkcs8_der()?,
            KeyPair::EcdsaP256 { signing_key, .. } => signing_key.to_pkcs8_der()?,
            KeyPair::EcdsaP384 { signing_key, .. } => signing_key.to_pkcs8_der()?,
        };
        Ok(document.as_bytes().to_vec())
    }
}

/// A public key usable for signature verification.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
    EcdsaP521(P521VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
        }
    }

    /// Imports a key from its SubjectPublicKeyInfo.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let key_bytes = spki.subject_public_key.raw_bytes();
        match spki.algorithm.oid {
            oid::RSA_ENCRYPTION | oid::ID_RSASSA_PSS => {
                Ok(PublicKey::Rsa(RsaPublicKey::from_pkcs1_der(key_bytes)?))
            }
            oid::ID_EC_PUBLIC_KEY => {
                let parameters = spki.algorithm.parameters.as_ref().ok_or_else(|| {
                    CertPathError::InvalidInput("EC public key without named curve".to_string())
                })?;
                let curve = der::asn1::ObjectIdentifier::from_der(&parameters.to_der()?)?;
                match curve {
                    oid::SECP_256_R_1 => Ok(PublicKey::EcdsaP256(
                        P256VerifyingKey::from_sec1_bytes(key_bytes)?,
                    )),
                    oid::SECP_384_R_1 => Ok(PublicKey::EcdsaP384(
                        P384VerifyingKey::from_sec1_bytes(key_bytes)?,
                    )),
                    oid::SECP_521_R_1 => Ok(PublicKey::EcdsaP521(
                        P521VerifyingKey::from_sec1_bytes(key_bytes)?,
                    )),
                    other => Err(CertPathError::UnsupportedAlgorithm(format!(
                        "unsupported named curve {other}"
                    ))),
                }
            }
            other => Err(CertPathError::UnsupportedAlgorithm(format!(
                "unsupported public key algorithm {other}"
            ))),
        }
    }

    /// Encodes the key as a SubjectPublicKeyInfo.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        match self {
            PublicKey::Rsa(public) => Ok(SubjectPublicKeyInfoOwned::from_key(public.clone())?),
            PublicKey::EcdsaP256(key) => Ok(SubjectPublicKeyInfoOwned::from_key(*key)?),
            PublicKey::EcdsaP384(key) => Ok(SubjectPublicKeyInfoOwned::from_key(*key)?),
            PublicKey::EcdsaP521(key) => {
                let point = key.to_encoded_point(false);
                Ok(SubjectPublicKeyInfoOwned {
                    algorithm: AlgorithmIdentifierOwned {
                        oid: oid::ID_EC_PUBLIC_KEY,
                        parameters: Some(der::Any::encode_from(&oid::SECP_521_R_1)?),
                    },
                    subject_public_key: der::asn1::BitString::from_bytes(point.as_bytes())?,
                })
            }
        }
    }

    /// Byte length of one ECDSA signature component, `None` for RSA.
    pub fn field_len(&self) -> Option<usize> {
        match self {
            PublicKey::Rsa(_) => None,
            PublicKey::EcdsaP256(_) => Some(32),
            PublicKey::EcdsaP384(_) => Some(48),
            PublicKey::EcdsaP521(_) => Some(66),
        }
    }
}
