//! Signature algorithm selection and the sign / verify routine shared by
//! certificates, CRLs and certification requests.

use der::Any;
use der::asn1::BitString;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::Certificate;
use crate::crypto::{CryptoEngine, SignatureParams, ecdsa_signature_from_der, ecdsa_signature_to_der};
use crate::error::{CertPathError, Result};
use crate::key::{KeyPair, PublicKey};
use crate::oid::{self, HashAlgorithm};
use crate::pki::{AlgorithmIdentifier, RsaPssParams, Simplified};

/// Key material a signed object is verified with.
#[derive(Debug, Clone, Copy)]
pub enum SignerKey<'a> {
    /// The certificate of the issuer; its subject public key is used.
    IssuerCertificate(&'a Certificate),
    PublicKeyInfo(&'a SubjectPublicKeyInfoOwned),
}

impl<'a> SignerKey<'a> {
    pub fn public_key_info(&self) -> &'a SubjectPublicKeyInfoOwned {
        match *self {
            SignerKey::IssuerCertificate(cert) => {
                &cert.tbs_certificate.subject_public_key_info
            }
            SignerKey::PublicKeyInfo(spki) => spki,
        }
    }
}

/// Picks the signature AlgorithmIdentifier for `key` and `hash`, together with the
/// provider parameters that produce it.
pub fn signature_algorithm(
    key: &KeyPair,
    hash: HashAlgorithm,
) -> Result<(AlgorithmIdentifier, SignatureParams)> {
    let params = SignatureParams::for_key(key, hash);
    let algorithm = match params {
        SignatureParams::RsaPkcs1 { hash } => {
            let id = match hash {
                HashAlgorithm::Sha1 => oid::SHA_1_WITH_RSA_ENCRYPTION,
                HashAlgorithm::Sha256 => oid::SHA_256_WITH_RSA_ENCRYPTION,
                HashAlgorithm::Sha384 => oid::SHA_384_WITH_RSA_ENCRYPTION,
                HashAlgorithm::Sha512 => oid::SHA_512_WITH_RSA_ENCRYPTION,
            };
            AlgorithmIdentifier::with_null_params(id)?
        }
        SignatureParams::RsaPss { hash, .. } => {
            // SHA-1 leaves every field at its default, giving an empty SEQUENCE
            let pss = RsaPssParams::for_hash(hash)?;
            AlgorithmIdentifier {
                algorithm_id: oid::ID_RSASSA_PSS,
                algorithm_params: Some(Any::encode_from(&pss.to_schema()?)?),
            }
        }
        SignatureParams::Ecdsa { hash } => AlgorithmIdentifier::new(match hash {
            HashAlgorithm::Sha1 => oid::ECDSA_WITH_SHA_1,
            HashAlgorithm::Sha256 => oid::ECDSA_WITH_SHA_256,
            HashAlgorithm::Sha384 => oid::ECDSA_WITH_SHA_384,
            HashAlgorithm::Sha512 => oid::ECDSA_WITH_SHA_512,
        }),
    };
    Ok((algorithm, params))
}

/// Reads provider parameters back from a signature AlgorithmIdentifier.
pub fn params_from_algorithm(algorithm: &AlgorithmIdentifier) -> Result<SignatureParams> {
    let params = match algorithm.algorithm_id {
        oid::SHA_1_WITH_RSA_ENCRYPTION => SignatureParams::RsaPkcs1 {
            hash: HashAlgorithm::Sha1,
        },
        oid::SHA_256_WITH_RSA_ENCRYPTION => SignatureParams::RsaPkcs1 {
            hash: HashAlgorithm::Sha256,
        },
        oid::SHA_384_WITH_RSA_ENCRYPTION => SignatureParams::RsaPkcs1 {
            hash: HashAlgorithm::Sha384,
        },
        oid::SHA_512_WITH_RSA_ENCRYPTION => SignatureParams::RsaPkcs1 {
            hash: HashAlgorithm::Sha512,
        },
        oid::ECDSA_WITH_SHA_1 => SignatureParams::Ecdsa {
            hash: HashAlgorithm::Sha1,
        },
        oid::ECDSA_WITH_SHA_256 => SignatureParams::Ecdsa {
            hash: HashAlgorithm::Sha256,
        },
        oid::ECDSA_WITH_SHA_384 => SignatureParams::Ecdsa {
            hash: HashAlgorithm::Sha384,
        },
        oid::ECDSA_WITH_SHA_512 => SignatureParams::Ecdsa {
            hash: HashAlgorithm::Sha512,
        },
        oid::ID_RSASSA_PSS => {
            let pss = RsaPssParams::from_algorithm(algorithm)?;
            SignatureParams::RsaPss {
                hash: pss.hash()?,
                salt_length: pss.salt_length as usize,
            }
        }
        other => {
            return Err(CertPathError::UnsupportedAlgorithm(format!(
                "signature algorithm {other} is not supported"
            )));
        }
    };
    Ok(params)
}

/// Signs `tbs` and returns the signature algorithm with the encoded signature value.
pub fn sign_tbs(
    engine: &dyn CryptoEngine,
    key: &KeyPair,
    hash: HashAlgorithm,
    tbs: &[u8],
) -> Result<(AlgorithmIdentifier, BitString)> {
    let (algorithm, params) = signature_algorithm(key, hash)?;
    let mut signature = engine.sign(&params, key, tbs)?;
    if let SignatureParams::Ecdsa { .. } = params {
        signature = ecdsa_signature_to_der(&signature)?;
    }
    Ok((algorithm, BitString::from_bytes(&signature)?))
}

/// Verifies `signature` over `tbs`. A signature value that cannot be unwrapped is
/// reported as not matching.
pub fn verify_tbs(
    engine: &dyn CryptoEngine,
    algorithm: &AlgorithmIdentifier,
    spki: &SubjectPublicKeyInfoOwned,
    signature: &BitString,
    tbs: &[u8],
) -> Result<bool> {
    let params = params_from_algorithm(algorithm)?;
    let public_key: PublicKey = engine.import_public_key(spki)?;
    let Some(signature) = signature.as_bytes() else {
        return Ok(false);
    };

    let signature = match (params, public_key.field_len()) {
        (SignatureParams::Ecdsa { .. }, Some(field_len)) => {
            match ecdsa_signature_from_der(signature, field_len) {
                Ok(raw) => raw,
                Err(err) => {
                    log::debug!("ECDSA signature value does not unwrap: {err}");
                    return Ok(false);
                }
            }
        }
        _ => signature.to_vec(),
    };
    engine.verify(&params, &public_key, &signature, tbs)
}
