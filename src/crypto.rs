//! Cryptographic provider seam.
//!
//! Everything above this module talks to keys through [`CryptoEngine`]: key
//! import, signing, verification and digests. [`RustCrypto`] is the default
//! implementation on the RustCrypto crates. ECDSA signatures cross the seam as raw
//! `r || s`; the X9.62 `SEQUENCE { r, s }` form used inside certificates is produced
//! by [`ecdsa_signature_to_der`] and undone by [`ecdsa_signature_from_der`].

use der::asn1::Uint;
use der::{Decode, Encode};
use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rsa::{Pkcs1v15Sign, Pss};
use sha2::Digest;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{CertPathError, Result};
use crate::key::{KeyPair, PublicKey, RsaPadding};
use crate::oid::HashAlgorithm;

/// Algorithm parameters handed to the provider for sign and verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureParams {
    RsaPkcs1 { hash: HashAlgorithm },
    RsaPss { hash: HashAlgorithm, salt_length: usize },
    Ecdsa { hash: HashAlgorithm },
}

impl SignatureParams {
    pub fn hash(&self) -> HashAlgorithm {
        match *self {
            SignatureParams::RsaPkcs1 { hash }
            | SignatureParams::RsaPss { hash, .. }
            | SignatureParams::Ecdsa { hash } => hash,
        }
    }

    /// Parameters a key signs with by default for `hash`.
    pub fn for_key(key: &KeyPair, hash: HashAlgorithm) -> Self {
        match key {
            KeyPair::Rsa {
                padding: RsaPadding::Pss,
                ..
            } => SignatureParams::RsaPss {
                hash,
                salt_length: hash.output_len(),
            },
            KeyPair::Rsa { .. } => SignatureParams::RsaPkcs1 { hash },
            KeyPair::EcdsaP256 { .. } | KeyPair::EcdsaP384 { .. } => {
                SignatureParams::Ecdsa { hash }
            }
        }
    }
}

/// Key import, sign, verify and digest primitives.
///
/// Every call is a single-outcome `Result`. `verify` answers `Ok(false)` for a
/// signature that does not match and keeps `Err` for unusable input.
pub trait CryptoEngine {
    fn import_public_key(&self, spki: &SubjectPublicKeyInfoOwned) -> Result<PublicKey>;

    fn import_private_key(&self, pkcs8_der: &[u8]) -> Result<KeyPair>;

    /// Signs `data`. ECDSA results are raw `r || s`.
    fn sign(&self, params: &SignatureParams, key: &KeyPair, data: &[u8]) -> Result<Vec<u8>>;

    /// Verifies a signature over `data`. ECDSA signatures are raw `r || s`.
    fn verify(
        &self,
        params: &SignatureParams,
        key: &PublicKey,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool>;

    fn digest(&self, hash: HashAlgorithm, data: &[u8]) -> Vec<u8>;
}

/// [`CryptoEngine`] backed by `rsa`, `p256`, `p384`, `p521`, `sha1` and `sha2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCrypto;

/// Expands `$body` once per hash with `$digest` bound to the matching digest type.
macro_rules! with_digest {
    ($hash:expr, $digest:ident => $body:expr) => {
        match $hash {
            HashAlgorithm::Sha1 => {
                type $digest = sha1::Sha1;
                $body
            }
            HashAlgorithm::Sha256 => {
                type $digest = sha2::Sha256;
                $body
            }
            HashAlgorithm::Sha384 => {
                type $digest = sha2::Sha384;
                $body
            }
            HashAlgorithm::Sha512 => {
                type $digest = sha2::Sha512;
                $body
            }
        }
    };
}

impl CryptoEngine for RustCrypto {
    fn import_public_key(&self, spki: &SubjectPublicKeyInfoOwned) -> Result<PublicKey> {
        PublicKey::from_x509spki(spki)
    }

    fn import_private_key(&self, pkcs8_der: &[u8]) -> Result<KeyPair> {
        KeyPair::import_from_pkcs8_der(pkcs8_der)
    }

    fn sign(&self, params: &SignatureParams, key: &KeyPair, data: &[u8]) -> Result<Vec<u8>> {
        let hashed = self.digest(params.hash(), data);
        match (params, key) {
            (SignatureParams::RsaPkcs1 { hash }, KeyPair::Rsa { private, .. }) => {
                let signature =
                    with_digest!(*hash, D => private.sign(Pkcs1v15Sign::new::<D>(), &hashed))?;
                Ok(signature)
            }
            (SignatureParams::RsaPss { hash, salt_length }, KeyPair::Rsa { private, .. }) => {
                let mut rng = rand_core::OsRng;
                let signature = with_digest!(*hash, D => private.sign_with_rng(
                    &mut rng,
                    Pss::new_with_salt::<D>(*salt_length),
                    &hashed
                ))?;
                Ok(signature)
            }
            (SignatureParams::Ecdsa { .. }, KeyPair::EcdsaP256 { signing_key, .. }) => {
                let signature: p256::ecdsa::Signature =
                    signing_key.sign_prehash(&ecdsa_prehash(&hashed, 32))?;
                Ok(signature.to_bytes().to_vec())
            }
            (SignatureParams::Ecdsa { .. }, KeyPair::EcdsaP384 { signing_key, .. }) => {
                let signature: p384::ecdsa::Signature =
                    signing_key.sign_prehash(&ecdsa_prehash(&hashed, 48))?;
                Ok(signature.to_bytes().to_vec())
            }
            (params, _) => Err(CertPathError::UnsupportedAlgorithm(format!(
                "{params:?} cannot be used with this key type"
            ))),
        }
    }

    fn verify(
        &self,
        params: &SignatureParams,
        key: &PublicKey,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool> {
        let hashed = self.digest(params.hash(), data);
        let outcome = match (params, key) {
            (SignatureParams::RsaPkcs1 { hash }, PublicKey::Rsa(public)) => {
                with_digest!(*hash, D => public.verify(Pkcs1v15Sign::new::<D>(), &hashed, signature))
                    .is_ok()
            }
            (SignatureParams::RsaPss { hash, salt_length }, PublicKey::Rsa(public)) => {
                with_digest!(*hash, D => public.verify(
                    Pss::new_with_salt::<D>(*salt_length),
                    &hashed,
                    signature
                ))
                .is_ok()
            }
            (SignatureParams::Ecdsa { .. }, PublicKey::EcdsaP256(verifying_key)) => {
                match p256::ecdsa::Signature::from_slice(signature) {
                    Ok(sig) => verifying_key
                        .verify_prehash(&ecdsa_prehash(&hashed, 32), &sig)
                        .is_ok(),
                    Err(_) => false,
                }
            }
            (SignatureParams::Ecdsa { .. }, PublicKey::EcdsaP384(verifying_key)) => {
                match p384::ecdsa::Signature::from_slice(signature) {
                    Ok(sig) => verifying_key
                        .verify_prehash(&ecdsa_prehash(&hashed, 48), &sig)
                        .is_ok(),
                    Err(_) => false,
                }
            }
            (SignatureParams::Ecdsa { .. }, PublicKey::EcdsaP521(verifying_key)) => {
                match ecdsa::Signature::<p521::NistP521>::from_slice(signature) {
                    Ok(sig) => verifying_key
                        .verify_prehash(&ecdsa_prehash(&hashed, 66), &sig)
                        .is_ok(),
                    Err(_) => false,
                }
            }
            (params, _) => {
                return Err(CertPathError::UnsupportedAlgorithm(format!(
                    "{params:?} cannot be used with this key type"
                )));
            }
        };
        Ok(outcome)
    }

    fn digest(&self, hash: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        with_digest!(hash, D => D::digest(data).to_vec())
    }
}

/// Left-pads a digest shorter than the curve field with zeros.
///
/// The integer value of the digest is unchanged, so the result is the same as
/// taking the digest bits directly. Longer digests are returned as is and
/// truncated by `ecdsa`.
fn ecdsa_prehash(hashed: &[u8], field_len: usize) -> Vec<u8> {
    if hashed.len() >= field_len {
        return hashed.to_vec();
    }
    let mut padded = vec![0u8; field_len - hashed.len()];
    padded.extend_from_slice(hashed);
    padded
}

/// Wraps a raw `r || s` ECDSA signature into `SEQUENCE { r INTEGER, s INTEGER }`.
pub fn ecdsa_signature_to_der(raw: &[u8]) -> Result<Vec<u8>> {
    if raw.is_empty() || raw.len() % 2 != 0 {
        return Err(CertPathError::InvalidInput(format!(
            "raw ECDSA signature has odd length {}",
            raw.len()
        )));
    }
    let (r, s) = raw.split_at(raw.len() / 2);
    let components = vec![Uint::new(r)?, Uint::new(s)?];
    Ok(components.to_der()?)
}

/// Unwraps `SEQUENCE { r, s }` into raw `r || s`, each left-padded to `field_len`.
pub fn ecdsa_signature_from_der(der: &[u8], field_len: usize) -> Result<Vec<u8>> {
    let components = Vec::<Uint>::from_der(der)?;
    if components.len() != 2 {
        return Err(CertPathError::InvalidInput(format!(
            "ECDSA signature holds {} integers",
            components.len()
        )));
    }

    let mut raw = Vec::with_capacity(field_len * 2);
    for component in &components {
        let bytes = component.as_bytes();
        if bytes.len() > field_len {
            return Err(CertPathError::InvalidInput(
                "ECDSA signature component exceeds the curve size".to_string(),
            ));
        }
        raw.resize(raw.len() + field_len - bytes.len(), 0);
        raw.extend_from_slice(bytes);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdsa_der_conversion_strips_and_restores_padding() {
        let mut raw = vec![0u8; 64];
        raw[1] = 0x7f;
        raw[32] = 0x80;
        raw[63] = 0x01;

        let der = ecdsa_signature_to_der(&raw).unwrap();
        assert_eq!(der[0], 0x30);
        // r loses its leading zero, s gains a sign byte
        assert_eq!(&der[2..5], &[0x02, 0x1f, 0x7f]);

        assert_eq!(ecdsa_signature_from_der(&der, 32).unwrap(), raw);
    }

    #[test]
    fn sign_and_verify_each_family() {
        let engine = RustCrypto;
        let data = b"to be signed";

        let ec = KeyPair::generate_ecdsa_p256();
        let params = SignatureParams::for_key(&ec, HashAlgorithm::Sha256);
        let signature = engine.sign(&params, &ec, data).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(engine.verify(&params, &ec.public_key(), &signature, data).unwrap());
        assert!(!engine.verify(&params, &ec.public_key(), &signature, b"other").unwrap());

        let rsa = KeyPair::generate_rsa(1024).unwrap().with_rsa_pss();
        let params = SignatureParams::for_key(&rsa, HashAlgorithm::Sha384);
        assert_eq!(
            params,
            SignatureParams::RsaPss {
                hash: HashAlgorithm::Sha384,
                salt_length: 48
            }
        );
        let signature = engine.sign(&params, &rsa, data).unwrap();
        assert!(engine.verify(&params, &rsa.public_key(), &signature, data).unwrap());
    }

    #[test]
    fn ecdsa_digest_shorter_than_half_the_field() {
        let engine = RustCrypto;
        let data = b"to be signed";

        let p384 = KeyPair::generate_ecdsa_p384();
        let params = SignatureParams::Ecdsa {
            hash: HashAlgorithm::Sha1,
        };
        let signature = engine.sign(&params, &p384, data).unwrap();
        assert_eq!(signature.len(), 96);
        assert!(engine.verify(&params, &p384.public_key(), &signature, data).unwrap());
        assert!(!engine.verify(&params, &p384.public_key(), &signature, b"other").unwrap());

        // P-521 signature over a SHA-256 digest, padded to the 66 byte field by hand
        let secret = p521::SecretKey::random(&mut rand_core::OsRng);
        let signing_key = p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes()).unwrap();
        let mut prehash = vec![0u8; 34];
        prehash.extend_from_slice(&sha2::Sha256::digest(data));
        let signature: p521::ecdsa::Signature = signing_key.sign_prehash(&prehash).unwrap();
        let public = PublicKey::EcdsaP521(ecdsa::VerifyingKey::from(secret.public_key()));
        let params = SignatureParams::Ecdsa {
            hash: HashAlgorithm::Sha256,
        };
        assert!(engine
            .verify(&params, &public, &signature.to_bytes(), data)
            .unwrap());
        assert!(!engine
            .verify(&params, &public, &signature.to_bytes(), b"other")
            .unwrap());
    }

    #[test]
    fn ecdsa_prehash_keeps_the_digest_value() {
        assert_eq!(ecdsa_prehash(&[1, 2], 4), vec![0, 0, 1, 2]);
        assert_eq!(ecdsa_prehash(&[1, 2, 3, 4, 5], 4), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn mismatched_family_is_unsupported() {
        let engine = RustCrypto;
        let ec = KeyPair::generate_ecdsa_p256();
        let params = SignatureParams::RsaPkcs1 {
            hash: HashAlgorithm::Sha256,
        };
        assert!(matches!(
            engine.sign(&params, &ec, b"x"),
            Err(CertPathError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn digest_lengths() {
        let engine = RustCrypto;
        for hash in [
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            assert_eq!(engine.digest(hash, b"abc").len(), hash.output_len());
        }
    }
}
