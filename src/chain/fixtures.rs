//! Certificate hierarchies for the path validation tests.

use crate::cert::params::{CertificationRequestInfo, DistinguishedName, Validity};
use crate::cert::{Certificate, CertificateWithPrivateKey};
use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::pki::Extension;

pub(crate) fn request(
    name: &str,
    key: &KeyPair,
    is_ca: bool,
    extensions: Vec<Extension>,
) -> CertificationRequestInfo {
    CertificationRequestInfo::builder()
        .subject(
            DistinguishedName::builder()
                .common_name(name.to_string())
                .build(),
        )
        .subject_public_key(PublicKey::from_key_pair(key))
        .is_ca(is_ca)
        .extensions(extensions)
        .build()
}

pub(crate) fn root(name: &str, extensions: Vec<Extension>) -> CertificateWithPrivateKey {
    let key = KeyPair::generate_ecdsa_p256();
    CertificateWithPrivateKey {
        cert: Certificate::new_self_signed(&request(name, &key, true, extensions), &key).unwrap(),
        key,
    }
}

pub(crate) fn ca(
    issuer: &CertificateWithPrivateKey,
    name: &str,
    extensions: Vec<Extension>,
) -> CertificateWithPrivateKey {
    let key = KeyPair::generate_ecdsa_p256();
    CertificateWithPrivateKey {
        cert: issuer
            .issue(&request(name, &key, true, extensions), Validity::for_days(30))
            .unwrap(),
        key,
    }
}

pub(crate) fn leaf(
    issuer: &CertificateWithPrivateKey,
    name: &str,
    extensions: Vec<Extension>,
) -> Certificate {
    let key = KeyPair::generate_ecdsa_p256();
    issuer
        .issue(&request(name, &key, false, extensions), Validity::for_days(30))
        .unwrap()
}
