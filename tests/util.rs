#![allow(dead_code)]

use certpath::cert::params::{
    CertificationRequestInfo, DistinguishedName, ExtendedKeyUsageOption, Validity,
};
use certpath::cert::{Certificate, CertificateWithPrivateKey};
use certpath::issuer::Issuer;
use certpath::key::{KeyPair, PublicKey};
use certpath::pki::Extension;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn generate_ca_cert() -> CertificateWithPrivateKey {
    let ca_key = KeyPair::generate_ecdsa_p256();

    let subject_dn = DistinguishedName::builder()
        .common_name("myca.local".to_string())
        .build();

    let subject_public_key = PublicKey::from_key_pair(&ca_key);

    let ca_cert_info = CertificationRequestInfo::builder()
        .subject(subject_dn)
        .subject_public_key(subject_public_key)
        .is_ca(true)
        .usages(vec![
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth,
        ])
        .extensions(vec![])
        .build();

    CertificateWithPrivateKey {
        cert: Certificate::new_self_signed(&ca_cert_info, &ca_key).unwrap(),
        key: ca_key,
    }
}

/// A CA certificate issued by `issuer`, carrying `extensions` next to the generated ones.
pub fn generate_intermediate_cert(
    issuer: &CertificateWithPrivateKey,
    common_name: &str,
    serial_number: u8,
    extensions: Vec<Extension>,
) -> CertificateWithPrivateKey {
    let key = KeyPair::generate_ecdsa_p256();
    let info = CertificationRequestInfo::builder()
        .subject(
            DistinguishedName::builder()
                .common_name(common_name.to_string())
                .organization("myca".to_string())
                .build(),
        )
        .subject_public_key(PublicKey::from_key_pair(&key))
        .serial_number(vec![serial_number])
        .is_ca(true)
        .extensions(extensions)
        .build();

    CertificateWithPrivateKey {
        cert: issuer.issue(&info, Validity::for_days(90)).unwrap(),
        key,
    }
}

/// A server end-entity certificate issued by `issuer`.
pub fn generate_server_cert(
    issuer: &CertificateWithPrivateKey,
    common_name: &str,
    serial_number: u8,
    extensions: Vec<Extension>,
) -> Certificate {
    let key = KeyPair::generate_ecdsa_p256();
    let info = CertificationRequestInfo::builder()
        .subject(
            DistinguishedName::builder()
                .common_name(common_name.to_string())
                .build(),
        )
        .subject_public_key(PublicKey::from_key_pair(&key))
        .serial_number(vec![serial_number])
        .usages(vec![ExtendedKeyUsageOption::ServerAuth])
        .extensions(extensions)
        .build();

    issuer.issue(&info, Validity::for_days(30)).unwrap()
}
