mod util;

use certpath::cert::params::{
    CertificationRequestInfo, DistinguishedName, ExtendedKeyUsageOption, Validity,
};
use certpath::cert::{Certificate, CertificateWithPrivateKey};
use certpath::chain::{CertificateChain, ValidationSettings};
use certpath::crl::{Crl, RevokedCertificate};
use certpath::csr::CertificationRequest;
use certpath::issuer::Issuer;
use certpath::key::{KeyPair, PublicKey};
use certpath::oid::HashAlgorithm;
use certpath::pki::{Simplified, Time};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509, X509Crl, X509NameBuilder, X509ReqBuilder};
use regex::Regex;
use std::fs;
use std::process::Command;
use time::OffsetDateTime;

fn issue_server_cert(ca: &CertificateWithPrivateKey) -> Certificate {
    let server_key = KeyPair::generate_ecdsa_p256();
    let server_cert_info = CertificationRequestInfo::builder()
        .subject(
            DistinguishedName::builder()
                .common_name("server.myca.local".to_string())
                .build(),
        )
        .subject_public_key(PublicKey::from_key_pair(&server_key))
        .usages(vec![ExtendedKeyUsageOption::ServerAuth])
        .build();

    let validity = Validity {
        not_before: OffsetDateTime::now_utc(),
        not_after: OffsetDateTime::now_utc() + time::Duration::days(365),
    };
    ca.issue(&server_cert_info, validity).unwrap()
}

fn openssl_ec_key() -> PKey<Private> {
    openssl_ec_key_on(Nid::X9_62_PRIME256V1)
}

fn openssl_ec_key_on(curve: Nid) -> PKey<Private> {
    let group = EcGroup::from_curve_name(curve).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

/// A self-signed CA certificate built by OpenSSL.
fn openssl_root(key: &PKey<Private>, common_name: &str) -> X509 {
    openssl_root_with_digest(key, common_name, MessageDigest::sha256())
}

fn openssl_root_with_digest(
    key: &PKey<Private>,
    common_name: &str,
    digest: MessageDigest,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(7).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(30).unwrap())
        .unwrap();
    builder
        .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    builder
        .append_extension(
            KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build()
                .unwrap(),
        )
        .unwrap();
    builder.sign(key, digest).unwrap();
    builder.build()
}

#[test]
fn test_openssl_validate_cert() {
    // Generate a CA certificate
    let ca_cert_with_key = util::generate_ca_cert();

    // Generate a server certificate signed by the CA
    let server_cert = issue_server_cert(&ca_cert_with_key);
    let server_cert_pem = server_cert.to_pem().unwrap();

    // Save the certificate to a temporary file
    let cert_path = std::env::temp_dir().join("certpath_test_server_cert.pem");
    fs::write(&cert_path, server_cert_pem).expect("Failed to write server certificate");

    // Use OpenSSL CLI to validate the generated certificate
    let output = Command::new("openssl")
        .arg("x509")
        .arg("-in")
        .arg(&cert_path)
        .arg("-noout")
        .arg("-text")
        .output()
        .expect("Failed to execute OpenSSL command");

    assert!(
        output.status.success(),
        "OpenSSL command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);

    // Validate static fields; name spacing differs between OpenSSL releases
    let issuer_regex = Regex::new(r"Issuer: CN ?= ?myca\.local").unwrap();
    let subject_regex = Regex::new(r"Subject: CN ?= ?server\.myca\.local").unwrap();
    assert!(
        issuer_regex.is_match(&output_text),
        "Issuer field is incorrect"
    );
    assert!(
        subject_regex.is_match(&output_text),
        "Subject field is incorrect"
    );
    assert!(
        output_text.contains("Version: 3 (0x2)"),
        "Version field is incorrect"
    );
    assert!(
        output_text.contains("Serial Number: 1 (0x1)"),
        "Serial Number field is incorrect"
    );

    // Validate dynamic fields with regex
    let not_before_regex = Regex::new(r"Not Before: .+").unwrap();
    let not_after_regex = Regex::new(r"Not After : .+").unwrap();

    assert!(
        not_before_regex.is_match(&output_text),
        "Missing or incorrect Not Before field"
    );
    assert!(
        not_after_regex.is_match(&output_text),
        "Missing or incorrect Not After field"
    );
    assert!(
        output_text.contains("Signature Algorithm: ecdsa-with-SHA256"),
        "Signature Algorithm field is incorrect"
    );

    fs::remove_file(&cert_path).expect("Failed to remove test certificate");
}

#[test]
fn test_openssl_crate_validate_cert() {
    let ca_cert_with_key = util::generate_ca_cert();
    let server_cert = issue_server_cert(&ca_cert_with_key);
    let server_cert_pem = server_cert.to_pem().unwrap();

    let x509 = X509::from_pem(server_cert_pem.as_bytes()).expect("Failed to parse PEM");

    // Check subject
    let subject = x509
        .subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(
        subject.to_string(),
        "server.myca.local",
        "Subject CN mismatch"
    );

    // Check issuer
    let issuer = x509
        .issuer_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(issuer.to_string(), "myca.local", "Issuer CN mismatch");

    assert_eq!(
        x509.version(),
        2,
        "X509 version should be 3 (0-based index)"
    );

    let serial = x509.serial_number().to_bn().unwrap().to_dec_str().unwrap();
    assert_eq!(serial.to_string(), "1", "Serial number should be 1");

    let sig_alg = x509.signature_algorithm().object().nid();
    assert_eq!(
        sig_alg,
        Nid::ECDSA_WITH_SHA256,
        "Signature algorithm should be ecdsa-with-SHA256"
    );

    // The CA's public key verifies the signature
    let ca_x509 = X509::from_pem(ca_cert_with_key.cert.to_pem().unwrap().as_bytes()).unwrap();
    assert!(x509.verify(&ca_x509.public_key().unwrap()).unwrap());
}

#[test]
fn openssl_certificate_decodes_and_verifies() {
    util::init_logging();
    let key = openssl_ec_key();
    let x509 = openssl_root(&key, "openssl.local");

    let cert = Certificate::from_der(&x509.to_der().unwrap()).unwrap();
    assert!(cert.is_self_signed());
    assert!(cert.is_ca());
    assert!(cert.verify(None).unwrap());
    assert_eq!(
        cert.subject().common_name().as_deref(),
        Some("openssl.local")
    );
    assert_eq!(cert.serial_number(), &[0x07]);
    // Re-encoding keeps the signed bytes intact
    assert_eq!(cert.to_der().unwrap(), x509.to_der().unwrap());
}

#[test]
fn openssl_p521_certificates_verify_with_shorter_digests() {
    util::init_logging();
    let key = openssl_ec_key_on(Nid::SECP521R1);
    for digest in [MessageDigest::sha256(), MessageDigest::sha384(), MessageDigest::sha512()] {
        let x509 = openssl_root_with_digest(&key, "p521.openssl.local", digest);
        let cert = Certificate::from_der(&x509.to_der().unwrap()).unwrap();
        assert!(cert.verify(None).unwrap());
    }

    let key = openssl_ec_key_on(Nid::SECP384R1);
    let x509 = openssl_root_with_digest(&key, "p384.openssl.local", MessageDigest::sha1());
    let cert = Certificate::from_der(&x509.to_der().unwrap()).unwrap();
    assert!(cert.verify(None).unwrap());
}

#[test]
fn openssl_root_anchors_a_certpath_chain() {
    util::init_logging();
    let key = openssl_ec_key();
    let x509 = openssl_root(&key, "openssl-root.local");

    let pkcs8_pem = String::from_utf8(key.private_key_to_pem_pkcs8().unwrap()).unwrap();
    let root = CertificateWithPrivateKey {
        cert: Certificate::from_der(&x509.to_der().unwrap()).unwrap(),
        key: KeyPair::import_from_pkcs8_pem(&pkcs8_pem).unwrap(),
    };
    let server = util::generate_server_cert(&root, "server.openssl-root.local", 9, vec![]);

    let result = CertificateChain::new(vec![root.cert.clone()], vec![server.clone()], vec![])
        .verify(&ValidationSettings::default());
    assert!(result.is_valid(), "{}", result.message());
    assert_eq!(result.certificate_path.len(), 2);

    // OpenSSL accepts the signature made with the imported key
    let server_x509 = X509::from_der(&server.to_der().unwrap()).unwrap();
    assert!(server_x509.verify(&x509.public_key().unwrap()).unwrap());
}

#[test]
fn openssl_request_decodes_and_verifies() {
    let key = openssl_ec_key();
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "request.myca.local").unwrap();
    name.append_entry_by_text("O", "myca").unwrap();
    let name = name.build();

    let mut builder = X509ReqBuilder::new().unwrap();
    builder.set_version(0).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    let pem = String::from_utf8(builder.build().to_pem().unwrap()).unwrap();

    let request = CertificationRequest::from_pem(&pem).unwrap();
    assert!(request.verify().unwrap());
    assert_eq!(
        request.subject.common_name().as_deref(),
        Some("request.myca.local")
    );
    assert!(request.requested_extensions().unwrap().is_empty());
}

#[test]
fn certpath_crl_verifies_in_openssl() {
    let ca_cert_with_key = util::generate_ca_cert();
    let now = Time::from_date(OffsetDateTime::now_utc()).unwrap();
    let next = Time::from_date(OffsetDateTime::now_utc() + time::Duration::days(7)).unwrap();

    let mut crl = Crl::new(
        ca_cert_with_key.cert.subject().clone(),
        now,
        Some(next),
        vec![RevokedCertificate::new(vec![0x01], now)],
    )
    .unwrap();
    crl.sign(&ca_cert_with_key.key, HashAlgorithm::Sha256).unwrap();

    let openssl_crl = X509Crl::from_pem(crl.to_pem().unwrap().as_bytes()).unwrap();
    let ca_x509 = X509::from_pem(ca_cert_with_key.cert.to_pem().unwrap().as_bytes()).unwrap();
    assert!(openssl_crl.verify(&ca_x509.public_key().unwrap()).unwrap());
    assert_eq!(openssl_crl.get_revoked().map(|revoked| revoked.len()), Some(1));
}
