//! # certpath - X.509 PKI Structures and Certification Path Validation
//!
//! certpath is a pure Rust X.509 library built on the RustCrypto crates. It decodes,
//! builds, signs and verifies certificates, certificate revocation lists, PKCS#10
//! certification requests and PKCS#8 private keys, and validates certification
//! paths in the manner of RFC 5280 §6: chain building, revocation lookup,
//! certificate policy processing and name constraints.
//!
//! ## Supported Key Types
//!
//! - **RSA**: PKCS#1 v1.5 and RSASSA-PSS signatures
//! - **ECDSA**: P-256 and P-384 signing, P-521 verification
//!
//! ## Supported Formats
//!
//! - **DER**: Distinguished Encoding Rules (binary format)
//! - **PEM**: Privacy-Enhanced Mail (base64-encoded text format)
//!
//! ## Key Features
//!
//! - **Simplified structures**: every structure converts to and from its ASN.1 schema
//!   through the [`pki::Simplified`] trait; signed objects keep their exact
//!   to-be-signed bytes
//! - **Extensions**: all well-known certificate and CRL extensions decode into typed
//!   payloads
//! - **Certificate issuing**: self-signed roots, intermediates and end entities
//! - **Path validation**: structured results with a distinct code per failure reason
//!
//! ## Quick Start
//!
//! ### Generating a Self-Signed Certificate
//!
//! ```rust,no_run
//! use certpath::{
//!     key::KeyPair,
//!     cert::{Certificate, params::{CertificationRequestInfo, DistinguishedName}},
//! };
//!
//! # fn main() -> Result<(), certpath::error::CertPathError> {
//! // Generate an RSA key pair
//! let key_pair = KeyPair::generate_rsa(2048)?;
//!
//! // Create certificate parameters
//! let subject = DistinguishedName::builder()
//!     .common_name("example.com".to_string())
//!     .organization("Example Corp".to_string())
//!     .country("US".to_string())
//!     .build();
//!
//! let cert_info = CertificationRequestInfo::builder()
//!     .subject(subject)
//!     .subject_public_key(certpath::key::PublicKey::from_key_pair(&key_pair))
//!     .build();
//!
//! // Generate the self-signed certificate
//! let certificate = Certificate::new_self_signed(&cert_info, &key_pair)?;
//!
//! // Export to PEM format
//! let pem_cert = certificate.to_pem()?;
//! println!("Certificate:\n{}", pem_cert);
//! # Ok(())
//! # }
//! ```
//!
//! ### Issuing and Validating a Chain
//!
//! ```rust,no_run
//! use certpath::{
//!     key::{KeyPair, PublicKey},
//!     cert::{Certificate, CertificateWithPrivateKey, params::{CertificationRequestInfo, DistinguishedName, Validity}},
//!     chain::{CertificateChain, ValidationSettings},
//!     issuer::Issuer,
//! };
//!
//! # fn main() -> Result<(), certpath::error::CertPathError> {
//! let ca_key = KeyPair::generate_ecdsa_p256();
//! let ca_info = CertificationRequestInfo::builder()
//!     .subject(DistinguishedName::builder().common_name("Example CA".to_string()).build())
//!     .subject_public_key(PublicKey::from_key_pair(&ca_key))
//!     .is_ca(true)
//!     .build();
//! let ca = CertificateWithPrivateKey {
//!     cert: Certificate::new_self_signed(&ca_info, &ca_key)?,
//!     key: ca_key,
//! };
//!
//! let server_key = KeyPair::generate_ecdsa_p256();
//! let server_info = CertificationRequestInfo::builder()
//!     .subject(DistinguishedName::builder().common_name("server.example.com".to_string()).build())
//!     .subject_public_key(PublicKey::from_key_pair(&server_key))
//!     .build();
//! let server = ca.issue(&server_info, Validity::for_days(365))?;
//!
//! let mut chain = CertificateChain::new(vec![ca.cert.clone()], vec![server], vec![]);
//! let result = chain.verify(&ValidationSettings::default());
//! assert!(result.is_valid(), "{}", result.message());
//! # Ok(())
//! # }
//! ```
//!
//! ### Working with Certificate Extensions
//!
//! ```rust,no_run
//! use certpath::{
//!     key::KeyPair,
//!     cert::{Certificate, params::{CertificationRequestInfo, DistinguishedName}},
//!     pki::{Extension, GeneralName, GeneralNames, extensions::SubjectAltName},
//! };
//!
//! # fn main() -> Result<(), certpath::error::CertPathError> {
//! let key_pair = KeyPair::generate_ecdsa_p384();
//!
//! let san = SubjectAltName(GeneralNames(vec![
//!     GeneralName::DnsName("example.com".to_string()),
//!     GeneralName::DnsName("www.example.com".to_string()),
//! ]));
//!
//! let cert_info = CertificationRequestInfo::builder()
//!     .subject(DistinguishedName::builder().common_name("example.com".to_string()).build())
//!     .subject_public_key(certpath::key::PublicKey::from_key_pair(&key_pair))
//!     .extensions(vec![Extension::new(san, false)?])
//!     .build();
//!
//! let certificate = Certificate::new_self_signed(&cert_info, &key_pair)?;
//! let names = certificate.extension::<SubjectAltName>().map(|san| san.0.iter().count());
//! assert_eq!(names, Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Structural and cryptographic failures are [`error::CertPathError`] values:
//!
//! ```rust
//! use certpath::{cert::Certificate, error::CertPathError, pki::Simplified};
//!
//! match Certificate::from_der(&[0x30, 0x00]) {
//!     Ok(_) => println!("Certificate decoded"),
//!     Err(CertPathError::SchemaMismatch { structure, reason }) => {
//!         println!("Not a {structure}: {reason}")
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! Path validation does not fail with an error. It returns a
//! [`chain::ChainValidationResult`] whose [`chain::ChainFailure`] names the phase
//! and reason.
//!
//! ## Module Organization
//!
//! - [`pki`]: Simplified structures, names, general names and extensions
//! - [`cert`]: Certificates, encoding/decoding, signing and verification
//! - [`crl`]: Certificate revocation lists
//! - [`csr`]: PKCS#10 certification requests
//! - [`pkcs8`]: PKCS#8 private key containers
//! - [`chain`]: Certification path validation
//! - [`issuer`]: Certificate issuing functionality and CA operations
//! - [`key`]: Key generation and import/export
//! - [`crypto`]: The cryptographic provider
//! - [`signature`]: Signature algorithm selection and the shared sign/verify routine
//! - [`oid`]: Object identifiers and the algorithm name registry
//! - [`pem_utils`]: PEM armour helpers
//! - [`error`]: Error types
//! - [`tbs_certificate`]: The to-be-signed part of a certificate

pub mod cert;
pub mod chain;
pub mod crl;
pub mod crypto;
pub mod csr;
pub mod error;
pub mod issuer;
pub mod key;
pub mod oid;
pub mod pem_utils;
pub mod pkcs8;
pub mod pki;
pub mod signature;
pub mod tbs_certificate;
