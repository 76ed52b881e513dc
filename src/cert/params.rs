use bon::Builder;
use time::Duration;
use time::OffsetDateTime;

pub use crate::pki::extensions::{ExtendedKeyUsage, ExtendedKeyUsageOption};
pub use crate::pki::name::DistinguishedName;
use crate::key::PublicKey;
use crate::oid::HashAlgorithm;
use crate::pki::Extension;

/// Parameters for building an X.509 certificate.
///
/// This struct contains the subject, public key, and optional extensions for the certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `serial_number` - Serial number content octets.
/// * `usages` - A list of extended key usage options.
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - pathLenConstraint for CA certificates.
/// * `hash` - Digest used for the issuer's signature.
/// * `extensions` - Additional X.509 extensions. One with the OID of a generated
///   extension replaces the generated one.
#[derive(Clone, Debug, Builder)]
pub struct CertificationRequestInfo {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default = vec![1])]
    pub serial_number: Vec<u8>,
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
    #[builder(default)]
    pub is_ca: bool,
    pub max_path_length: Option<u32>,
    #[builder(default = HashAlgorithm::Sha256)]
    pub hash: HashAlgorithm,
    #[builder(default)]
    pub extensions: Vec<Extension>,
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    ///
    /// # Arguments
    /// * `days` - The number of days for the validity period.
    ///
    /// # Returns
    /// A `Validity` object.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}
