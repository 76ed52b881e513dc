//! Schema types for structures that carry a `GeneralName` or that have no
//! counterpart in `x509-cert`.
//!
//! GeneralName positions are captured as [`Any`] and handed to
//! [`GeneralName`](super::GeneralName) for the per-alternative decoding.

use const_oid::ObjectIdentifier;
use der::asn1::{BitString, OctetString, Uint};
use der::{Any, Choice, Sequence};
use x509_cert::Version;
use x509_cert::attr::Attribute;
use x509_cert::crl::RevokedCert;
use x509_cert::ext::Extension;
use x509_cert::name::{Name, RelativeDistinguishedName};
use x509_cert::time::Time;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;

/// ```text
/// OtherName ::= SEQUENCE {
///     type-id    OBJECT IDENTIFIER,
///     value      [0] EXPLICIT ANY DEFINED BY type-id }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct OtherNameSchema {
    pub type_id: ObjectIdentifier,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT")]
    pub value: Any,
}

/// ```text
/// GeneralSubtree ::= SEQUENCE {
///     base                    GeneralName,
///     minimum         [0]     BaseDistance DEFAULT 0,
///     maximum         [1]     BaseDistance OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct GeneralSubtreeSchema {
    pub base: Any,
    #[asn1(
        context_specific = "0",
        tag_mode = "IMPLICIT",
        default = "Default::default"
    )]
    pub minimum: u32,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    pub maximum: Option<u32>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct NameConstraintsSchema {
    #[asn1(
        context_specific = "0",
        optional = "true",
        tag_mode = "IMPLICIT",
        constructed = "true"
    )]
    pub permitted_subtrees: Option<Vec<GeneralSubtreeSchema>>,
    #[asn1(
        context_specific = "1",
        optional = "true",
        tag_mode = "IMPLICIT",
        constructed = "true"
    )]
    pub excluded_subtrees: Option<Vec<GeneralSubtreeSchema>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct AuthorityKeyIdentifierSchema {
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    pub key_identifier: Option<OctetString>,
    #[asn1(
        context_specific = "1",
        tag_mode = "IMPLICIT",
        optional = "true",
        constructed = "true"
    )]
    pub authority_cert_issuer: Option<Vec<Any>>,
    #[asn1(context_specific = "2", tag_mode = "IMPLICIT", optional = "true")]
    pub authority_cert_serial_number: Option<SerialNumber>,
}

/// ```text
/// DistributionPointName ::= CHOICE {
///     fullName                [0]     GeneralNames,
///     nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Choice)]
pub enum DistributionPointNameSchema {
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", constructed = "true")]
    FullName(Vec<Any>),
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", constructed = "true")]
    NameRelativeToCrlIssuer(RelativeDistinguishedName),
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct DistributionPointSchema {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub distribution_point: Option<DistributionPointNameSchema>,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    pub reasons: Option<BitString>,
    #[asn1(
        context_specific = "2",
        tag_mode = "IMPLICIT",
        optional = "true",
        constructed = "true"
    )]
    pub crl_issuer: Option<Vec<Any>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct AccessDescriptionSchema {
    pub access_method: ObjectIdentifier,
    pub access_location: Any,
}

/// ```text
/// IssuingDistributionPoint ::= SEQUENCE {
///     distributionPoint          [0] DistributionPointName OPTIONAL,
///     onlyContainsUserCerts      [1] BOOLEAN DEFAULT FALSE,
///     onlyContainsCACerts        [2] BOOLEAN DEFAULT FALSE,
///     onlySomeReasons            [3] ReasonFlags OPTIONAL,
///     indirectCRL                [4] BOOLEAN DEFAULT FALSE,
///     onlyContainsAttributeCerts [5] BOOLEAN DEFAULT FALSE }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct IssuingDistributionPointSchema {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub distribution_point: Option<DistributionPointNameSchema>,
    #[asn1(
        context_specific = "1",
        tag_mode = "IMPLICIT",
        default = "Default::default"
    )]
    pub only_contains_user_certs: bool,
    #[asn1(
        context_specific = "2",
        tag_mode = "IMPLICIT",
        default = "Default::default"
    )]
    pub only_contains_ca_certs: bool,
    #[asn1(context_specific = "3", tag_mode = "IMPLICIT", optional = "true")]
    pub only_some_reasons: Option<BitString>,
    #[asn1(
        context_specific = "4",
        tag_mode = "IMPLICIT",
        default = "Default::default"
    )]
    pub indirect_crl: bool,
    #[asn1(
        context_specific = "5",
        tag_mode = "IMPLICIT",
        default = "Default::default"
    )]
    pub only_contains_attribute_certs: bool,
}

/// `SubjectDirectoryAttributes ::= SEQUENCE SIZE (1..MAX) OF Attribute`.
pub type SubjectDirectoryAttributesSchema = Vec<Attribute>;

/// ```text
/// RSASSA-PSS-params ::= SEQUENCE {
///     hashAlgorithm      [0] HashAlgorithm    DEFAULT sha1,
///     maskGenAlgorithm   [1] MaskGenAlgorithm DEFAULT mgf1SHA1,
///     saltLength         [2] INTEGER          DEFAULT 20,
///     trailerField       [3] TrailerField     DEFAULT trailerFieldBC }
/// ```
///
/// Defaults are represented by absent fields.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RsaPssParamsSchema {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub hash_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", optional = "true")]
    pub mask_gen_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", optional = "true")]
    pub salt_length: Option<u32>,
    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", optional = "true")]
    pub trailer_field: Option<u32>,
}

/// `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RsaPublicKeySchema {
    pub modulus: Uint,
    pub public_exponent: Uint,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct OtherPrimeInfoSchema {
    pub prime: Uint,
    pub exponent: Uint,
    pub coefficient: Uint,
}

/// `RSAPrivateKey` from RFC 8017 §A.1.2.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RsaPrivateKeySchema {
    pub version: u8,
    pub modulus: Uint,
    pub public_exponent: Uint,
    pub private_exponent: Uint,
    pub prime1: Uint,
    pub prime2: Uint,
    pub exponent1: Uint,
    pub exponent2: Uint,
    pub coefficient: Uint,
    pub other_prime_infos: Option<Vec<OtherPrimeInfoSchema>>,
}

/// Outer shape shared by certificates, CRLs and certification requests.
///
/// The to-be-signed part is captured whole so that its exact bytes survive.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SignedSchema {
    pub tbs: Any,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    pub signature: BitString,
}

/// `TBSCertList` with the version kept optional, so v1 lists decode.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct TbsCertListSchema {
    pub version: Option<Version>,
    pub signature: AlgorithmIdentifierOwned,
    pub issuer: Name,
    pub this_update: Time,
    pub next_update: Option<Time>,
    pub revoked_certificates: Option<Vec<RevokedCert>>,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub crl_extensions: Option<Vec<Extension>>,
}

/// `OneAsymmetricKey` (RFC 5958), which covers the PKCS#8 v1 `PrivateKeyInfo`.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct PrivateKeyInfoSchema {
    pub version: u8,
    pub private_key_algorithm: AlgorithmIdentifierOwned,
    pub private_key: OctetString,
    #[asn1(
        context_specific = "0",
        tag_mode = "IMPLICIT",
        optional = "true",
        constructed = "true"
    )]
    pub attributes: Option<x509_cert::attr::Attributes>,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    pub public_key: Option<BitString>,
}
