//! Well-known certificate and CRL extension payloads.

use ::time::OffsetDateTime;
use const_oid::ObjectIdentifier;
use der::Any;
use der::asn1::{BitString, GeneralizedTime, OctetString, SetOfVec, Uint};
use x509_cert::name::RelativeDistinguishedName;
use x509_cert::serial_number::SerialNumber;

use super::attribute::Attribute;
use super::general_name::{GeneralName, GeneralNames};
use super::name::AttributeTypeAndValue;
use super::schema::{
    AccessDescriptionSchema, AuthorityKeyIdentifierSchema, DistributionPointNameSchema,
    DistributionPointSchema, GeneralSubtreeSchema, IssuingDistributionPointSchema,
    NameConstraintsSchema,
};
use super::time::{to_date_time, to_offset_date_time};
use super::Simplified;
use crate::error::{CertPathError, Result};
use crate::oid;

pub use der::flagset::FlagSet;
pub use x509_cert::ext::pkix::KeyUsages;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use certpath::pki::extensions::{SubjectAltName, ToAndFromX509Extension};
/// use certpath::pki::{GeneralName, GeneralNames};
/// let san = SubjectAltName(GeneralNames(vec![GeneralName::DnsName("example.com".into())]));
/// let encoded = san.to_x509_extension_value().unwrap();
/// let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(san, decoded);
/// ```
pub trait ToAndFromX509Extension: Simplified {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        self.to_der()
    }

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        Self::from_der(extension)
    }
}

/// Represents the Basic Constraints extension.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u32>,
}

impl Simplified for BasicConstraints {
    type Schema = x509_cert::ext::pkix::BasicConstraints;
    const NAME: &'static str = "BasicConstraints";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            is_ca: schema.ca,
            max_path_length: schema.path_len_constraint.map(u32::from),
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let path_len_constraint = self
            .max_path_length
            .map(|len| {
                u8::try_from(len).map_err(|_| {
                    CertPathError::InvalidInput(format!("path length {len} is too large"))
                })
            })
            .transpose()?;
        Ok(x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint,
        })
    }
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = oid::ID_CE_BASIC_CONSTRAINTS;
}

/// Represents the Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl KeyUsage {
    pub fn contains(&self, usage: KeyUsages) -> bool {
        self.0.contains(usage)
    }
}

impl Simplified for KeyUsage {
    type Schema = x509_cert::ext::pkix::KeyUsage;
    const NAME: &'static str = "KeyUsage";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self(schema.0))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::pkix::KeyUsage(self.0))
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = oid::ID_CE_KEY_USAGE;
}

/// Represents the Extended Key Usage extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub key_purposes: Vec<ObjectIdentifier>,
}

impl ExtendedKeyUsage {
    pub fn from_options(options: &[ExtendedKeyUsageOption]) -> Self {
        Self {
            key_purposes: options.iter().map(|v| (*v).into()).collect(),
        }
    }
}

impl Simplified for ExtendedKeyUsage {
    type Schema = x509_cert::ext::pkix::ExtendedKeyUsage;
    const NAME: &'static str = "ExtKeyUsage";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            key_purposes: schema.0,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::pkix::ExtendedKeyUsage(
            self.key_purposes.clone(),
        ))
    }
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = oid::ID_CE_EXT_KEY_USAGE;
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::OcspSigning => const_oid::db::rfc5912::ID_KP_OCSP_SIGNING,
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl Simplified for SubjectKeyIdentifier {
    type Schema = x509_cert::ext::pkix::SubjectKeyIdentifier;
    const NAME: &'static str = "SubjectKeyIdentifier";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self(schema.0.into_bytes()))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(
            self.0.clone(),
        )?))
    }
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = oid::ID_CE_SUBJECT_KEY_IDENTIFIER;
}

/// Represents the Authority Key Identifier (AKI) extension.
///
/// # Fields
/// * `key_identifier` - The key identifier.
/// * `authority_cert_issuer` - Names of the issuer's issuer.
/// * `authority_cert_serial_number` - The issuer's certificate serial number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<Vec<u8>>,
    pub authority_cert_issuer: Option<GeneralNames>,
    pub authority_cert_serial_number: Option<Vec<u8>>,
}

impl Simplified for AuthorityKeyIdentifier {
    type Schema = AuthorityKeyIdentifierSchema;
    const NAME: &'static str = "AuthorityKeyIdentifier";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            key_identifier: schema.key_identifier.map(OctetString::into_bytes),
            authority_cert_issuer: schema
                .authority_cert_issuer
                .map(GeneralNames::from_nodes)
                .transpose()?,
            authority_cert_serial_number: schema
                .authority_cert_serial_number
                .map(|serial| serial.as_bytes().to_vec()),
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(AuthorityKeyIdentifierSchema {
            key_identifier: self
                .key_identifier
                .as_ref()
                .map(|id| OctetString::new(id.clone()))
                .transpose()?,
            authority_cert_issuer: self
                .authority_cert_issuer
                .as_ref()
                .map(GeneralNames::to_nodes)
                .transpose()?,
            authority_cert_serial_number: self
                .authority_cert_serial_number
                .as_ref()
                .map(|serial| SerialNumber::new(serial))
                .transpose()?,
        })
    }
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = oid::ID_CE_AUTHORITY_KEY_IDENTIFIER;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrivateKeyUsagePeriod {
    pub not_before: Option<OffsetDateTime>,
    pub not_after: Option<OffsetDateTime>,
}

impl Simplified for PrivateKeyUsagePeriod {
    type Schema = x509_cert::ext::pkix::PrivateKeyUsagePeriod;
    const NAME: &'static str = "PrivateKeyUsagePeriod";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let read = |value: Option<GeneralizedTime>| {
            value
                .map(|time| to_offset_date_time(time.to_date_time()))
                .transpose()
        };
        Ok(Self {
            not_before: read(schema.not_before)?,
            not_after: read(schema.not_after)?,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let write = |value: Option<OffsetDateTime>| {
            value
                .map(|time| to_date_time(time).map(GeneralizedTime::from_date_time))
                .transpose()
        };
        Ok(x509_cert::ext::pkix::PrivateKeyUsagePeriod {
            not_before: write(self.not_before)?,
            not_after: write(self.not_after)?,
        })
    }
}

impl ToAndFromX509Extension for PrivateKeyUsagePeriod {
    const OID: ObjectIdentifier = oid::ID_CE_PRIVATE_KEY_USAGE_PERIOD;
}

/// Declares a `GeneralNames` newtype extension.
macro_rules! general_names_extension {
    ($(#[$meta:meta])* $name:ident, $oid:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(pub GeneralNames);

        impl Simplified for $name {
            type Schema = Vec<Any>;
            const NAME: &'static str = $label;

            fn from_schema(schema: Self::Schema) -> Result<Self> {
                GeneralNames::from_nodes(schema).map(Self)
            }

            fn to_schema(&self) -> Result<Self::Schema> {
                self.0.to_nodes()
            }
        }

        impl ToAndFromX509Extension for $name {
            const OID: ObjectIdentifier = $oid;
        }
    };
}

general_names_extension!(
    /// Represents the Subject Alternative Name (SAN) extension.
    SubjectAltName,
    oid::ID_CE_SUBJECT_ALT_NAME,
    "SubjectAltName"
);
general_names_extension!(IssuerAltName, oid::ID_CE_ISSUER_ALT_NAME, "IssuerAltName");
general_names_extension!(
    /// CRL entry extension naming the issuer of an indirect CRL entry.
    CertificateIssuer,
    oid::ID_CE_CERTIFICATE_ISSUER,
    "CertificateIssuer"
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectDirectoryAttributes(pub Vec<Attribute>);

impl Simplified for SubjectDirectoryAttributes {
    type Schema = Vec<x509_cert::attr::Attribute>;
    const NAME: &'static str = "SubjectDirectoryAttributes";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        schema
            .into_iter()
            .map(Attribute::from_schema)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        self.0.iter().map(Attribute::to_schema).collect()
    }
}

impl ToAndFromX509Extension for SubjectDirectoryAttributes {
    const OID: ObjectIdentifier = oid::ID_CE_SUBJECT_DIRECTORY_ATTRIBUTES;
}

/// A permitted or excluded subtree. `minimum` and `maximum` are carried but do not
/// take part in name matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralSubtree {
    pub base: GeneralName,
    pub minimum: u32,
    pub maximum: Option<u32>,
}

impl GeneralSubtree {
    pub fn new(base: GeneralName) -> Self {
        Self {
            base,
            minimum: 0,
            maximum: None,
        }
    }
}

impl Simplified for GeneralSubtree {
    type Schema = GeneralSubtreeSchema;
    const NAME: &'static str = "GeneralSubtree";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            base: GeneralName::from_schema(schema.base)?,
            minimum: schema.minimum,
            maximum: schema.maximum,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(GeneralSubtreeSchema {
            base: self.base.to_schema()?,
            minimum: self.minimum,
            maximum: self.maximum,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameConstraints {
    pub permitted_subtrees: Vec<GeneralSubtree>,
    pub excluded_subtrees: Vec<GeneralSubtree>,
}

fn subtrees_from(schema: Option<Vec<GeneralSubtreeSchema>>) -> Result<Vec<GeneralSubtree>> {
    schema
        .unwrap_or_default()
        .into_iter()
        .map(GeneralSubtree::from_schema)
        .collect()
}

fn subtrees_to(subtrees: &[GeneralSubtree]) -> Result<Option<Vec<GeneralSubtreeSchema>>> {
    if subtrees.is_empty() {
        return Ok(None);
    }
    subtrees
        .iter()
        .map(GeneralSubtree::to_schema)
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

impl Simplified for NameConstraints {
    type Schema = NameConstraintsSchema;
    const NAME: &'static str = "NameConstraints";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            permitted_subtrees: subtrees_from(schema.permitted_subtrees)?,
            excluded_subtrees: subtrees_from(schema.excluded_subtrees)?,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(NameConstraintsSchema {
            permitted_subtrees: subtrees_to(&self.permitted_subtrees)?,
            excluded_subtrees: subtrees_to(&self.excluded_subtrees)?,
        })
    }
}

impl ToAndFromX509Extension for NameConstraints {
    const OID: ObjectIdentifier = oid::ID_CE_NAME_CONSTRAINTS;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQualifierInfo {
    pub policy_qualifier_id: ObjectIdentifier,
    pub qualifier: Option<Any>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyInformation {
    pub policy_identifier: ObjectIdentifier,
    pub policy_qualifiers: Vec<PolicyQualifierInfo>,
}

impl PolicyInformation {
    pub fn new(policy_identifier: ObjectIdentifier) -> Self {
        Self {
            policy_identifier,
            policy_qualifiers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificatePolicies(pub Vec<PolicyInformation>);

impl CertificatePolicies {
    /// Declared policy OIDs in order.
    pub fn policy_ids(&self) -> impl Iterator<Item = ObjectIdentifier> + '_ {
        self.0.iter().map(|info| info.policy_identifier)
    }
}

impl Simplified for CertificatePolicies {
    type Schema = x509_cert::ext::pkix::CertificatePolicies;
    const NAME: &'static str = "CertificatePolicies";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let policies = schema
            .0
            .into_iter()
            .map(|info| PolicyInformation {
                policy_identifier: info.policy_identifier,
                policy_qualifiers: info
                    .policy_qualifiers
                    .unwrap_or_default()
                    .into_iter()
                    .map(|q| PolicyQualifierInfo {
                        policy_qualifier_id: q.policy_qualifier_id,
                        qualifier: q.qualifier,
                    })
                    .collect(),
            })
            .collect();
        Ok(Self(policies))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let policies = self
            .0
            .iter()
            .map(|info| x509_cert::ext::pkix::certpolicy::PolicyInformation {
                policy_identifier: info.policy_identifier,
                policy_qualifiers: (!info.policy_qualifiers.is_empty()).then(|| {
                    info.policy_qualifiers
                        .iter()
                        .map(|q| x509_cert::ext::pkix::certpolicy::PolicyQualifierInfo {
                            policy_qualifier_id: q.policy_qualifier_id,
                            qualifier: q.qualifier.clone(),
                        })
                        .collect()
                }),
            })
            .collect();
        Ok(x509_cert::ext::pkix::CertificatePolicies(policies))
    }
}

impl ToAndFromX509Extension for CertificatePolicies {
    const OID: ObjectIdentifier = oid::ID_CE_CERTIFICATE_POLICIES;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyMapping {
    pub issuer_domain_policy: ObjectIdentifier,
    pub subject_domain_policy: ObjectIdentifier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyMappings(pub Vec<PolicyMapping>);

impl Simplified for PolicyMappings {
    type Schema = x509_cert::ext::pkix::PolicyMappings;
    const NAME: &'static str = "PolicyMappings";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self(
            schema
                .0
                .into_iter()
                .map(|m| PolicyMapping {
                    issuer_domain_policy: m.issuer_domain_policy,
                    subject_domain_policy: m.subject_domain_policy,
                })
                .collect(),
        ))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::pkix::PolicyMappings(
            self.0
                .iter()
                .map(|m| x509_cert::ext::pkix::PolicyMapping {
                    issuer_domain_policy: m.issuer_domain_policy,
                    subject_domain_policy: m.subject_domain_policy,
                })
                .collect(),
        ))
    }
}

impl ToAndFromX509Extension for PolicyMappings {
    const OID: ObjectIdentifier = oid::ID_CE_POLICY_MAPPINGS;
}

/// Both skip counts are read directly as integers from their `[0]` and `[1]` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyConstraints {
    pub require_explicit_policy: Option<u32>,
    pub inhibit_policy_mapping: Option<u32>,
}

impl Simplified for PolicyConstraints {
    type Schema = x509_cert::ext::pkix::PolicyConstraints;
    const NAME: &'static str = "PolicyConstraints";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            require_explicit_policy: schema.require_explicit_policy,
            inhibit_policy_mapping: schema.inhibit_policy_mapping,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::pkix::PolicyConstraints {
            require_explicit_policy: self.require_explicit_policy,
            inhibit_policy_mapping: self.inhibit_policy_mapping,
        })
    }
}

impl ToAndFromX509Extension for PolicyConstraints {
    const OID: ObjectIdentifier = oid::ID_CE_POLICY_CONSTRAINTS;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InhibitAnyPolicy(pub u32);

impl Simplified for InhibitAnyPolicy {
    type Schema = x509_cert::ext::pkix::InhibitAnyPolicy;
    const NAME: &'static str = "InhibitAnyPolicy";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self(schema.0))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::pkix::InhibitAnyPolicy(self.0))
    }
}

impl ToAndFromX509Extension for InhibitAnyPolicy {
    const OID: ObjectIdentifier = oid::ID_CE_INHIBIT_ANY_POLICY;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionPointName {
    FullName(GeneralNames),
    NameRelativeToCrlIssuer(Vec<AttributeTypeAndValue>),
}

impl DistributionPointName {
    fn from_schema(schema: DistributionPointNameSchema) -> Result<Self> {
        match schema {
            DistributionPointNameSchema::FullName(nodes) => {
                Ok(Self::FullName(GeneralNames::from_nodes(nodes)?))
            }
            DistributionPointNameSchema::NameRelativeToCrlIssuer(set) => set
                .0
                .iter()
                .cloned()
                .map(AttributeTypeAndValue::from_schema)
                .collect::<Result<Vec<_>>>()
                .map(Self::NameRelativeToCrlIssuer),
        }
    }

    fn to_schema(&self) -> Result<DistributionPointNameSchema> {
        match self {
            Self::FullName(names) => Ok(DistributionPointNameSchema::FullName(names.to_nodes()?)),
            Self::NameRelativeToCrlIssuer(attributes) => {
                let attributes = attributes
                    .iter()
                    .map(AttributeTypeAndValue::to_schema)
                    .collect::<Result<Vec<_>>>()?;
                Ok(DistributionPointNameSchema::NameRelativeToCrlIssuer(
                    RelativeDistinguishedName(SetOfVec::try_from(attributes)?),
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub reasons: Option<BitString>,
    pub crl_issuer: Option<GeneralNames>,
}

impl Simplified for DistributionPoint {
    type Schema = DistributionPointSchema;
    const NAME: &'static str = "DistributionPoint";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            distribution_point: schema
                .distribution_point
                .map(DistributionPointName::from_schema)
                .transpose()?,
            reasons: schema.reasons,
            crl_issuer: schema
                .crl_issuer
                .map(GeneralNames::from_nodes)
                .transpose()?,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(DistributionPointSchema {
            distribution_point: self
                .distribution_point
                .as_ref()
                .map(DistributionPointName::to_schema)
                .transpose()?,
            reasons: self.reasons.clone(),
            crl_issuer: self
                .crl_issuer
                .as_ref()
                .map(GeneralNames::to_nodes)
                .transpose()?,
        })
    }
}

/// Declares a `SEQUENCE OF DistributionPoint` extension.
macro_rules! distribution_points_extension {
    ($name:ident, $oid:expr, $label:literal) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(pub Vec<DistributionPoint>);

        impl Simplified for $name {
            type Schema = Vec<DistributionPointSchema>;
            const NAME: &'static str = $label;

            fn from_schema(schema: Self::Schema) -> Result<Self> {
                schema
                    .into_iter()
                    .map(DistributionPoint::from_schema)
                    .collect::<Result<Vec<_>>>()
                    .map(Self)
            }

            fn to_schema(&self) -> Result<Self::Schema> {
                self.0.iter().map(DistributionPoint::to_schema).collect()
            }
        }

        impl ToAndFromX509Extension for $name {
            const OID: ObjectIdentifier = $oid;
        }
    };
}

distribution_points_extension!(
    CrlDistributionPoints,
    oid::ID_CE_CRL_DISTRIBUTION_POINTS,
    "CRLDistributionPoints"
);
distribution_points_extension!(FreshestCrl, oid::ID_CE_FRESHEST_CRL, "FreshestCRL");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDescription {
    pub access_method: ObjectIdentifier,
    pub access_location: GeneralName,
}

/// Declares an info-access extension (`SEQUENCE OF AccessDescription`).
macro_rules! info_access_extension {
    ($name:ident, $oid:expr, $label:literal) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(pub Vec<AccessDescription>);

        impl Simplified for $name {
            type Schema = Vec<AccessDescriptionSchema>;
            const NAME: &'static str = $label;

            fn from_schema(schema: Self::Schema) -> Result<Self> {
                schema
                    .into_iter()
                    .map(|description| {
                        Ok(AccessDescription {
                            access_method: description.access_method,
                            access_location: GeneralName::from_schema(
                                description.access_location,
                            )?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Self)
            }

            fn to_schema(&self) -> Result<Self::Schema> {
                self.0
                    .iter()
                    .map(|description| {
                        Ok(AccessDescriptionSchema {
                            access_method: description.access_method,
                            access_location: description.access_location.to_schema()?,
                        })
                    })
                    .collect()
            }
        }

        impl ToAndFromX509Extension for $name {
            const OID: ObjectIdentifier = $oid;
        }
    };
}

info_access_extension!(
    AuthorityInfoAccess,
    oid::ID_PE_AUTHORITY_INFO_ACCESS,
    "AuthorityInfoAccessSyntax"
);
info_access_extension!(
    SubjectInfoAccess,
    oid::ID_PE_SUBJECT_INFO_ACCESS,
    "SubjectInfoAccessSyntax"
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuingDistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub only_contains_user_certs: bool,
    pub only_contains_ca_certs: bool,
    pub only_some_reasons: Option<BitString>,
    pub indirect_crl: bool,
    pub only_contains_attribute_certs: bool,
}

impl Simplified for IssuingDistributionPoint {
    type Schema = IssuingDistributionPointSchema;
    const NAME: &'static str = "IssuingDistributionPoint";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            distribution_point: schema
                .distribution_point
                .map(DistributionPointName::from_schema)
                .transpose()?,
            only_contains_user_certs: schema.only_contains_user_certs,
            only_contains_ca_certs: schema.only_contains_ca_certs,
            only_some_reasons: schema.only_some_reasons,
            indirect_crl: schema.indirect_crl,
            only_contains_attribute_certs: schema.only_contains_attribute_certs,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(IssuingDistributionPointSchema {
            distribution_point: self
                .distribution_point
                .as_ref()
                .map(DistributionPointName::to_schema)
                .transpose()?,
            only_contains_user_certs: self.only_contains_user_certs,
            only_contains_ca_certs: self.only_contains_ca_certs,
            only_some_reasons: self.only_some_reasons.clone(),
            indirect_crl: self.indirect_crl,
            only_contains_attribute_certs: self.only_contains_attribute_certs,
        })
    }
}

impl ToAndFromX509Extension for IssuingDistributionPoint {
    const OID: ObjectIdentifier = oid::ID_CE_ISSUING_DISTRIBUTION_POINT;
}

/// Declares an extension holding a single non-negative INTEGER.
macro_rules! integer_extension {
    ($name:ident, $oid:expr, $label:literal) => {
        /// Unsigned big-endian integer bytes.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(pub Vec<u8>);

        impl Simplified for $name {
            type Schema = Uint;
            const NAME: &'static str = $label;

            fn from_schema(schema: Self::Schema) -> Result<Self> {
                Ok(Self(schema.as_bytes().to_vec()))
            }

            fn to_schema(&self) -> Result<Self::Schema> {
                Ok(Uint::new(&self.0)?)
            }
        }

        impl ToAndFromX509Extension for $name {
            const OID: ObjectIdentifier = $oid;
        }
    };
}

integer_extension!(CrlNumber, oid::ID_CE_CRL_NUMBER, "CRLNumber");
integer_extension!(
    DeltaCrlIndicator,
    oid::ID_CE_DELTA_CRL_INDICATOR,
    "BaseCRLNumber"
);

pub use x509_cert::ext::pkix::CrlReason as ReasonCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrlReason(pub ReasonCode);

impl Simplified for CrlReason {
    type Schema = ReasonCode;
    const NAME: &'static str = "CRLReason";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self(schema))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(self.0)
    }
}

impl ToAndFromX509Extension for CrlReason {
    const OID: ObjectIdentifier = oid::ID_CE_CRL_REASON;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidityDate(pub OffsetDateTime);

impl Simplified for InvalidityDate {
    type Schema = GeneralizedTime;
    const NAME: &'static str = "InvalidityDate";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self(to_offset_date_time(schema.to_date_time())?))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(GeneralizedTime::from_date_time(to_date_time(self.0)?))
    }
}

impl ToAndFromX509Extension for InvalidityDate {
    const OID: ObjectIdentifier = oid::ID_CE_INVALIDITY_DATE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Tag;

    #[test]
    fn test_basic_constraints_encoding_decoding() {
        let original = BasicConstraints {
            is_ca: true,
            max_path_length: Some(3),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_authority_key_identifier_encoding_decoding() {
        let original = AuthorityKeyIdentifier {
            key_identifier: Some(vec![1, 2, 3, 4, 5]),
            authority_cert_issuer: Some(GeneralNames(vec![GeneralName::DnsName(
                "ca.example.com".to_string(),
            )])),
            authority_cert_serial_number: Some(vec![6, 7, 8, 9, 10]),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = AuthorityKeyIdentifier::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_key_usage_encoding_decoding() {
        let original = KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment);
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = KeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
        assert!(!decoded.contains(KeyUsages::KeyCertSign));
    }

    #[test]
    fn test_extended_key_usage_encoding_decoding() {
        let original = ExtendedKeyUsage::from_options(&[
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth,
        ]);
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = ExtendedKeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn name_constraints_from_wire() {
        let mut der = vec![0x30, 0x11, 0xa0, 0x0f, 0x30, 0x0d, 0x82, 0x0b];
        der.extend_from_slice(b"example.com");
        let constraints = NameConstraints::from_x509_extension_value(&der).unwrap();
        assert_eq!(
            constraints.permitted_subtrees,
            vec![GeneralSubtree::new(GeneralName::DnsName(
                "example.com".to_string()
            ))]
        );
        assert!(constraints.excluded_subtrees.is_empty());
        assert_eq!(constraints.to_x509_extension_value().unwrap(), der);
    }

    #[test]
    fn policy_constraints_read_plain_integers() {
        let constraints =
            PolicyConstraints::from_x509_extension_value(&[0x30, 0x06, 0x80, 0x01, 0x00, 0x81, 0x01, 0x02])
                .unwrap();
        assert_eq!(constraints.require_explicit_policy, Some(0));
        assert_eq!(constraints.inhibit_policy_mapping, Some(2));
    }

    #[test]
    fn distribution_points_round_trip() {
        let points = CrlDistributionPoints(vec![DistributionPoint {
            distribution_point: Some(DistributionPointName::FullName(GeneralNames(vec![
                GeneralName::UniformResourceIdentifier("http://crl.example.com/ca.crl".into()),
            ]))),
            ..Default::default()
        }]);
        let der = points.to_x509_extension_value().unwrap();
        assert_eq!(CrlDistributionPoints::from_x509_extension_value(&der).unwrap(), points);

        let idp = IssuingDistributionPoint {
            only_contains_ca_certs: true,
            ..Default::default()
        };
        let der = idp.to_x509_extension_value().unwrap();
        assert_eq!(der, vec![0x30, 0x03, 0x82, 0x01, 0xff]);
        assert_eq!(IssuingDistributionPoint::from_x509_extension_value(&der).unwrap(), idp);
    }

    #[test]
    fn info_access_keeps_location_form() {
        let aia = AuthorityInfoAccess(vec![AccessDescription {
            access_method: ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.2"),
            access_location: GeneralName::UniformResourceIdentifier(
                "http://ca.example.com/ca.cer".into(),
            ),
        }]);
        let der = aia.to_x509_extension_value().unwrap();
        assert_eq!(AuthorityInfoAccess::from_x509_extension_value(&der).unwrap(), aia);
    }

    #[test]
    fn policy_extensions_round_trip() {
        let cps = PolicyQualifierInfo {
            policy_qualifier_id: ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.2.1"),
            qualifier: Some(
                Any::new(Tag::Ia5String, b"http://ca.example.com/cps".to_vec()).unwrap(),
            ),
        };
        let policies = CertificatePolicies(vec![
            PolicyInformation {
                policy_identifier: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.55555.1.1"),
                policy_qualifiers: vec![cps],
            },
            PolicyInformation::new(oid::ANY_POLICY),
        ]);
        let der = policies.to_x509_extension_value().unwrap();
        let decoded = CertificatePolicies::from_x509_extension_value(&der).unwrap();
        assert_eq!(decoded, policies);
        assert_eq!(decoded.policy_ids().last(), Some(oid::ANY_POLICY));

        let mappings = PolicyMappings(vec![PolicyMapping {
            issuer_domain_policy: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.55555.1.1"),
            subject_domain_policy: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.55555.2.1"),
        }]);
        let der = mappings.to_x509_extension_value().unwrap();
        assert_eq!(PolicyMappings::from_x509_extension_value(&der).unwrap(), mappings);

        let constraints = PolicyConstraints {
            require_explicit_policy: None,
            inhibit_policy_mapping: Some(1),
        };
        let der = constraints.to_x509_extension_value().unwrap();
        assert_eq!(der, vec![0x30, 0x03, 0x81, 0x01, 0x01]);
        assert_eq!(PolicyConstraints::from_x509_extension_value(&der).unwrap(), constraints);

        let inhibit = InhibitAnyPolicy(2);
        let der = inhibit.to_x509_extension_value().unwrap();
        assert_eq!(der, vec![0x02, 0x01, 0x02]);
        assert_eq!(InhibitAnyPolicy::from_x509_extension_value(&der).unwrap(), inhibit);
    }

    #[test]
    fn subtree_distances_survive_encoding() {
        let constraints = NameConstraints {
            permitted_subtrees: vec![GeneralSubtree {
                base: GeneralName::DnsName("example.com".to_string()),
                minimum: 1,
                maximum: Some(3),
            }],
            excluded_subtrees: vec![GeneralSubtree::new(GeneralName::IpAddress(vec![
                10, 0, 0, 0, 255, 0, 0, 0,
            ]))],
        };
        let der = constraints.to_x509_extension_value().unwrap();
        assert_eq!(NameConstraints::from_x509_extension_value(&der).unwrap(), constraints);
    }

    #[test]
    fn issuing_distribution_point_with_every_field() {
        let idp = IssuingDistributionPoint {
            distribution_point: Some(DistributionPointName::NameRelativeToCrlIssuer(vec![
                AttributeTypeAndValue::utf8(oid::AT_COMMON_NAME, "partition 1").unwrap(),
            ])),
            only_contains_user_certs: true,
            only_contains_ca_certs: false,
            only_some_reasons: Some(BitString::new(1, vec![0x60]).unwrap()),
            indirect_crl: true,
            only_contains_attribute_certs: false,
        };
        let der = idp.to_x509_extension_value().unwrap();
        assert_eq!(IssuingDistributionPoint::from_x509_extension_value(&der).unwrap(), idp);
    }

    #[test]
    fn private_key_usage_period_and_directory_attributes() {
        let period = PrivateKeyUsagePeriod {
            not_before: Some(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()),
            not_after: None,
        };
        let der = period.to_x509_extension_value().unwrap();
        assert_eq!(PrivateKeyUsagePeriod::from_x509_extension_value(&der).unwrap(), period);

        let attributes = SubjectDirectoryAttributes(vec![Attribute {
            attr_type: ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.9.1"),
            values: vec![Any::new(Tag::GeneralizedTime, b"19700101120000Z".to_vec()).unwrap()],
        }]);
        let der = attributes.to_x509_extension_value().unwrap();
        assert_eq!(
            SubjectDirectoryAttributes::from_x509_extension_value(&der).unwrap(),
            attributes
        );
    }

    #[test]
    fn crl_number_is_unsigned() {
        let number = CrlNumber(vec![0x80]);
        let der = number.to_x509_extension_value().unwrap();
        assert_eq!(der, vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(CrlNumber::from_x509_extension_value(&der).unwrap(), number);
    }
}
