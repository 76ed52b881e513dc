//! Generic `Extension` wrapper and the dispatch over well-known payloads.

use const_oid::ObjectIdentifier;
use der::asn1::OctetString;

use super::Simplified;
use super::extensions::*;
use crate::error::Result;

/// Declares [`ExtensionValue`] and the OID dispatch over its payload types.
macro_rules! extension_values {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A decoded well-known extension payload.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ExtensionValue {
            $($variant($ty),)*
        }

        impl ExtensionValue {
            /// Decodes `der` as the payload registered for `oid`. `None` when the OID
            /// is not in the table.
            pub fn parse(oid: &ObjectIdentifier, der: &[u8]) -> Option<Result<Self>> {
                $(
                    if *oid == <$ty as ToAndFromX509Extension>::OID {
                        return Some(
                            <$ty as ToAndFromX509Extension>::from_x509_extension_value(der)
                                .map(ExtensionValue::$variant),
                        );
                    }
                )*
                None
            }

            pub fn oid(&self) -> ObjectIdentifier {
                match self {
                    $(ExtensionValue::$variant(_) => <$ty as ToAndFromX509Extension>::OID,)*
                }
            }

            pub fn to_der(&self) -> Result<Vec<u8>> {
                match self {
                    $(ExtensionValue::$variant(value) => value.to_x509_extension_value(),)*
                }
            }
        }

        $(
            impl From<$ty> for ExtensionValue {
                fn from(value: $ty) -> Self {
                    ExtensionValue::$variant(value)
                }
            }

            impl KnownExtension for $ty {
                fn from_value(value: &ExtensionValue) -> Option<&Self> {
                    match value {
                        ExtensionValue::$variant(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*

        /// Whether `oid` has a registered payload decoder.
        pub fn is_well_known(oid: &ObjectIdentifier) -> bool {
            false $(|| *oid == <$ty as ToAndFromX509Extension>::OID)*
        }
    };
}

/// A payload type that has a variant in [`ExtensionValue`].
pub trait KnownExtension: ToAndFromX509Extension + Into<ExtensionValue> {
    fn from_value(value: &ExtensionValue) -> Option<&Self>;
}

extension_values! {
    SubjectDirectoryAttributes(SubjectDirectoryAttributes),
    SubjectKeyIdentifier(SubjectKeyIdentifier),
    KeyUsage(KeyUsage),
    PrivateKeyUsagePeriod(PrivateKeyUsagePeriod),
    SubjectAltName(SubjectAltName),
    IssuerAltName(IssuerAltName),
    BasicConstraints(BasicConstraints),
    CrlNumber(CrlNumber),
    CrlReason(CrlReason),
    InvalidityDate(InvalidityDate),
    DeltaCrlIndicator(DeltaCrlIndicator),
    IssuingDistributionPoint(IssuingDistributionPoint),
    CertificateIssuer(CertificateIssuer),
    NameConstraints(NameConstraints),
    CrlDistributionPoints(CrlDistributionPoints),
    CertificatePolicies(CertificatePolicies),
    PolicyMappings(PolicyMappings),
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    PolicyConstraints(PolicyConstraints),
    ExtendedKeyUsage(ExtendedKeyUsage),
    FreshestCrl(FreshestCrl),
    InhibitAnyPolicy(InhibitAnyPolicy),
    AuthorityInfoAccess(AuthorityInfoAccess),
    SubjectInfoAccess(SubjectInfoAccess),
}

/// `Extension ::= SEQUENCE { extnID, critical BOOLEAN DEFAULT FALSE, extnValue OCTET STRING }`.
///
/// `parsed_value` is filled when `extn_id` is well known and `extn_value` decodes as
/// its payload. A payload that fails to decode leaves it `None`; the extension
/// itself stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub extn_id: ObjectIdentifier,
    pub critical: bool,
    pub extn_value: Vec<u8>,
    pub parsed_value: Option<ExtensionValue>,
}

impl Extension {
    /// Builds an extension from a typed payload.
    pub fn new<T: KnownExtension>(value: T, critical: bool) -> Result<Self> {
        Ok(Self {
            extn_id: T::OID,
            critical,
            extn_value: value.to_x509_extension_value()?,
            parsed_value: Some(value.into()),
        })
    }

    /// Builds an extension from raw parts, decoding the payload when the OID is known.
    pub fn from_parts(extn_id: ObjectIdentifier, critical: bool, extn_value: Vec<u8>) -> Self {
        let parsed_value = match ExtensionValue::parse(&extn_id, &extn_value) {
            Some(Ok(value)) => Some(value),
            Some(Err(err)) => {
                log::warn!("extension {extn_id} has a malformed value: {err}");
                None
            }
            None => None,
        };
        Self {
            extn_id,
            critical,
            extn_value,
            parsed_value,
        }
    }

    /// The decoded payload as `T`, if this extension carries one.
    pub fn value<T: KnownExtension>(&self) -> Option<&T> {
        self.parsed_value.as_ref().and_then(T::from_value)
    }

    pub fn is_well_known(&self) -> bool {
        is_well_known(&self.extn_id)
    }

    /// A well-known extension whose value did not decode.
    pub fn is_malformed(&self) -> bool {
        self.parsed_value.is_none() && self.is_well_known()
    }
}

/// Finds the first extension carrying a `T` payload.
pub fn find_extension<T: KnownExtension>(extensions: &[Extension]) -> Option<&T> {
    extensions.iter().find_map(Extension::value::<T>)
}

impl Simplified for Extension {
    type Schema = x509_cert::ext::Extension;
    const NAME: &'static str = "Extension";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self::from_parts(
            schema.extn_id,
            schema.critical,
            schema.extn_value.into_bytes(),
        ))
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.extn_id,
            critical: self.critical,
            extn_value: OctetString::new(self.extn_value.clone())?,
        })
    }
}
