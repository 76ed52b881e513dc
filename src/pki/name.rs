use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Ia5StringRef, PrintableStringRef, SetOfVec};
use der::{Any, Tag, Tagged};
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::Simplified;
use crate::error::{CertPathError, Result};
use crate::oid;

/// One `(type, value)` pair of a relative distinguished name.
#[derive(Debug, Clone)]
pub struct AttributeTypeAndValue {
    pub attr_type: ObjectIdentifier,
    pub value: Any,
}

impl AttributeTypeAndValue {
    /// Builds a UTF8String-valued attribute.
    pub fn utf8(attr_type: ObjectIdentifier, value: &str) -> Result<Self> {
        Ok(Self {
            attr_type,
            value: Any::new(Tag::Utf8String, value.as_bytes())?,
        })
    }

    /// Builds a PrintableString-valued attribute.
    pub fn printable(attr_type: ObjectIdentifier, value: &str) -> Result<Self> {
        PrintableStringRef::new(value)?;
        Ok(Self {
            attr_type,
            value: Any::new(Tag::PrintableString, value.as_bytes())?,
        })
    }

    /// Builds an IA5String-valued attribute.
    pub fn ia5(attr_type: ObjectIdentifier, value: &str) -> Result<Self> {
        Ia5StringRef::new(value)?;
        Ok(Self {
            attr_type,
            value: Any::new(Tag::Ia5String, value.as_bytes())?,
        })
    }

    /// The value as text when it is one of the directory string types.
    pub fn value_string(&self) -> Option<String> {
        directory_string(&self.value)
    }

    /// Types must match; directory strings compare after [`string_prep`], anything
    /// else compares on its encoding.
    pub fn is_equal(&self, other: &Self) -> bool {
        if self.attr_type != other.attr_type {
            return false;
        }
        match (self.value_string(), other.value_string()) {
            (Some(left), Some(right)) => string_prep(&left) == string_prep(&right),
            _ => self.value == other.value,
        }
    }
}

impl PartialEq for AttributeTypeAndValue {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Eq for AttributeTypeAndValue {}

impl Simplified for AttributeTypeAndValue {
    type Schema = x509_cert::attr::AttributeTypeAndValue;
    const NAME: &'static str = "AttributeTypeAndValue";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            attr_type: schema.oid,
            value: schema.value,
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::attr::AttributeTypeAndValue {
            oid: self.attr_type,
            value: self.value.clone(),
        })
    }
}

/// Trims, collapses whitespace runs to a single space and lower-cases.
pub fn string_prep(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn directory_string(value: &Any) -> Option<String> {
    let bytes = value.value();
    match value.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::VisibleString
        | Tag::NumericString => String::from_utf8(bytes.to_vec()).ok(),
        // Latin-1 is the usual reading of T61 content in practice.
        Tag::TeletexString => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        Tag::BmpString => {
            if bytes.len() % 2 != 0 {
                return None;
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => None,
    }
}

/// A distinguished name: a sequence of attribute sets, outermost first.
///
/// Equality is semantic: same number of sets, compared in order. Within a set the
/// attributes are matched in any order under [`AttributeTypeAndValue::is_equal`],
/// since DER sorts the members of a multi-valued set.
#[derive(Debug, Clone, Default)]
pub struct RelativeDistinguishedNames {
    pub rdns: Vec<Vec<AttributeTypeAndValue>>,
}

impl RelativeDistinguishedNames {
    pub fn new(rdns: Vec<Vec<AttributeTypeAndValue>>) -> Self {
        Self { rdns }
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.iter().all(|set| set.is_empty())
    }

    /// All attributes in order, sets flattened.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.rdns.iter().flatten()
    }

    /// Text values of every attribute of type `attr_type`.
    pub fn values_of(&self, attr_type: &ObjectIdentifier) -> Vec<String> {
        self.attributes()
            .filter(|atv| atv.attr_type == *attr_type)
            .filter_map(AttributeTypeAndValue::value_string)
            .collect()
    }

    pub fn common_name(&self) -> Option<String> {
        self.values_of(&oid::AT_COMMON_NAME).into_iter().next()
    }
}

/// Every attribute of `left` pairs with a distinct equal attribute of `right`.
fn same_attribute_set(left: &[AttributeTypeAndValue], right: &[AttributeTypeAndValue]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut paired = vec![false; right.len()];
    left.iter().all(|attribute| {
        match (0..right.len()).find(|&i| !paired[i] && attribute.is_equal(&right[i])) {
            Some(i) => {
                paired[i] = true;
                true
            }
            None => false,
        }
    })
}

impl PartialEq for RelativeDistinguishedNames {
    fn eq(&self, other: &Self) -> bool {
        self.rdns.len() == other.rdns.len()
            && self
                .rdns
                .iter()
                .zip(&other.rdns)
                .all(|(left, right)| same_attribute_set(left, right))
    }
}

impl Eq for RelativeDistinguishedNames {}

impl Simplified for RelativeDistinguishedNames {
    type Schema = x509_cert::name::Name;
    const NAME: &'static str = "RelativeDistinguishedNames";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let rdns = schema
            .0
            .into_iter()
            .map(|set| {
                set.0
                    .iter()
                    .cloned()
                    .map(AttributeTypeAndValue::from_schema)
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rdns })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let sets = self
            .rdns
            .iter()
            .map(|set| {
                let attributes = set
                    .iter()
                    .map(AttributeTypeAndValue::to_schema)
                    .collect::<Result<Vec<_>>>()?;
                let set = SetOfVec::try_from(attributes)
                    .map_err(|e| CertPathError::EncodingError(e.to_string()))?;
                Ok(RelativeDistinguishedName(set))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RdnSequence(sets))
    }
}

/// Distinguished name parameters for building an X.509 certificate.
///
/// Only the attributes that are set end up in the encoded name, in the order
/// C, ST, L, O, OU, CN, emailAddress.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
    pub email_address: Option<String>,
}

impl DistinguishedName {
    pub fn to_rdns(&self) -> Result<RelativeDistinguishedNames> {
        let mut rdns = Vec::new();
        if let Some(country) = &self.country {
            rdns.push(vec![AttributeTypeAndValue::printable(
                oid::AT_COUNTRY_NAME,
                country,
            )?]);
        }
        let utf8_fields = [
            (oid::AT_STATE_OR_PROVINCE_NAME, &self.state),
            (oid::AT_LOCALITY_NAME, &self.locality),
            (oid::AT_ORGANIZATION_NAME, &self.organization),
            (oid::AT_ORGANIZATIONAL_UNIT_NAME, &self.organization_unit),
        ];
        for (attr_type, value) in utf8_fields {
            if let Some(value) = value {
                rdns.push(vec![AttributeTypeAndValue::utf8(attr_type, value)?]);
            }
        }
        rdns.push(vec![AttributeTypeAndValue::utf8(
            oid::AT_COMMON_NAME,
            &self.common_name,
        )?]);
        if let Some(email) = &self.email_address {
            rdns.push(vec![AttributeTypeAndValue::ia5(oid::AT_EMAIL_ADDRESS, email)?]);
        }
        Ok(RelativeDistinguishedNames::new(rdns))
    }

    pub fn from_rdns(rdns: &RelativeDistinguishedNames) -> Self {
        let first = |attr_type| rdns.values_of(&attr_type).into_iter().next();
        DistinguishedName {
            common_name: first(oid::AT_COMMON_NAME).unwrap_or_default(),
            country: first(oid::AT_COUNTRY_NAME),
            state: first(oid::AT_STATE_OR_PROVINCE_NAME),
            locality: first(oid::AT_LOCALITY_NAME),
            organization: first(oid::AT_ORGANIZATION_NAME),
            organization_unit: first(oid::AT_ORGANIZATIONAL_UNIT_NAME),
            email_address: first(oid::AT_EMAIL_ADDRESS),
        }
    }
}
