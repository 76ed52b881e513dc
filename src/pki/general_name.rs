//! `GeneralName` and `GeneralNames` (RFC 5280 §4.2.1.6).
//!
//! The CHOICE alternatives are context-specific tagged. Alternatives whose payload
//! is a universal type (IA5String, OCTET STRING, OBJECT IDENTIFIER, SEQUENCE) are
//! decoded by re-tagging the captured node with the universal tag and running the
//! ordinary `der` decoder for that type on the copy.

use const_oid::ObjectIdentifier;
use der::asn1::{Ia5String, OctetString};
use der::{Any, DecodeOwned, Tag, TagNumber, Tagged};

use super::name::RelativeDistinguishedNames;
use super::schema::OtherNameSchema;
use super::{Simplified, convert};
use crate::error::{CertPathError, Result};

/// `otherName [0] SEQUENCE { type-id OBJECT IDENTIFIER, value [0] EXPLICIT ANY }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherName {
    pub type_id: ObjectIdentifier,
    pub value: Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    OtherName(OtherName),
    Rfc822Name(String),
    DnsName(String),
    /// Content octets of the ORAddress.
    X400Address(Vec<u8>),
    DirectoryName(RelativeDistinguishedNames),
    /// Content octets of the EDIPartyName.
    EdiPartyName(Vec<u8>),
    UniformResourceIdentifier(String),
    /// Address bytes, followed by the mask bytes inside name constraints.
    IpAddress(Vec<u8>),
    RegisteredId(ObjectIdentifier),
}

impl GeneralName {
    /// Context-specific tag number of the alternative.
    pub fn tag_number(&self) -> u8 {
        match self {
            GeneralName::OtherName(_) => 0,
            GeneralName::Rfc822Name(_) => 1,
            GeneralName::DnsName(_) => 2,
            GeneralName::X400Address(_) => 3,
            GeneralName::DirectoryName(_) => 4,
            GeneralName::EdiPartyName(_) => 5,
            GeneralName::UniformResourceIdentifier(_) => 6,
            GeneralName::IpAddress(_) => 7,
            GeneralName::RegisteredId(_) => 8,
        }
    }
}

/// Decodes `node` as `T` after replacing its tag with `tag`. `node` itself is untouched.
fn decode_retagged<T: DecodeOwned>(node: &Any, tag: Tag) -> Result<T> {
    let retagged = Any::new(tag, node.value())?;
    convert(&retagged)
}

fn context_node(number: u8, constructed: bool, content: &[u8]) -> Result<Any> {
    let tag = Tag::ContextSpecific {
        constructed,
        number: TagNumber::new(number),
    };
    Ok(Any::new(tag, content)?)
}

impl Simplified for GeneralName {
    type Schema = Any;
    const NAME: &'static str = "GeneralName";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let number = match schema.tag() {
            Tag::ContextSpecific { number, .. } => number.value(),
            other => {
                return Err(CertPathError::schema(
                    Self::NAME,
                    format!("unexpected tag {other}"),
                ));
            }
        };

        let name = match number {
            0 => {
                let other: OtherNameSchema = decode_retagged(&schema, Tag::Sequence)?;
                GeneralName::OtherName(OtherName {
                    type_id: other.type_id,
                    value: other.value,
                })
            }
            1 => GeneralName::Rfc822Name(
                decode_retagged::<Ia5String>(&schema, Tag::Ia5String)?.to_string(),
            ),
            2 => GeneralName::DnsName(
                decode_retagged::<Ia5String>(&schema, Tag::Ia5String)?.to_string(),
            ),
            3 => GeneralName::X400Address(schema.value().to_vec()),
            4 => GeneralName::DirectoryName(RelativeDistinguishedNames::from_der(
                schema.value(),
            )?),
            5 => GeneralName::EdiPartyName(schema.value().to_vec()),
            6 => GeneralName::UniformResourceIdentifier(
                decode_retagged::<Ia5String>(&schema, Tag::Ia5String)?.to_string(),
            ),
            7 => GeneralName::IpAddress(
                decode_retagged::<OctetString>(&schema, Tag::OctetString)?.into_bytes(),
            ),
            8 => GeneralName::RegisteredId(decode_retagged(&schema, Tag::ObjectIdentifier)?),
            other => {
                return Err(CertPathError::schema(
                    Self::NAME,
                    format!("unknown alternative [{other}]"),
                ));
            }
        };
        Ok(name)
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let number = self.tag_number();
        match self {
            GeneralName::OtherName(other) => {
                let sequence = Any::encode_from(&OtherNameSchema {
                    type_id: other.type_id,
                    value: other.value.clone(),
                })?;
                context_node(number, true, sequence.value())
            }
            GeneralName::Rfc822Name(text)
            | GeneralName::DnsName(text)
            | GeneralName::UniformResourceIdentifier(text) => {
                let ia5 = Ia5String::new(text)?;
                context_node(number, false, ia5.as_bytes())
            }
            GeneralName::X400Address(content) | GeneralName::EdiPartyName(content) => {
                context_node(number, true, content)
            }
            GeneralName::DirectoryName(name) => context_node(number, true, &name.to_der()?),
            GeneralName::IpAddress(bytes) => context_node(number, false, bytes),
            GeneralName::RegisteredId(id) => context_node(number, false, id.as_bytes()),
        }
    }
}

/// `GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralNames(pub Vec<GeneralName>);

impl GeneralNames {
    pub fn iter(&self) -> impl Iterator<Item = &GeneralName> {
        self.0.iter()
    }

    pub(crate) fn from_nodes(nodes: Vec<Any>) -> Result<Self> {
        nodes
            .into_iter()
            .map(GeneralName::from_schema)
            .collect::<Result<Vec<_>>>()
            .map(GeneralNames)
    }

    pub(crate) fn to_nodes(&self) -> Result<Vec<Any>> {
        self.0.iter().map(GeneralName::to_schema).collect()
    }
}

impl Simplified for GeneralNames {
    type Schema = Vec<Any>;
    const NAME: &'static str = "GeneralNames";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Self::from_nodes(schema)
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        self.to_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pki::name::AttributeTypeAndValue;

    fn round_trip(name: GeneralName) {
        let der = name.to_der().unwrap();
        assert_eq!(der[0] & 0x1f, name.tag_number());
        assert_eq!(GeneralName::from_der(&der).unwrap(), name);
    }

    #[test]
    fn every_alternative_decodes_through_its_tag() {
        round_trip(GeneralName::OtherName(OtherName {
            type_id: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.20.2.3"),
            value: Any::new(Tag::Utf8String, b"upn@example.com".to_vec()).unwrap(),
        }));
        round_trip(GeneralName::Rfc822Name("user@example.com".into()));
        round_trip(GeneralName::DnsName("www.example.com".into()));
        round_trip(GeneralName::X400Address(vec![0x30, 0x00]));
        round_trip(GeneralName::DirectoryName(RelativeDistinguishedNames::new(
            vec![vec![
                AttributeTypeAndValue::utf8(oid::AT_COMMON_NAME, "Example").unwrap(),
            ]],
        )));
        round_trip(GeneralName::EdiPartyName(vec![0xa1, 0x03, 0x0c, 0x01, 0x41]));
        round_trip(GeneralName::UniformResourceIdentifier(
            "https://example.com/crl".into(),
        ));
        round_trip(GeneralName::IpAddress(vec![192, 168, 0, 1]));
        round_trip(GeneralName::RegisteredId(oid::ID_CE_KEY_USAGE));
    }

    #[test]
    fn dns_name_wire_form() {
        let der = GeneralName::DnsName("a.io".into()).to_der().unwrap();
        assert_eq!(der, vec![0x82, 0x04, b'a', b'.', b'i', b'o']);
    }

    #[test]
    fn directory_name_is_explicitly_wrapped() {
        let der = GeneralName::DirectoryName(RelativeDistinguishedNames::default())
            .to_der()
            .unwrap();
        assert_eq!(der, vec![0xa4, 0x02, 0x30, 0x00]);
    }

    #[test]
    fn universal_tag_is_rejected() {
        let err = GeneralName::from_der(&[0x16, 0x01, b'a']).unwrap_err();
        assert!(matches!(
            err,
            CertPathError::SchemaMismatch {
                structure: "GeneralName",
                ..
            }
        ));
    }

    #[test]
    fn sequence_of_names() {
        let names = GeneralNames(vec![
            GeneralName::DnsName("example.com".into()),
            GeneralName::IpAddress(vec![10, 0, 0, 1]),
        ]);
        let decoded = GeneralNames::from_der(&names.to_der().unwrap()).unwrap();
        assert_eq!(decoded, names);
    }
}
