use const_oid::ObjectIdentifier;
use der::Any;
use der::asn1::SetOfVec;

use super::Simplified;
use crate::error::Result;

/// `Attribute ::= SEQUENCE { type OBJECT IDENTIFIER, values SET OF ANY }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attr_type: ObjectIdentifier,
    pub values: Vec<Any>,
}

impl Simplified for Attribute {
    type Schema = x509_cert::attr::Attribute;
    const NAME: &'static str = "Attribute";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            attr_type: schema.oid,
            values: schema.values.iter().cloned().collect(),
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(x509_cert::attr::Attribute {
            oid: self.attr_type,
            values: SetOfVec::try_from(self.values.clone())?,
        })
    }
}
