//! Simplified PKI structures.
//!
//! Each structure here is a plain Rust value built over a `der`-typed schema. The
//! [`Simplified`] trait ties the two together: decoding into the schema is the shape
//! check, and a failed decode surfaces as [`CertPathError::SchemaMismatch`] carrying
//! the structure name.

pub mod algorithm;
pub mod attribute;
pub mod extension;
pub mod extensions;
pub mod general_name;
pub mod name;
pub mod schema;
pub mod time;

use der::{Decode, DecodeOwned, Encode};

use crate::error::{CertPathError, Result};

pub use algorithm::{AlgorithmIdentifier, RsaPssParams};
pub use attribute::Attribute;
pub use extension::{Extension, ExtensionValue};
pub use general_name::{GeneralName, GeneralNames};
pub use name::{AttributeTypeAndValue, RelativeDistinguishedNames};
pub use time::Time;

/// A structure with a schema-level twin.
pub trait Simplified: Sized {
    /// The `der` type the structure is decoded from and encoded to.
    type Schema: DecodeOwned + Encode;

    /// Structure name reported in schema mismatches.
    const NAME: &'static str;

    fn from_schema(schema: Self::Schema) -> Result<Self>;

    fn to_schema(&self) -> Result<Self::Schema>;

    fn from_der(bytes: &[u8]) -> Result<Self> {
        let schema =
            Self::Schema::from_der(bytes).map_err(|e| CertPathError::schema(Self::NAME, e))?;
        Self::from_schema(schema)
    }

    fn to_der(&self) -> Result<Vec<u8>> {
        let schema = self.to_schema()?;
        schema
            .to_der()
            .map_err(|e| CertPathError::EncodingError(e.to_string()))
    }
}

/// Re-reads a captured value as another `der` type by round-tripping its encoding.
pub(crate) fn convert<T: Encode, U: DecodeOwned>(value: &T) -> Result<U> {
    Ok(U::from_der(&value.to_der()?)?)
}
