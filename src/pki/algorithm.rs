use const_oid::ObjectIdentifier;
use der::asn1::Uint;
use der::{Any, Tag, Tagged};
use x509_cert::spki::AlgorithmIdentifierOwned;

use super::schema::{
    OtherPrimeInfoSchema, RsaPrivateKeySchema, RsaPssParamsSchema, RsaPublicKeySchema,
};
use super::{Simplified, convert};
use crate::error::{CertPathError, Result};
use crate::oid::{self, HashAlgorithm};

/// An algorithm OID with its optional, opaque parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm_id: ObjectIdentifier,
    pub algorithm_params: Option<Any>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm_id: ObjectIdentifier) -> Self {
        Self {
            algorithm_id,
            algorithm_params: None,
        }
    }

    /// Identifier with an explicit NULL parameter, as the RSA PKCS#1 OIDs use.
    pub fn with_null_params(algorithm_id: ObjectIdentifier) -> Result<Self> {
        Ok(Self {
            algorithm_id,
            algorithm_params: Some(Any::new(Tag::Null, Vec::<u8>::new())?),
        })
    }

    /// Display name from the algorithm registry, if registered.
    pub fn name(&self) -> Option<&'static str> {
        oid::algorithm_name(&self.algorithm_id)
    }

    pub fn into_owned(self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: self.algorithm_id,
            parameters: self.algorithm_params,
        }
    }
}

impl From<AlgorithmIdentifierOwned> for AlgorithmIdentifier {
    fn from(value: AlgorithmIdentifierOwned) -> Self {
        Self {
            algorithm_id: value.oid,
            algorithm_params: value.parameters,
        }
    }
}

impl Simplified for AlgorithmIdentifier {
    type Schema = AlgorithmIdentifierOwned;
    const NAME: &'static str = "AlgorithmIdentifier";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(schema.into())
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(self.clone().into_owned())
    }
}

/// RSASSA-PSS parameters with the RFC 4055 defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPssParams {
    pub hash_algorithm: AlgorithmIdentifier,
    pub mask_gen_algorithm: AlgorithmIdentifier,
    pub salt_length: u32,
    pub trailer_field: u32,
}

impl Default for RsaPssParams {
    fn default() -> Self {
        // sha1 and mgf1SHA1 with salt 20 and trailer 1
        let sha1 = AlgorithmIdentifier::new(oid::ID_SHA_1);
        Self {
            mask_gen_algorithm: mgf1(&sha1).unwrap_or_else(|_| sha1.clone()),
            hash_algorithm: sha1,
            salt_length: 20,
            trailer_field: 1,
        }
    }
}

fn mgf1(hash: &AlgorithmIdentifier) -> Result<AlgorithmIdentifier> {
    Ok(AlgorithmIdentifier {
        algorithm_id: oid::ID_MGF1,
        algorithm_params: Some(Any::encode_from(&hash.clone().into_owned())?),
    })
}

impl RsaPssParams {
    /// Parameters for signing with `hash`: MGF1 over the same hash and a salt as long
    /// as the digest.
    pub fn for_hash(hash: HashAlgorithm) -> Result<Self> {
        let hash_algorithm = AlgorithmIdentifier::new(hash.oid());
        Ok(Self {
            mask_gen_algorithm: mgf1(&hash_algorithm)?,
            hash_algorithm,
            salt_length: hash.output_len() as u32,
            trailer_field: 1,
        })
    }

    pub fn hash(&self) -> Result<HashAlgorithm> {
        HashAlgorithm::from_oid(&self.hash_algorithm.algorithm_id)
    }

    /// Reads the parameters of an RSASSA-PSS AlgorithmIdentifier. Absent parameters
    /// mean all defaults.
    pub fn from_algorithm(algorithm: &AlgorithmIdentifier) -> Result<Self> {
        match &algorithm.algorithm_params {
            None => Ok(Self::default()),
            Some(params) if params.tag() == Tag::Null => Ok(Self::default()),
            Some(params) => {
                let schema: RsaPssParamsSchema =
                    convert(params).map_err(|e| CertPathError::schema(Self::NAME, e))?;
                Self::from_schema(schema)
            }
        }
    }
}

impl Simplified for RsaPssParams {
    type Schema = RsaPssParamsSchema;
    const NAME: &'static str = "RSASSA-PSS-params";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            hash_algorithm: schema
                .hash_algorithm
                .map(AlgorithmIdentifier::from)
                .unwrap_or(defaults.hash_algorithm),
            mask_gen_algorithm: schema
                .mask_gen_algorithm
                .map(AlgorithmIdentifier::from)
                .unwrap_or(defaults.mask_gen_algorithm),
            salt_length: schema.salt_length.unwrap_or(defaults.salt_length),
            trailer_field: schema.trailer_field.unwrap_or(defaults.trailer_field),
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let defaults = Self::default();
        let keep = |value: &AlgorithmIdentifier, default: &AlgorithmIdentifier| {
            (value != default).then(|| value.clone().into_owned())
        };
        Ok(RsaPssParamsSchema {
            hash_algorithm: keep(&self.hash_algorithm, &defaults.hash_algorithm),
            mask_gen_algorithm: keep(&self.mask_gen_algorithm, &defaults.mask_gen_algorithm),
            salt_length: (self.salt_length != defaults.salt_length).then_some(self.salt_length),
            trailer_field: (self.trailer_field != defaults.trailer_field)
                .then_some(self.trailer_field),
        })
    }
}

/// PKCS#1 `RSAPublicKey`. Integers are unsigned big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub modulus: Vec<u8>,
    pub public_exponent: Vec<u8>,
}

impl Simplified for RsaPublicKey {
    type Schema = RsaPublicKeySchema;
    const NAME: &'static str = "RSAPublicKey";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        Ok(Self {
            modulus: schema.modulus.as_bytes().to_vec(),
            public_exponent: schema.public_exponent.as_bytes().to_vec(),
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        Ok(RsaPublicKeySchema {
            modulus: Uint::new(&self.modulus)?,
            public_exponent: Uint::new(&self.public_exponent)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherPrimeInfo {
    pub prime: Vec<u8>,
    pub exponent: Vec<u8>,
    pub coefficient: Vec<u8>,
}

/// PKCS#1 `RSAPrivateKey`. Integers are unsigned big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub version: u8,
    pub modulus: Vec<u8>,
    pub public_exponent: Vec<u8>,
    pub private_exponent: Vec<u8>,
    pub prime1: Vec<u8>,
    pub prime2: Vec<u8>,
    pub exponent1: Vec<u8>,
    pub exponent2: Vec<u8>,
    pub coefficient: Vec<u8>,
    pub other_prime_infos: Option<Vec<OtherPrimeInfo>>,
}

impl RsaPrivateKey {
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
        }
    }
}

impl Simplified for RsaPrivateKey {
    type Schema = RsaPrivateKeySchema;
    const NAME: &'static str = "RSAPrivateKey";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        let bytes = |value: &Uint| value.as_bytes().to_vec();
        Ok(Self {
            version: schema.version,
            modulus: bytes(&schema.modulus),
            public_exponent: bytes(&schema.public_exponent),
            private_exponent: bytes(&schema.private_exponent),
            prime1: bytes(&schema.prime1),
            prime2: bytes(&schema.prime2),
            exponent1: bytes(&schema.exponent1),
            exponent2: bytes(&schema.exponent2),
            coefficient: bytes(&schema.coefficient),
            other_prime_infos: schema.other_prime_infos.map(|infos| {
                infos
                    .iter()
                    .map(|info| OtherPrimeInfo {
                        prime: bytes(&info.prime),
                        exponent: bytes(&info.exponent),
                        coefficient: bytes(&info.coefficient),
                    })
                    .collect()
            }),
        })
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        let other_prime_infos = match &self.other_prime_infos {
            Some(infos) => Some(
                infos
                    .iter()
                    .map(|info| {
                        Ok(OtherPrimeInfoSchema {
                            prime: Uint::new(&info.prime)?,
                            exponent: Uint::new(&info.exponent)?,
                            coefficient: Uint::new(&info.coefficient)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };
        Ok(RsaPrivateKeySchema {
            version: self.version,
            modulus: Uint::new(&self.modulus)?,
            public_exponent: Uint::new(&self.public_exponent)?,
            private_exponent: Uint::new(&self.private_exponent)?,
            prime1: Uint::new(&self.prime1)?,
            prime2: Uint::new(&self.prime2)?,
            exponent1: Uint::new(&self.exponent1)?,
            exponent2: Uint::new(&self.exponent2)?,
            coefficient: Uint::new(&self.coefficient)?,
            other_prime_infos,
        })
    }
}
