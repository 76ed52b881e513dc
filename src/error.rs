//! use certpath::error::CertPathError;

use thiserror::Error;

/// Represents errors that can occur in the certpath library.
///
/// These are the structural and cryptographic failures. Certification path
/// validation never returns them as errors; it reports a
/// [`ChainFailure`](crate::chain::ChainFailure) inside a structured result instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertPathError {
    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// The input did not match the ASN.1 schema of the named structure.
    #[error("Object's schema was not verified against input data for {structure}: {reason}")]
    SchemaMismatch {
        structure: &'static str,
        reason: String,
    },

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required argument was missing or inconsistent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The algorithm, or the key and hash combination, is not supported.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// A signing or key import primitive failed.
    #[error("Cryptographic operation failed: {0}")]
    CryptoError(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error from RSA PKCS1 operations.
    #[error("RSA PKCS1 error: {0}")]
    RsaPkcs1Error(String),

    /// Error while reading or writing PEM armour.
    #[error("PEM error: {0}")]
    PemError(String),
}

impl CertPathError {
    /// Builds a [`CertPathError::SchemaMismatch`] for `structure`.
    pub fn schema(structure: &'static str, reason: impl ToString) -> Self {
        CertPathError::SchemaMismatch {
            structure,
            reason: reason.to_string(),
        }
    }
}

impl From<der::Error> for CertPathError {
    /// Converts a `der::Error` into a `CertPathError`.
    fn from(err: der::Error) -> Self {
        CertPathError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for CertPathError {
    fn from(err: rsa::Error) -> Self {
        CertPathError::RsaError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for CertPathError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        CertPathError::RsaPkcs1Error(err.to_string())
    }
}

impl From<pkcs8::Error> for CertPathError {
    fn from(err: pkcs8::Error) -> Self {
        CertPathError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CertPathError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CertPathError::EncodingError(err.to_string())
    }
}

impl From<ecdsa::Error> for CertPathError {
    fn from(err: ecdsa::Error) -> Self {
        CertPathError::CryptoError(err.to_string())
    }
}

impl From<pem::PemError> for CertPathError {
    fn from(err: pem::PemError) -> Self {
        CertPathError::PemError(err.to_string())
    }
}

impl From<time::error::ComponentRange> for CertPathError {
    fn from(err: time::error::ComponentRange) -> Self {
        CertPathError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CertPathError>;
