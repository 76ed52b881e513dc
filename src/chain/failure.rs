//! Reasons a certification path is rejected, grouped by validation phase.
//!
//! Every reason has a stable numeric code so callers that only keep the code can
//! still tell the reasons apart.

use std::fmt;

use const_oid::ObjectIdentifier;
use thiserror::Error;

/// Chain assembly: classification, issuer search, validity and anchoring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureFailure {
    #[error("Empty certificate chain")]
    EmptyChain,

    #[error("Expected exactly one end-entity certificate, found {0}")]
    EndEntityNotUnique(usize),

    #[error("Certificate '{subject}' sets keyCertSign but is not a CA")]
    KeyCertSignWithoutCa { subject: String },

    #[error("CA certificate '{subject}' does not set keyCertSign")]
    CaWithoutKeyCertSign { subject: String },

    #[error("CA certificate '{subject}' does not set cRLSign")]
    CaWithoutCrlSign { subject: String },

    #[error("No issuer found for certificate '{subject}'")]
    IssuerNotFound { subject: String },

    #[error("Self-signed certificate '{subject}' has an invalid signature")]
    BadSignature { subject: String },

    #[error("Certificate '{subject}' is not valid at the check date")]
    OutsideValidityPeriod { subject: String },

    #[error("Root certificate '{subject}' is not a trusted anchor")]
    RootNotTrusted { subject: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevocationFailure {
    #[error("Certificate '{subject}' is revoked")]
    Revoked { subject: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtensionFailure {
    #[error("Certificate '{subject}' has an unrecognized critical extension {oid}")]
    UnrecognizedCriticalExtension {
        subject: String,
        oid: ObjectIdentifier,
    },

    #[error("Certificate '{subject}' has a malformed critical extension {oid}")]
    MalformedCriticalExtension {
        subject: String,
        oid: ObjectIdentifier,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyFailure {
    #[error("No acceptable certificate policy")]
    NoAcceptablePolicy,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameConstraintFailure {
    #[error("Certificate '{subject}' has no {form} name within the permitted subtrees")]
    NotPermitted { subject: String, form: NameForm },

    #[error("Certificate '{subject}' has a {form} name within the excluded subtrees")]
    Excluded { subject: String, form: NameForm },

    #[error("Certificate '{subject}' does not match any required name form")]
    RequiredNameFormMissing { subject: String },
}

/// The name forms name constraints apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameForm {
    Rfc822,
    Dns,
    Directory,
    Uri,
    IpAddress,
}

impl NameForm {
    pub const ALL: [NameForm; 5] = [
        NameForm::Rfc822,
        NameForm::Dns,
        NameForm::Directory,
        NameForm::Uri,
        NameForm::IpAddress,
    ];
}

impl fmt::Display for NameForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NameForm::Rfc822 => "rfc822Name",
            NameForm::Dns => "dNSName",
            NameForm::Directory => "directoryName",
            NameForm::Uri => "uniformResourceIdentifier",
            NameForm::IpAddress => "iPAddress",
        };
        f.write_str(name)
    }
}

/// Why a certification path was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainFailure {
    #[error(transparent)]
    Structure(#[from] StructureFailure),

    #[error(transparent)]
    Revocation(#[from] RevocationFailure),

    #[error(transparent)]
    Extension(#[from] ExtensionFailure),

    #[error(transparent)]
    Policy(#[from] PolicyFailure),

    #[error(transparent)]
    NameConstraint(#[from] NameConstraintFailure),
}

impl ChainFailure {
    /// Numeric result code, never 0.
    pub fn code(&self) -> u32 {
        match self {
            ChainFailure::Structure(failure) => match failure {
                StructureFailure::EmptyChain => 1,
                StructureFailure::EndEntityNotUnique(_) => 2,
                StructureFailure::KeyCertSignWithoutCa { .. } => 3,
                StructureFailure::CaWithoutKeyCertSign { .. } => 4,
                StructureFailure::CaWithoutCrlSign { .. } => 5,
                StructureFailure::IssuerNotFound { .. } => 6,
                StructureFailure::BadSignature { .. } => 7,
                StructureFailure::OutsideValidityPeriod { .. } => 8,
                StructureFailure::RootNotTrusted { .. } => 10,
            },
            ChainFailure::Revocation(RevocationFailure::Revoked { .. }) => 9,
            ChainFailure::Extension(failure) => match failure {
                ExtensionFailure::UnrecognizedCriticalExtension { .. } => 11,
                ExtensionFailure::MalformedCriticalExtension { .. } => 16,
            },
            ChainFailure::Policy(PolicyFailure::NoAcceptablePolicy) => 12,
            ChainFailure::NameConstraint(failure) => match failure {
                NameConstraintFailure::NotPermitted { .. } => 13,
                NameConstraintFailure::Excluded { .. } => 14,
                NameConstraintFailure::RequiredNameFormMissing { .. } => 15,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_reason() {
        let subject = || "leaf".to_string();
        let failures: Vec<ChainFailure> = vec![
            StructureFailure::EmptyChain.into(),
            StructureFailure::EndEntityNotUnique(0).into(),
            StructureFailure::KeyCertSignWithoutCa { subject: subject() }.into(),
            StructureFailure::CaWithoutKeyCertSign { subject: subject() }.into(),
            StructureFailure::CaWithoutCrlSign { subject: subject() }.into(),
            StructureFailure::IssuerNotFound { subject: subject() }.into(),
            StructureFailure::BadSignature { subject: subject() }.into(),
            StructureFailure::OutsideValidityPeriod { subject: subject() }.into(),
            RevocationFailure::Revoked { subject: subject() }.into(),
            StructureFailure::RootNotTrusted { subject: subject() }.into(),
            ExtensionFailure::UnrecognizedCriticalExtension {
                subject: subject(),
                oid: ObjectIdentifier::new_unwrap("1.2.3.4"),
            }
            .into(),
            PolicyFailure::NoAcceptablePolicy.into(),
            NameConstraintFailure::NotPermitted {
                subject: subject(),
                form: NameForm::Dns,
            }
            .into(),
            NameConstraintFailure::Excluded {
                subject: subject(),
                form: NameForm::IpAddress,
            }
            .into(),
            NameConstraintFailure::RequiredNameFormMissing { subject: subject() }.into(),
            ExtensionFailure::MalformedCriticalExtension {
                subject: subject(),
                oid: ObjectIdentifier::new_unwrap("2.5.29.19"),
            }
            .into(),
        ];
        let codes: Vec<u32> = failures.iter().map(ChainFailure::code).collect();
        assert_eq!(codes, (1..=16).collect::<Vec<_>>());
    }

    #[test]
    fn message_comes_from_the_phase() {
        let failure = ChainFailure::from(NameConstraintFailure::Excluded {
            subject: "www.example.com".to_string(),
            form: NameForm::Dns,
        });
        assert_eq!(
            failure.to_string(),
            "Certificate 'www.example.com' has a dNSName name within the excluded subtrees"
        );
    }
}
