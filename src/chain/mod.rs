//! Certification path validation.
//!
//! [`CertificateChain::verify`] runs the phases in order and stops at the first
//! failure:
//!
//! 1. path building from the end entity up to a self-signed root, with validity
//!    period and CRL checks on every link,
//! 2. screening of critical extensions,
//! 3. certificate policy processing,
//! 4. name constraints.
//!
//! The outcome is always a [`ChainValidationResult`]; a rejected path is a
//! [`ChainFailure`] in it, never an `Err`.
//!
//! # Example
//!
//! ```no_run
//! use certpath::cert::Certificate;
//! use certpath::chain::{CertificateChain, ValidationSettings};
//!
//! # fn run(root: Certificate, intermediate: Certificate, leaf: Certificate) {
//! let mut chain = CertificateChain::new(vec![root], vec![leaf, intermediate], vec![]);
//! let result = chain.verify(&ValidationSettings::default());
//! if !result.is_valid() {
//!     eprintln!("rejected ({}): {}", result.code(), result.message());
//! }
//! # }
//! ```

mod failure;
mod names;
mod policy;
mod sort;

#[cfg(test)]
mod fixtures;

use bon::Builder;
use const_oid::ObjectIdentifier;
use log::info;
use time::OffsetDateTime;

pub use failure::{
    ChainFailure, ExtensionFailure, NameConstraintFailure, NameForm, PolicyFailure,
    RevocationFailure, StructureFailure,
};
pub use policy::PolicyOutcome;

use crate::cert::Certificate;
use crate::crl::Crl;
use crate::oid;
use crate::pki::extensions::GeneralSubtree;

/// Inputs of path validation besides the certificates.
///
/// # Fields
/// * `check_date` - The time the path must be valid at. Defaults to now.
/// * `initial_policy_set` - Policies acceptable to the caller. Defaults to `anyPolicy`.
/// * `initial_explicit_policy` - Require an explicit policy from the start.
/// * `initial_policy_mapping_inhibit` - Ignore policy mappings from the start.
/// * `initial_inhibit_policy` - Do not let `anyPolicy` match from the start.
/// * `initial_permitted_subtrees` - Permitted subtrees applied to every certificate.
/// * `initial_excluded_subtrees` - Excluded subtrees applied to every certificate.
/// * `initial_required_name_forms` - directoryName forms the subjects must be shaped like.
#[derive(Clone, Debug, Builder)]
pub struct ValidationSettings {
    #[builder(default = OffsetDateTime::now_utc())]
    pub check_date: OffsetDateTime,
    #[builder(default = vec![oid::ANY_POLICY])]
    pub initial_policy_set: Vec<ObjectIdentifier>,
    #[builder(default)]
    pub initial_explicit_policy: bool,
    #[builder(default)]
    pub initial_policy_mapping_inhibit: bool,
    #[builder(default)]
    pub initial_inhibit_policy: bool,
    #[builder(default)]
    pub initial_permitted_subtrees: Vec<GeneralSubtree>,
    #[builder(default)]
    pub initial_excluded_subtrees: Vec<GeneralSubtree>,
    #[builder(default)]
    pub initial_required_name_forms: Vec<GeneralSubtree>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Outcome of [`CertificateChain::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainValidationResult {
    /// The path that was built, leaf first. Empty when path building failed.
    pub certificate_path: Vec<Certificate>,
    /// Policy state, once policy processing has run.
    pub policy: Option<PolicyOutcome>,
    pub failure: Option<ChainFailure>,
}

impl ChainValidationResult {
    fn rejected(
        certificate_path: Vec<Certificate>,
        policy: Option<PolicyOutcome>,
        failure: impl Into<ChainFailure>,
    ) -> Self {
        Self {
            certificate_path,
            policy,
            failure: Some(failure.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// 0 for a valid path, otherwise [`ChainFailure::code`].
    pub fn code(&self) -> u32 {
        self.failure.as_ref().map_or(0, ChainFailure::code)
    }

    pub fn message(&self) -> String {
        match &self.failure {
            Some(failure) => failure.to_string(),
            None => "Certificate chain is valid".to_string(),
        }
    }
}

/// Critical extensions of `certs` must be well known and must have decoded.
fn screen_critical_extensions(certs: &[Certificate]) -> Result<(), ExtensionFailure> {
    for cert in certs {
        for extension in cert.extensions().iter().filter(|ext| ext.critical) {
            if !extension.is_well_known() {
                return Err(ExtensionFailure::UnrecognizedCriticalExtension {
                    subject: sort::subject_label(cert),
                    oid: extension.extn_id,
                });
            }
            if extension.is_malformed() {
                return Err(ExtensionFailure::MalformedCriticalExtension {
                    subject: sort::subject_label(cert),
                    oid: extension.extn_id,
                });
            }
        }
    }
    Ok(())
}

/// Certificates to validate, the caller's trust anchors and the CRLs to consult.
#[derive(Debug, Clone, Default)]
pub struct CertificateChain {
    /// Trust anchors. Empty means any self-signed root is accepted.
    pub trusted_certs: Vec<Certificate>,
    /// The end-entity certificate and intermediates, in any order.
    pub certs: Vec<Certificate>,
    pub crls: Vec<Crl>,
}

impl CertificateChain {
    pub fn new(trusted_certs: Vec<Certificate>, certs: Vec<Certificate>, crls: Vec<Crl>) -> Self {
        Self {
            trusted_certs,
            certs,
            crls,
        }
    }

    /// Orders the certificates from the end entity up to the root.
    ///
    /// On success `certs` is replaced by the path, leaf first, root last. On failure
    /// it is left as it was.
    pub fn sort(&mut self, check_date: OffsetDateTime) -> Result<&[Certificate], ChainFailure> {
        let path = sort::build_path(&self.trusted_certs, &self.certs, &self.crls, check_date)?;
        self.certs = path;
        Ok(&self.certs)
    }

    /// Validates the chain.
    pub fn verify(&mut self, settings: &ValidationSettings) -> ChainValidationResult {
        let result = self.validate(settings);
        match &result.failure {
            None => info!(
                "certificate chain of {} certificates is valid",
                result.certificate_path.len()
            ),
            Some(failure) => info!(
                "certificate chain rejected ({}): {failure}",
                failure.code()
            ),
        }
        result
    }

    fn validate(&mut self, settings: &ValidationSettings) -> ChainValidationResult {
        let path = match self.sort(settings.check_date) {
            Ok(path) => path.to_vec(),
            Err(failure) => return ChainValidationResult::rejected(Vec::new(), None, failure),
        };
        let below_anchor = path.split_last().map_or(&[][..], |(_, certs)| certs);

        if let Err(failure) = screen_critical_extensions(below_anchor) {
            return ChainValidationResult::rejected(path, None, failure);
        }

        let outcome = policy::process(below_anchor, settings);
        if !outcome.is_acceptable() {
            return ChainValidationResult::rejected(
                path,
                Some(outcome),
                PolicyFailure::NoAcceptablePolicy,
            );
        }

        if let Err(failure) = names::check(&path, settings) {
            return ChainValidationResult::rejected(path, Some(outcome), failure);
        }

        ChainValidationResult {
            certificate_path: path,
            policy: Some(outcome),
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::{ca, leaf, root};
    use crate::pki::Extension;

    #[test]
    fn valid_chain_reports_code_zero() {
        let root = root("root", vec![]);
        let ca = ca(&root, "ca", vec![]);
        let end = leaf(&ca, "leaf", vec![]);
        let mut chain =
            CertificateChain::new(vec![root.cert.clone()], vec![ca.cert, end], vec![]);

        let result = chain.verify(&ValidationSettings::default());
        assert!(result.is_valid(), "{}", result.message());
        assert_eq!(result.code(), 0);
        assert_eq!(result.certificate_path.len(), 3);
        assert_eq!(chain.certs, result.certificate_path);
        let policy = result.policy.unwrap();
        assert_eq!(policy.user_constrained_policies, vec![oid::ANY_POLICY]);
    }

    #[test]
    fn failed_sort_leaves_certificates_alone() {
        let root = root("root", vec![]);
        let ca = ca(&root, "ca", vec![]);
        let end = leaf(&ca, "leaf", vec![]);
        let certs = vec![end];
        let mut chain = CertificateChain::new(vec![], certs.clone(), vec![]);

        let result = chain.verify(&ValidationSettings::default());
        assert_eq!(result.code(), 6);
        assert!(result.certificate_path.is_empty());
        assert_eq!(chain.certs, certs);
    }

    #[test]
    fn critical_extension_screening_precedes_policy() {
        let root = root("root", vec![]);
        let unknown = Extension::from_parts(
            ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.7"),
            true,
            vec![0x05, 0x00],
        );
        let end = leaf(&root, "leaf", vec![unknown]);
        let settings = ValidationSettings::builder()
            .initial_policy_set(vec![ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.1")])
            .initial_explicit_policy(true)
            .build();
        let mut chain = CertificateChain::new(vec![], vec![end, root.cert], vec![]);

        let result = chain.verify(&settings);
        assert_eq!(result.code(), 11);
        assert!(result.policy.is_none());
    }

    #[test]
    fn malformed_critical_extension_has_its_own_code() {
        let root = root("root", vec![]);
        let broken = Extension::from_parts(
            oid::ID_CE_NAME_CONSTRAINTS,
            true,
            vec![0x04, 0x00],
        );
        let end = leaf(&root, "leaf", vec![broken]);
        let mut chain = CertificateChain::new(vec![], vec![end, root.cert], vec![]);
        assert_eq!(chain.verify(&ValidationSettings::default()).code(), 16);
    }
}
