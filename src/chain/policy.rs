//! Certificate policy processing.
//!
//! Policies are tracked in a membership matrix: one row per policy OID, one column
//! per certificate of the path without its anchor, root side first. `anyPolicy` is
//! registered for every certificate up front. The three policy indicators are
//! countdowns that latch once they run out.

use const_oid::ObjectIdentifier;

use super::ValidationSettings;
use crate::cert::Certificate;
use crate::oid::ANY_POLICY;
use crate::pki::extensions::{
    CertificatePolicies, InhibitAnyPolicy, PolicyConstraints, PolicyMapping, PolicyMappings,
};

/// State accumulated by policy processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    /// Policies that hold at every certificate of the path.
    pub authority_constrained_policies: Vec<ObjectIdentifier>,
    /// `authority_constrained_policies` narrowed to the initial policy set.
    pub user_constrained_policies: Vec<ObjectIdentifier>,
    pub explicit_policy_indicator: bool,
    pub policy_mapping_inhibit_indicator: bool,
    pub inhibit_any_policy_indicator: bool,
    /// Mappings applied at each certificate, in path order (leaf first).
    pub policy_mappings: Vec<Vec<PolicyMapping>>,
}

impl PolicyOutcome {
    pub fn is_acceptable(&self) -> bool {
        !self.user_constrained_policies.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    latched: bool,
    remaining: Option<u32>,
}

impl Countdown {
    fn new(latched: bool) -> Self {
        Self {
            latched,
            remaining: None,
        }
    }

    /// Counts one certificate.
    fn step(&mut self) {
        match self.remaining {
            Some(0) => {
                self.latched = true;
                self.remaining = None;
            }
            Some(n) => self.remaining = Some(n - 1),
            None => {}
        }
    }

    /// `skip` more certificates may follow before the indicator latches.
    fn arm(&mut self, skip: u32) {
        if !self.latched {
            self.remaining = Some(self.remaining.map_or(skip, |current| current.min(skip)));
        }
    }
}

struct PolicyMatrix {
    policies: Vec<ObjectIdentifier>,
    rows: Vec<Vec<bool>>,
    width: usize,
}

impl PolicyMatrix {
    fn new(width: usize) -> Self {
        Self {
            policies: vec![ANY_POLICY],
            rows: vec![vec![true; width]],
            width,
        }
    }

    fn row(&mut self, policy: ObjectIdentifier) -> &mut Vec<bool> {
        let index = match self.policies.iter().position(|p| *p == policy) {
            Some(index) => index,
            None => {
                self.policies.push(policy);
                self.rows.push(vec![false; self.width]);
                self.rows.len() - 1
            }
        };
        &mut self.rows[index]
    }

    fn set(&mut self, policy: ObjectIdentifier, column: usize, value: bool) {
        self.row(policy)[column] = value;
    }

    fn is_set(&self, policy: ObjectIdentifier, column: usize) -> bool {
        self.policies
            .iter()
            .position(|p| *p == policy)
            .is_some_and(|index| self.rows[index][column])
    }

    /// Whether `policy` is acceptable at `column`.
    fn holds(&self, index: usize, column: usize, explicit: bool) -> bool {
        let any_set = self.rows[0][column];
        if index == 0 {
            let others = self.rows[1..].iter().any(|row| row[column]);
            any_set && !(explicit && others)
        } else {
            self.rows[index][column] || (any_set && !explicit)
        }
    }
}

/// Runs policy processing over `certs`, the path without its anchor, leaf first.
pub(crate) fn process(certs: &[Certificate], settings: &ValidationSettings) -> PolicyOutcome {
    let count = certs.len();
    let mut matrix = PolicyMatrix::new(count);
    let mut explicit = Countdown::new(settings.initial_explicit_policy);
    let mut mapping = Countdown::new(settings.initial_policy_mapping_inhibit);
    let mut inhibit_any = Countdown::new(settings.initial_inhibit_policy);
    let mut explicit_at = vec![false; count];
    let mut mappings_at = vec![Vec::new(); count];

    for (column, cert) in certs.iter().rev().enumerate() {
        let is_leaf = column + 1 == count;
        if is_leaf || !cert.is_self_signed() {
            explicit.step();
            mapping.step();
            inhibit_any.step();
        }

        if let Some(policies) = cert.extension::<CertificatePolicies>() {
            matrix.set(ANY_POLICY, column, false);
            for policy in policies.policy_ids() {
                matrix.set(policy, column, true);
            }
        }
        if inhibit_any.latched {
            matrix.set(ANY_POLICY, column, false);
        }

        if !mapping.latched {
            if let Some(mappings) = cert.extension::<PolicyMappings>() {
                for m in &mappings.0 {
                    if m.issuer_domain_policy == ANY_POLICY || m.subject_domain_policy == ANY_POLICY
                    {
                        continue;
                    }
                    if matrix.is_set(m.issuer_domain_policy, column) {
                        matrix.set(m.subject_domain_policy, column, true);
                    } else if matrix.is_set(m.subject_domain_policy, column) {
                        matrix.set(m.issuer_domain_policy, column, true);
                    }
                }
                mappings_at[column] = mappings.0.clone();
            }
        }

        explicit_at[column] = explicit.latched;
        if let Some(constraints) = cert.extension::<PolicyConstraints>() {
            if let Some(skip) = constraints.require_explicit_policy {
                explicit.arm(skip);
                if is_leaf && skip == 0 {
                    explicit.latched = true;
                    explicit_at[column] = true;
                }
            }
            if let Some(skip) = constraints.inhibit_policy_mapping {
                mapping.arm(skip);
            }
        }
        if let Some(InhibitAnyPolicy(skip)) = cert.extension::<InhibitAnyPolicy>() {
            inhibit_any.arm(*skip);
        }
    }

    let authority_constrained_policies: Vec<ObjectIdentifier> = matrix
        .policies
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            (0..count).all(|column| matrix.holds(*index, column, explicit_at[column]))
        })
        .map(|(_, policy)| *policy)
        .collect();

    let initial = &settings.initial_policy_set;
    let user_constrained_policies = if initial.contains(&ANY_POLICY) {
        authority_constrained_policies.clone()
    } else if authority_constrained_policies.contains(&ANY_POLICY) {
        initial.clone()
    } else {
        authority_constrained_policies
            .iter()
            .filter(|policy| initial.contains(policy))
            .copied()
            .collect()
    };

    mappings_at.reverse();
    PolicyOutcome {
        authority_constrained_policies,
        user_constrained_policies,
        explicit_policy_indicator: explicit.latched,
        policy_mapping_inhibit_indicator: mapping.latched,
        inhibit_any_policy_indicator: inhibit_any.latched,
        policy_mappings: mappings_at,
    }
}
