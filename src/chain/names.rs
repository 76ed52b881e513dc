//! Name constraints (RFC 5280 §4.2.1.10).
//!
//! Subtrees accumulate from the anchor toward the leaf. Each certificate is checked
//! against what the certificates above it contributed, form by form: when a form
//! has permitted subtrees, one of the certificate's names of that form must fall in
//! one of them, and no name may fall in an excluded subtree of its form.

use std::sync::LazyLock;

use regex::Regex;

use super::ValidationSettings;
use super::failure::{NameConstraintFailure, NameForm};
use super::sort::subject_label;
use crate::cert::Certificate;
use crate::oid;
use crate::pki::extensions::{GeneralSubtree, NameConstraints, SubjectAltName};
use crate::pki::{AttributeTypeAndValue, GeneralName, RelativeDistinguishedNames};

/// Scheme, optional `//`, optional userinfo, then the host (bracketed for IPv6).
static URI_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?(?://)?(?:[^@/?#]*@)?(\[[^\]]*\]|[^:/?#]*)")
        .expect("URI host pattern compiles")
});

fn form_of(name: &GeneralName) -> Option<NameForm> {
    match name {
        GeneralName::Rfc822Name(_) => Some(NameForm::Rfc822),
        GeneralName::DnsName(_) => Some(NameForm::Dns),
        GeneralName::DirectoryName(_) => Some(NameForm::Directory),
        GeneralName::UniformResourceIdentifier(_) => Some(NameForm::Uri),
        GeneralName::IpAddress(_) => Some(NameForm::IpAddress),
        _ => None,
    }
}

/// The names of `form` a certificate carries.
fn names_of(cert: &Certificate, form: NameForm) -> Vec<GeneralName> {
    let mut names: Vec<GeneralName> = cert
        .extension::<SubjectAltName>()
        .map(|san| {
            san.0
                .iter()
                .filter(|name| form_of(name) == Some(form))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    match form {
        NameForm::Directory if !cert.subject().is_empty() => {
            names.push(GeneralName::DirectoryName(cert.subject().clone()));
        }
        NameForm::Rfc822 if names.is_empty() => {
            for attr_type in [oid::AT_EMAIL_ADDRESS, oid::AT_RFC822_MAILBOX] {
                names.extend(
                    cert.subject()
                        .values_of(&attr_type)
                        .into_iter()
                        .map(GeneralName::Rfc822Name),
                );
            }
        }
        _ => {}
    }
    names
}

/// Right-aligned label match. A leading empty label (`.example.com`) only matches
/// proper subdomains.
pub(crate) fn dns_name_matches(name: &str, constraint: &str) -> bool {
    let labels: Vec<&str> = name.trim_end_matches('.').split('.').collect();
    let constraint_labels: Vec<&str> = constraint.split('.').collect();
    if constraint_labels.len() > labels.len() {
        return false;
    }
    labels
        .iter()
        .rev()
        .zip(constraint_labels.iter().rev())
        .all(|(label, expected)| expected.is_empty() || label.eq_ignore_ascii_case(expected))
}

/// A constraint with `@` is a full mailbox; otherwise it names the mail host.
pub(crate) fn rfc822_name_matches(address: &str, constraint: &str) -> bool {
    if constraint.contains('@') {
        return address.eq_ignore_ascii_case(constraint);
    }
    let host = address
        .rsplit_once('@')
        .map_or(address, |(_, host)| host);
    dns_name_matches(host, constraint)
}

pub(crate) fn uri_host(uri: &str) -> Option<&str> {
    let host = URI_HOST.captures(uri)?.get(1)?.as_str();
    (!host.is_empty()).then_some(host)
}

pub(crate) fn uri_matches(uri: &str, constraint: &str) -> bool {
    uri_host(uri).is_some_and(|host| dns_name_matches(host, constraint))
}

/// `constraint` is the address followed by the mask, 4+4 or 16+16 bytes.
pub(crate) fn ip_address_matches(address: &[u8], constraint: &[u8]) -> bool {
    let len = address.len();
    if (len != 4 && len != 16) || constraint.len() != len * 2 {
        return false;
    }
    let (network, mask) = constraint.split_at(len);
    address
        .iter()
        .zip(network)
        .zip(mask)
        .all(|((a, n), m)| (a ^ n) & m == 0)
}

/// The constraint's attributes appear in `name` as a contiguous run, in order.
///
/// The run may start anywhere in `name`, so this is looser than the RFC 5280
/// prefix rule: a constraint of `CN=leaf` matches `O=Example Corp, CN=leaf`.
pub(crate) fn directory_name_matches(
    name: &RelativeDistinguishedNames,
    constraint: &RelativeDistinguishedNames,
) -> bool {
    let attributes: Vec<&AttributeTypeAndValue> = name.attributes().collect();
    let wanted: Vec<&AttributeTypeAndValue> = constraint.attributes().collect();
    if wanted.is_empty() {
        return true;
    }
    attributes.windows(wanted.len()).any(|window| {
        window
            .iter()
            .zip(&wanted)
            .all(|(attribute, expected)| attribute.is_equal(expected))
    })
}

fn matches(name: &GeneralName, constraint: &GeneralName) -> bool {
    match (name, constraint) {
        (GeneralName::Rfc822Name(name), GeneralName::Rfc822Name(constraint)) => {
            rfc822_name_matches(name, constraint)
        }
        (GeneralName::DnsName(name), GeneralName::DnsName(constraint)) => {
            dns_name_matches(name, constraint)
        }
        (GeneralName::DirectoryName(name), GeneralName::DirectoryName(constraint)) => {
            directory_name_matches(name, constraint)
        }
        (
            GeneralName::UniformResourceIdentifier(name),
            GeneralName::UniformResourceIdentifier(constraint),
        ) => uri_matches(name, constraint),
        (GeneralName::IpAddress(name), GeneralName::IpAddress(constraint)) => {
            ip_address_matches(name, constraint)
        }
        _ => false,
    }
}

/// Same number of sets and the same attribute types, set by set in any order.
fn same_shape(name: &RelativeDistinguishedNames, form: &RelativeDistinguishedNames) -> bool {
    let types = |set: &[AttributeTypeAndValue]| {
        let mut types: Vec<_> = set.iter().map(|attribute| attribute.attr_type).collect();
        types.sort();
        types
    };
    name.rdns.len() == form.rdns.len()
        && name
            .rdns
            .iter()
            .zip(&form.rdns)
            .all(|(left, right)| types(left) == types(right))
}

fn check_certificate(
    cert: &Certificate,
    permitted: &[GeneralSubtree],
    excluded: &[GeneralSubtree],
) -> Result<(), NameConstraintFailure> {
    for form in NameForm::ALL {
        let names = names_of(cert, form);
        let of_form = |subtrees: &[GeneralSubtree]| -> Vec<GeneralName> {
            subtrees
                .iter()
                .filter(|subtree| form_of(&subtree.base) == Some(form))
                .map(|subtree| subtree.base.clone())
                .collect()
        };

        let permitted = of_form(permitted);
        if !permitted.is_empty()
            && !names
                .iter()
                .any(|name| permitted.iter().any(|constraint| matches(name, constraint)))
        {
            return Err(NameConstraintFailure::NotPermitted {
                subject: subject_label(cert),
                form,
            });
        }

        let excluded = of_form(excluded);
        if names
            .iter()
            .any(|name| excluded.iter().any(|constraint| matches(name, constraint)))
        {
            return Err(NameConstraintFailure::Excluded {
                subject: subject_label(cert),
                form,
            });
        }
    }
    Ok(())
}

fn check_required_forms(
    cert: &Certificate,
    required: &[GeneralSubtree],
) -> Result<(), NameConstraintFailure> {
    let mut forms = required.iter().filter_map(|subtree| match &subtree.base {
        GeneralName::DirectoryName(form) => Some(form),
        _ => None,
    });
    if required.is_empty() || forms.any(|form| same_shape(cert.subject(), form)) {
        Ok(())
    } else {
        Err(NameConstraintFailure::RequiredNameFormMissing {
            subject: subject_label(cert),
        })
    }
}

fn contribute(
    cert: &Certificate,
    permitted: &mut Vec<GeneralSubtree>,
    excluded: &mut Vec<GeneralSubtree>,
) {
    if let Some(constraints) = cert.extension::<NameConstraints>() {
        permitted.extend(constraints.permitted_subtrees.iter().cloned());
        excluded.extend(constraints.excluded_subtrees.iter().cloned());
    }
}

/// Checks `path` (leaf first, anchor last).
pub(crate) fn check(
    path: &[Certificate],
    settings: &ValidationSettings,
) -> Result<(), NameConstraintFailure> {
    let Some((anchor, certs)) = path.split_last() else {
        return Ok(());
    };
    let mut permitted = settings.initial_permitted_subtrees.clone();
    let mut excluded = settings.initial_excluded_subtrees.clone();
    contribute(anchor, &mut permitted, &mut excluded);

    for (position, cert) in certs.iter().rev().enumerate() {
        let is_leaf = position + 1 == certs.len();
        if is_leaf || !cert.is_self_signed() {
            check_certificate(cert, &permitted, &excluded)?;
            check_required_forms(cert, &settings.initial_required_name_forms)?;
        }
        contribute(cert, &mut permitted, &mut excluded);
    }
    Ok(())
}
