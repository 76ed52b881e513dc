//! Path building: orders an unordered certificate set from the end entity up to a
//! self-signed root.
//!
//! The search is a worklist over the tail of the path. Candidates are scanned in
//! pool order and the first one that both names and verifies the tail wins, so the
//! same input always yields the same path.

use log::debug;
use time::OffsetDateTime;

use super::failure::{ChainFailure, RevocationFailure, StructureFailure};
use crate::cert::Certificate;
use crate::crl::Crl;
use crate::pki::extensions::KeyUsages;
use crate::signature::SignerKey;

/// Display form of a certificate subject for failure messages.
pub(crate) fn subject_label(cert: &Certificate) -> String {
    cert.subject().common_name().unwrap_or_else(|| {
        cert.subject()
            .attributes()
            .filter_map(|atv| atv.value_string())
            .collect::<Vec<_>>()
            .join(", ")
    })
}

/// Same issuer, subject and serial number.
pub(crate) fn same_certificate(left: &Certificate, right: &Certificate) -> bool {
    left.issuer() == right.issuer()
        && left.subject() == right.subject()
        && left.serial_number() == right.serial_number()
}

/// Whether `cert` may act as an issuer, with the key usage consistency rules.
fn classify(cert: &Certificate) -> Result<bool, StructureFailure> {
    let is_ca = cert.is_ca();
    let subject = || subject_label(cert);
    match cert.key_usage(KeyUsages::KeyCertSign) {
        Some(true) if !is_ca => Err(StructureFailure::KeyCertSignWithoutCa { subject: subject() }),
        Some(false) if is_ca => Err(StructureFailure::CaWithoutKeyCertSign { subject: subject() }),
        Some(_) if is_ca && cert.key_usage(KeyUsages::CRLSign) == Some(false) => {
            Err(StructureFailure::CaWithoutCrlSign { subject: subject() })
        }
        _ => Ok(is_ca),
    }
}

/// `issuer` signed `cert`. Verification errors count as a mismatch.
fn signed_by(cert: &Certificate, issuer: &Certificate) -> bool {
    match cert.verify(Some(SignerKey::IssuerCertificate(issuer))) {
        Ok(valid) => valid,
        Err(err) => {
            debug!(
                "could not verify '{}' with '{}': {err}",
                subject_label(cert),
                subject_label(issuer)
            );
            false
        }
    }
}

/// The first configured CRL of `issuer` whose signature verifies.
pub(crate) fn find_crl<'a>(issuer: &Certificate, crls: &'a [Crl]) -> Option<&'a Crl> {
    crls.iter().find(|crl| {
        crl.issuer() == issuer.subject()
            && crl
                .verify(SignerKey::IssuerCertificate(issuer))
                .unwrap_or(false)
    })
}

/// Validity period and revocation of `cert`, issued by `issuer`.
fn basic(
    cert: &Certificate,
    issuer: &Certificate,
    crls: &[Crl],
    check_date: OffsetDateTime,
) -> Result<(), ChainFailure> {
    if !cert.is_valid_at(check_date) {
        return Err(StructureFailure::OutsideValidityPeriod {
            subject: subject_label(cert),
        }
        .into());
    }
    if crls.is_empty() {
        return Ok(());
    }
    match find_crl(issuer, crls) {
        Some(crl) if crl.is_certificate_revoked(cert) => Err(RevocationFailure::Revoked {
            subject: subject_label(cert),
        }
        .into()),
        Some(_) => Ok(()),
        None => {
            debug!(
                "no verifiable CRL from '{}', skipping revocation check of '{}'",
                subject_label(issuer),
                subject_label(cert)
            );
            Ok(())
        }
    }
}

/// Builds the path leaf first, root last.
///
/// An empty `trusted` set accepts any self-signed root. Otherwise the root must be
/// one of `trusted`, which are also tried as issuers once `certs` runs out.
pub(crate) fn build_path(
    trusted: &[Certificate],
    certs: &[Certificate],
    crls: &[Crl],
    check_date: OffsetDateTime,
) -> Result<Vec<Certificate>, ChainFailure> {
    if certs.is_empty() {
        return Err(StructureFailure::EmptyChain.into());
    }

    let mut leaves = Vec::new();
    let mut pool = Vec::new();
    for cert in certs {
        if classify(cert)? {
            pool.push(cert);
        } else {
            leaves.push(cert);
        }
    }
    let &[leaf] = leaves.as_slice() else {
        return Err(StructureFailure::EndEntityNotUnique(leaves.len()).into());
    };

    let mut path = vec![leaf];
    let mut anchors_spliced = false;
    loop {
        let tail = path[path.len() - 1];
        if tail.is_self_signed() {
            let anchored = trusted.iter().any(|anchor| same_certificate(anchor, tail));
            if !trusted.is_empty() && !anchored {
                return Err(StructureFailure::RootNotTrusted {
                    subject: subject_label(tail),
                }
                .into());
            }
            if !tail.verify(None).unwrap_or(false) {
                return Err(StructureFailure::BadSignature {
                    subject: subject_label(tail),
                }
                .into());
            }
            if !tail.is_valid_at(check_date) {
                return Err(StructureFailure::OutsideValidityPeriod {
                    subject: subject_label(tail),
                }
                .into());
            }
            debug!("path of {} certificates ends at '{}'", path.len(), subject_label(tail));
            return Ok(path.into_iter().cloned().collect());
        }

        let found = pool.iter().position(|candidate| {
            candidate.subject() == tail.issuer() && signed_by(tail, candidate)
        });
        match found {
            Some(index) => {
                let issuer = pool.remove(index);
                basic(tail, issuer, crls, check_date)?;
                debug!("'{}' issued '{}'", subject_label(issuer), subject_label(tail));
                path.push(issuer);
            }
            None if !anchors_spliced && !trusted.is_empty() => {
                anchors_spliced = true;
                for anchor in trusted {
                    let known = path
                        .iter()
                        .chain(pool.iter())
                        .any(|cert| same_certificate(cert, anchor));
                    if !known {
                        pool.push(anchor);
                    }
                }
                debug!(
                    "searching trusted anchors for the issuer of '{}'",
                    subject_label(tail)
                );
            }
            None => {
                return Err(StructureFailure::IssuerNotFound {
                    subject: subject_label(tail),
                }
                .into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::fixtures::{ca, leaf, request, root};
    use crate::cert::params::Validity;
    use crate::crl::RevokedCertificate;
    use crate::issuer::Issuer;
    use crate::key::KeyPair;
    use crate::oid::HashAlgorithm;
    use crate::pki::extensions::KeyUsage;
    use crate::pki::{Extension, Time};

    fn names(path: &[Certificate]) -> Vec<String> {
        path.iter().map(subject_label).collect()
    }

    #[test]
    fn orders_shuffled_input_leaf_first() {
        let root = root("root", vec![]);
        let ca = ca(&root, "ca", vec![]);
        let end = leaf(&ca, "leaf", vec![]);
        let certs = vec![root.cert.clone(), end, ca.cert.clone()];
        let now = OffsetDateTime::now_utc();

        let path = build_path(&[], &certs, &[], now).unwrap();
        assert_eq!(names(&path), ["leaf", "ca", "root"]);
        let again = build_path(&[], &certs, &[], now).unwrap();
        assert_eq!(again, path);
    }

    #[test]
    fn anchors_complete_the_path() {
        let root = root("root", vec![]);
        let ca = ca(&root, "ca", vec![]);
        let end = leaf(&ca, "leaf", vec![]);
        let path = build_path(
            std::slice::from_ref(&root.cert),
            &[end, ca.cert],
            &[],
            OffsetDateTime::now_utc(),
        )
        .unwrap();
        assert_eq!(names(&path), ["leaf", "ca", "root"]);
    }

    #[test]
    fn missing_issuer_is_reported() {
        let root = root("root", vec![]);
        let ca = ca(&root, "ca", vec![]);
        let end = leaf(&ca, "leaf", vec![]);
        let err = build_path(&[], &[end, root.cert], &[], OffsetDateTime::now_utc()).unwrap_err();
        assert_eq!(
            err,
            StructureFailure::IssuerNotFound {
                subject: "leaf".to_string()
            }
            .into()
        );
    }

    #[test]
    fn two_end_entities_are_rejected() {
        let root = root("root", vec![]);
        let certs = vec![
            leaf(&root, "a", vec![]),
            leaf(&root, "b", vec![]),
            root.cert.clone(),
        ];
        let err = build_path(&[], &certs, &[], OffsetDateTime::now_utc()).unwrap_err();
        assert_eq!(err, StructureFailure::EndEntityNotUnique(2).into());
    }

    #[test]
    fn ca_key_usage_must_allow_certificate_signing() {
        let root = root("root", vec![]);
        let key = KeyPair::generate_ecdsa_p256();
        let key_usage =
            Extension::new(KeyUsage(KeyUsages::DigitalSignature.into()), true).unwrap();
        let ca = root
            .issue(
                &request("ca", &key, true, vec![key_usage]),
                Validity::for_days(30),
            )
            .unwrap();
        let err = build_path(&[], &[ca, root.cert], &[], OffsetDateTime::now_utc()).unwrap_err();
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn expired_certificate_is_rejected() {
        let root = root("root", vec![]);
        let end = leaf(&root, "leaf", vec![]);
        let later = OffsetDateTime::now_utc() + time::Duration::days(60);
        let err = build_path(&[], &[end, root.cert], &[], later).unwrap_err();
        assert_eq!(err.code(), 8);
    }

    #[test]
    fn first_verifying_crl_decides_revocation() {
        let impostor = root("root", vec![]);
        let root = root("root", vec![]);
        let end = leaf(&root, "leaf", vec![]);
        let now = OffsetDateTime::now_utc();
        let this_update = Time::from_date(now).unwrap();
        let revoked = vec![RevokedCertificate::new(
            end.serial_number().to_vec(),
            this_update,
        )];

        let mut foreign =
            Crl::new(root.cert.subject().clone(), this_update, None, revoked.clone()).unwrap();
        foreign.sign(&impostor.key, HashAlgorithm::Sha256).unwrap();
        let certs = [end, root.cert.clone()];
        assert!(build_path(&[], &certs, std::slice::from_ref(&foreign), now).is_ok());

        let mut genuine = Crl::new(root.cert.subject().clone(), this_update, None, revoked).unwrap();
        genuine.sign(&root.key, HashAlgorithm::Sha256).unwrap();
        let err = build_path(&[], &certs, &[foreign, genuine], now).unwrap_err();
        assert_eq!(err.code(), 9);
    }
}
