use std::collections::{HashMap, HashSet};

use crate::aggregate::aggregate_licence;
use crate::classify::{classify_charge_element, classify_return_log};
use crate::config::ReviewPolicy;
use crate::crossref::ReturnIndex;
use crate::error::ReviewError;
use crate::model::{
    ChargeReferenceReview, ChargeVersionReview, Licence, LicenceReview, ReturnLog,
};

/// Run one review pass over a licence graph. Returns the classified graph and licence verdict.
///
/// The input is never mutated; reviewing the same graph twice yields the same result.
pub fn review_licence(licence: &Licence, policy: &ReviewPolicy) -> Result<LicenceReview, ReviewError> {
    check_charge_ids(licence)?;
    let returns_by_id = index_return_logs(licence)?;
    let index = ReturnIndex::build(licence);

    log::debug!(
        "licence {}: reviewing {} return log(s) across {} charge version(s)",
        licence.id,
        licence.return_logs.len(),
        licence.charge_versions.len()
    );

    let mut charge_versions = Vec::with_capacity(licence.charge_versions.len());
    for version in &licence.charge_versions {
        let mut charge_references = Vec::with_capacity(version.charge_references.len());
        for reference in &version.charge_references {
            let charge_elements = reference
                .charge_elements
                .iter()
                .map(|element| {
                    classify_charge_element(
                        &licence.id,
                        element,
                        reference.aggregate_factor,
                        &returns_by_id,
                        policy,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;

            charge_references.push(ChargeReferenceReview {
                id: reference.id.clone(),
                charge_elements,
            });
        }
        charge_versions.push(ChargeVersionReview {
            id: version.id.clone(),
            charge_references,
        });
    }

    let return_logs: Vec<_> = licence
        .return_logs
        .iter()
        .map(|log| classify_return_log(log, index.is_split(&log.id), policy))
        .collect();

    let elements = charge_versions
        .iter()
        .flat_map(|v| v.charge_references.iter())
        .flat_map(|r| r.charge_elements.iter());
    let verdict = aggregate_licence(&return_logs, elements);

    log::info!(
        "licence {}: status {}, issue '{}'",
        licence.id,
        verdict.status,
        verdict.issue
    );

    Ok(LicenceReview {
        licence_id: licence.id.clone(),
        status: verdict.status,
        issue: verdict.issue,
        charge_versions,
        return_logs,
    })
}

/// Charge versions, references and elements are told apart by id, so ids
/// must be unique per kind across the whole licence.
fn check_charge_ids(licence: &Licence) -> Result<(), ReviewError> {
    let mut versions = HashSet::new();
    let mut references = HashSet::new();
    let mut elements = HashSet::new();

    let duplicate = |kind: &'static str, id: &str| ReviewError::DuplicateChargeId {
        licence_id: licence.id.clone(),
        kind,
        id: id.to_string(),
    };

    for version in &licence.charge_versions {
        if !versions.insert(version.id.as_str()) {
            return Err(duplicate("charge version", &version.id));
        }
        for reference in &version.charge_references {
            if !references.insert(reference.id.as_str()) {
                return Err(duplicate("charge reference", &reference.id));
            }
            for element in &reference.charge_elements {
                if !elements.insert(element.id.as_str()) {
                    return Err(duplicate("charge element", &element.id));
                }
            }
        }
    }
    Ok(())
}

/// Return logs keyed by id. Duplicate ids are a malformed graph.
fn index_return_logs(licence: &Licence) -> Result<HashMap<&str, &ReturnLog>, ReviewError> {
    let mut by_id = HashMap::with_capacity(licence.return_logs.len());
    for log in &licence.return_logs {
        if by_id.insert(log.id.as_str(), log).is_some() {
            return Err(ReviewError::DuplicateReturnLog {
                licence_id: licence.id.clone(),
                return_id: log.id.clone(),
            });
        }
    }
    Ok(by_id)
}
