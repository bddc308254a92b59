//! Build the owned licence graph from flat, owner-keyed records.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::ReviewError;
use crate::model::{ChargeElement, ChargeReference, ChargeVersion, Licence, ReturnLog};

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeVersionRecord {
    pub id: String,
    pub licence_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeReferenceRecord {
    pub id: String,
    pub charge_version_id: String,
    #[serde(default)]
    pub aggregate_factor: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeElementRecord {
    pub id: String,
    pub charge_reference_id: String,
    #[serde(default)]
    pub charge_dates_overlap: bool,
    #[serde(default)]
    pub matched_return_ids: Option<Vec<String>>,
}

/// Flat records for one licence, as a data-fetch query returns them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlatLicence {
    #[serde(default)]
    pub charge_versions: Vec<ChargeVersionRecord>,
    #[serde(default)]
    pub charge_references: Vec<ChargeReferenceRecord>,
    #[serde(default)]
    pub charge_elements: Vec<ChargeElementRecord>,
    #[serde(default)]
    pub return_logs: Vec<ReturnLog>,
}

/// Nest flat records under their owners, preserving record order at every level.
///
/// Any record whose owner is missing, or whose id repeats within its kind,
/// fails the whole licence.
pub fn assemble_licence(licence_id: &str, flat: FlatLicence) -> Result<Licence, ReviewError> {
    let mut versions: Vec<ChargeVersion> = Vec::with_capacity(flat.charge_versions.len());
    let mut version_pos: HashMap<String, usize> = HashMap::new();
    for record in flat.charge_versions {
        if record.licence_id != licence_id {
            return Err(ReviewError::MissingOwner {
                kind: "charge version",
                id: record.id,
                owner_id: record.licence_id,
            });
        }
        if version_pos.insert(record.id.clone(), versions.len()).is_some() {
            return Err(duplicate(licence_id, "charge version", record.id));
        }
        versions.push(ChargeVersion {
            id: record.id,
            charge_references: Vec::new(),
        });
    }

    // (version index, reference index) per reference id
    let mut reference_pos: HashMap<String, (usize, usize)> = HashMap::new();
    for record in flat.charge_references {
        let Some(&vi) = version_pos.get(&record.charge_version_id) else {
            return Err(ReviewError::MissingOwner {
                kind: "charge reference",
                id: record.id,
                owner_id: record.charge_version_id,
            });
        };
        let refs = &mut versions[vi].charge_references;
        if reference_pos.insert(record.id.clone(), (vi, refs.len())).is_some() {
            return Err(duplicate(licence_id, "charge reference", record.id));
        }
        refs.push(ChargeReference {
            id: record.id,
            aggregate_factor: record.aggregate_factor,
            charge_elements: Vec::new(),
        });
    }

    let mut element_ids: HashSet<String> = HashSet::new();
    for record in flat.charge_elements {
        if !element_ids.insert(record.id.clone()) {
            return Err(duplicate(licence_id, "charge element", record.id));
        }
        let Some(&(vi, ri)) = reference_pos.get(&record.charge_reference_id) else {
            return Err(ReviewError::MissingOwner {
                kind: "charge element",
                id: record.id,
                owner_id: record.charge_reference_id,
            });
        };
        versions[vi].charge_references[ri].charge_elements.push(ChargeElement {
            id: record.id,
            charge_dates_overlap: record.charge_dates_overlap,
            matched_return_ids: record.matched_return_ids,
        });
    }

    log::debug!(
        "licence {licence_id}: assembled {} charge version(s), {} reference(s), {} return log(s)",
        versions.len(),
        reference_pos.len(),
        flat.return_logs.len()
    );

    Ok(Licence {
        id: licence_id.to_string(),
        charge_versions: versions,
        return_logs: flat.return_logs,
    })
}

fn duplicate(licence_id: &str, kind: &'static str, id: String) -> ReviewError {
    ReviewError::DuplicateChargeId {
        licence_id: licence_id.to_string(),
        kind,
        id,
    }
}
