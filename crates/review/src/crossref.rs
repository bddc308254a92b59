//! Cross-reference detection: is a return matched under more than one charge reference?

use std::collections::{BTreeSet, HashMap};

use crate::model::Licence;

/// Non-owning index from return id to every (charge reference, charge element)
/// it is matched under. Built once per review pass.
#[derive(Debug, Default)]
pub struct ReturnIndex<'a> {
    matches: HashMap<&'a str, BTreeSet<(&'a str, &'a str)>>,
}

impl<'a> ReturnIndex<'a> {
    pub fn build(licence: &'a Licence) -> Self {
        let mut matches: HashMap<&'a str, BTreeSet<(&'a str, &'a str)>> = HashMap::new();

        for version in &licence.charge_versions {
            for reference in &version.charge_references {
                for element in &reference.charge_elements {
                    // No matched set at all counts as matching nothing
                    let Some(ids) = element.matched_return_ids.as_ref() else {
                        continue;
                    };
                    for return_id in ids {
                        matches
                            .entry(return_id.as_str())
                            .or_default()
                            .insert((reference.id.as_str(), element.id.as_str()));
                    }
                }
            }
        }

        Self { matches }
    }

    /// (reference id, element id) pairs the return is matched under, sorted.
    pub fn matches_for(&self, return_id: &str) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.matches.get(return_id).into_iter().flatten().copied()
    }

    /// Number of distinct charge references the return is matched under.
    pub fn reference_count(&self, return_id: &str) -> usize {
        let mut refs: Vec<&str> = self.matches_for(return_id).map(|(r, _)| r).collect();
        refs.dedup();
        refs.len()
    }

    pub fn is_split(&self, return_id: &str) -> bool {
        self.reference_count(return_id) >= 2
    }
}

/// Direct-traversal form of [`ReturnIndex::is_split`] for a single return.
pub fn is_return_split(licence: &Licence, return_id: &str) -> bool {
    licence
        .charge_versions
        .iter()
        .flat_map(|v| v.charge_references.iter())
        .filter(|reference| {
            reference
                .charge_elements
                .iter()
                .any(|e| e.matched_ids().iter().any(|id| id == return_id))
        })
        .take(2)
        .count()
        >= 2
}
