use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::issue::{Issue, ReviewStatus};

// ---------------------------------------------------------------------------
// Input: licence charge graph
// ---------------------------------------------------------------------------

/// Root of one review pass. Owns its charge versions and its return logs.
#[derive(Debug, Clone, Deserialize)]
pub struct Licence {
    pub id: String,
    #[serde(default)]
    pub charge_versions: Vec<ChargeVersion>,
    #[serde(default)]
    pub return_logs: Vec<ReturnLog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeVersion {
    pub id: String,
    #[serde(default)]
    pub charge_references: Vec<ChargeReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeReference {
    pub id: String,
    /// Absent is equivalent to 1.
    #[serde(default)]
    pub aggregate_factor: Option<f64>,
    #[serde(default)]
    pub charge_elements: Vec<ChargeElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeElement {
    pub id: String,
    #[serde(default)]
    pub charge_dates_overlap: bool,
    /// `None` when no matched set could be computed upstream (e.g. no charge period).
    #[serde(default)]
    pub matched_return_ids: Option<Vec<String>>,
}

impl ChargeElement {
    pub fn matched_ids(&self) -> &[String] {
        self.matched_return_ids.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Due,
    Received,
    Completed,
    Void,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnLog {
    pub id: String,
    pub status: ReturnStatus,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub allocated_quantity: f64,
    #[serde(default)]
    pub abstraction_outside_period: bool,
    #[serde(default)]
    pub under_query: bool,
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Input: raw return/charge-element pairing rows
// ---------------------------------------------------------------------------

/// One row per return, or per return-element pairing when the return matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReturnRow {
    pub return_id: String,
    pub charge_element_id: Option<String>,
    pub charge_version_id: String,
    pub charge_period_start_date: NaiveDate,
    pub charge_period_end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargePeriod {
    pub charge_version_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Serialize)]
pub struct ReturnMatchOutput {
    /// Unique by `return_id`, first-seen order.
    pub returns: Vec<RawReturnRow>,
    pub matched_returns: Vec<RawReturnRow>,
    pub unmatched_returns: Vec<RawReturnRow>,
    pub charge_periods: Vec<ChargePeriod>,
}

// ---------------------------------------------------------------------------
// Output: classified graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnLogReview {
    pub id: String,
    pub issues: Vec<Issue>,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeElementReview {
    pub id: String,
    pub issues: Vec<Issue>,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeReferenceReview {
    pub id: String,
    pub charge_elements: Vec<ChargeElementReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeVersionReview {
    pub id: String,
    pub charge_references: Vec<ChargeReferenceReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenceReview {
    pub licence_id: String,
    pub status: ReviewStatus,
    /// Empty, a single issue label, or "Multiple issues".
    pub issue: String,
    pub charge_versions: Vec<ChargeVersionReview>,
    pub return_logs: Vec<ReturnLogReview>,
}

impl LicenceReview {
    pub fn charge_elements(&self) -> impl Iterator<Item = &ChargeElementReview> {
        self.charge_versions
            .iter()
            .flat_map(|v| v.charge_references.iter())
            .flat_map(|r| r.charge_elements.iter())
    }

    pub fn return_log(&self, id: &str) -> Option<&ReturnLogReview> {
        self.return_logs.iter().find(|r| r.id == id)
    }

    pub fn charge_element(&self, id: &str) -> Option<&ChargeElementReview> {
        self.charge_elements().find(|e| e.id == id)
    }

    /// Every issue on every return log and charge element, with repeats.
    pub fn all_issues(&self) -> impl Iterator<Item = Issue> + '_ {
        self.return_logs
            .iter()
            .flat_map(|r| r.issues.iter().copied())
            .chain(self.charge_elements().flat_map(|e| e.issues.iter().copied()))
    }
}
