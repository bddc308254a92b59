//! Bill-run level review: every licence reviewed independently, then counted.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::ReviewPolicy;
use crate::engine::review_licence;
use crate::error::ReviewError;
use crate::issue::{Issue, ReviewStatus};
use crate::model::{Licence, LicenceReview};

/// Shown in place of a status when a licence could not be reviewed.
pub const UNABLE_TO_DETERMINE: &str = "unable to determine review status for this licence";

#[derive(Debug, Clone, Serialize)]
pub struct LicenceReviewFailure {
    pub licence_id: String,
    pub reason: ReviewError,
}

impl LicenceReviewFailure {
    pub fn message(&self) -> &'static str {
        UNABLE_TO_DETERMINE
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BillRunSummary {
    pub total_licences: usize,
    pub ready: usize,
    pub review: usize,
    pub failed: usize,
    /// Issue label -> number of licences carrying it anywhere in their graph.
    pub issue_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillRunReview {
    pub reviews: Vec<LicenceReview>,
    pub failures: Vec<LicenceReviewFailure>,
    pub summary: BillRunSummary,
}

/// Review every licence. A failing licence is recorded, never defaulted to Ready.
pub fn review_bill_run(licences: &[Licence], policy: &ReviewPolicy) -> BillRunReview {
    let mut reviews = Vec::with_capacity(licences.len());
    let mut failures = Vec::new();

    for licence in licences {
        match review_licence(licence, policy) {
            Ok(review) => reviews.push(review),
            Err(reason) => {
                log::warn!("licence {}: {UNABLE_TO_DETERMINE}: {reason}", licence.id);
                failures.push(LicenceReviewFailure {
                    licence_id: licence.id.clone(),
                    reason,
                });
            }
        }
    }

    let summary = compute_summary(&reviews, failures.len());
    BillRunReview { reviews, failures, summary }
}

/// Compute bill-run counts from reviewed licences plus the number that failed.
pub fn compute_summary(reviews: &[LicenceReview], failed: usize) -> BillRunSummary {
    let mut summary = BillRunSummary {
        total_licences: reviews.len() + failed,
        failed,
        ..BillRunSummary::default()
    };

    for review in reviews {
        match review.status {
            ReviewStatus::Ready => summary.ready += 1,
            ReviewStatus::Review => summary.review += 1,
        }

        let distinct: BTreeSet<Issue> = review.all_issues().collect();
        for issue in distinct {
            *summary.issue_counts.entry(issue.label().to_string()).or_insert(0) += 1;
        }
    }

    summary
}

/// Licences carrying `issue` on any return log or charge element.
pub fn licences_with_issue(reviews: &[LicenceReview], issue: Issue) -> Vec<&LicenceReview> {
    reviews
        .iter()
        .filter(|r| r.all_issues().any(|i| i == issue))
        .collect()
}
