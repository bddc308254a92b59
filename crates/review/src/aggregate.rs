//! Licence-level roll-up of return-log and charge-element classifications.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::issue::{Issue, ReviewStatus, MULTIPLE_ISSUES};
use crate::model::{ChargeElementReview, ReturnLogReview};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenceVerdict {
    pub status: ReviewStatus,
    pub issue: String,
}

/// Review if any return or element is in review. Order-independent.
pub fn licence_status<'a>(
    returns: &[ReturnLogReview],
    elements: impl IntoIterator<Item = &'a ChargeElementReview>,
) -> ReviewStatus {
    let any_review = returns.iter().any(|r| r.status == ReviewStatus::Review)
        || elements.into_iter().any(|e| e.status == ReviewStatus::Review);

    if any_review {
        ReviewStatus::Review
    } else {
        ReviewStatus::Ready
    }
}

/// "" for no issues, the issue's label for one distinct issue, else "Multiple issues".
pub fn issue_label(issues: impl IntoIterator<Item = Issue>) -> String {
    let distinct: BTreeSet<Issue> = issues.into_iter().collect();
    let mut iter = distinct.iter();
    match (iter.next(), iter.next()) {
        (None, _) => String::new(),
        (Some(only), None) => only.label().to_string(),
        (Some(_), Some(_)) => MULTIPLE_ISSUES.to_string(),
    }
}

pub fn aggregate_licence<'a>(
    returns: &[ReturnLogReview],
    elements: impl IntoIterator<Item = &'a ChargeElementReview> + Clone,
) -> LicenceVerdict {
    let issues = returns
        .iter()
        .flat_map(|r| r.issues.iter().copied())
        .chain(elements.clone().into_iter().flat_map(|e| e.issues.iter().copied()));

    LicenceVerdict {
        issue: issue_label(issues),
        status: licence_status(returns, elements),
    }
}
