use std::collections::{BTreeSet, HashMap};

use crate::config::ReviewPolicy;
use crate::error::ReviewError;
use crate::issue::{Issue, ReviewStatus};
use crate::model::{ChargeElement, ChargeElementReview, ReturnLog, ReturnLogReview, ReturnStatus};

/// Issues for one return log, in fixed evaluation order.
pub fn return_log_issues(log: &ReturnLog, split: bool) -> Vec<Issue> {
    let mut issues = Vec::new();

    if log.quantity > log.allocated_quantity {
        issues.push(Issue::OverAbstraction);
    }
    if log.abstraction_outside_period {
        issues.push(Issue::AbstractionOutsidePeriod);
    }
    if log.under_query {
        issues.push(Issue::CheckingQuery);
    }
    if log.status == ReturnStatus::Due {
        issues.push(Issue::NoReturnsReceived);
    }
    if log.status == ReturnStatus::Received {
        issues.push(Issue::ReturnsReceivedNotProcessed);
    }
    if log.received_date.is_some_and(|received| received > log.due_date) {
        issues.push(Issue::ReturnsReceivedLate);
    }
    if split {
        issues.push(Issue::ReturnSplitOverChargeReferences);
    }

    issues
}

pub fn classify_return_log(log: &ReturnLog, split: bool, policy: &ReviewPolicy) -> ReturnLogReview {
    let issues = return_log_issues(log, split);
    ReturnLogReview {
        id: log.id.clone(),
        status: status_for(&issues, policy),
        issues,
    }
}

/// Issues for one charge element, in fixed evaluation order.
///
/// `returns_by_id` is the licence's full return-log collection; the
/// "Some returns not received" check reads each matched return's own record.
pub fn charge_element_issues(
    licence_id: &str,
    element: &ChargeElement,
    aggregate_factor: Option<f64>,
    returns_by_id: &HashMap<&str, &ReturnLog>,
) -> Result<Vec<Issue>, ReviewError> {
    // Matched returns are a set; a repeated id counts once
    let matched: BTreeSet<&str> = element.matched_ids().iter().map(String::as_str).collect();
    let mut any_due = false;
    for &return_id in &matched {
        let log = returns_by_id.get(return_id).ok_or_else(|| {
            ReviewError::UnknownReturnLog {
                licence_id: licence_id.into(),
                element_id: element.id.clone(),
                return_id: return_id.to_string(),
            }
        })?;
        any_due |= log.status == ReturnStatus::Due;
    }

    let mut issues = Vec::new();

    if matched.is_empty() {
        issues.push(Issue::UnableToMatchReturn);
    }
    // Strict comparison: only an explicit factor other than exactly 1
    if aggregate_factor.is_some_and(|factor| factor != 1.0) {
        issues.push(Issue::Aggregate);
    }
    if element.charge_dates_overlap {
        issues.push(Issue::OverlapOfChargeDates);
    }
    if matched.len() > 1 && any_due {
        issues.push(Issue::SomeReturnsNotReceived);
    }

    Ok(issues)
}

pub fn classify_charge_element(
    licence_id: &str,
    element: &ChargeElement,
    aggregate_factor: Option<f64>,
    returns_by_id: &HashMap<&str, &ReturnLog>,
    policy: &ReviewPolicy,
) -> Result<ChargeElementReview, ReviewError> {
    let issues = charge_element_issues(licence_id, element, aggregate_factor, returns_by_id)?;
    Ok(ChargeElementReview {
        id: element.id.clone(),
        status: status_for(&issues, policy),
        issues,
    })
}

fn status_for(issues: &[Issue], policy: &ReviewPolicy) -> ReviewStatus {
    if policy.any_review_grade(issues) {
        ReviewStatus::Review
    } else {
        ReviewStatus::Ready
    }
}
