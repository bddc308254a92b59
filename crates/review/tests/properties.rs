//! Property tests: issue ordering, licence verdict, and idempotence over random graphs.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use wrls_review::config::ReviewPolicy;
use wrls_review::crossref::{is_return_split, ReturnIndex};
use wrls_review::engine::review_licence;
use wrls_review::model::{
    ChargeElement, ChargeReference, ChargeVersion, Licence, ReturnLog, ReturnStatus,
};
use wrls_review::{Issue, ReviewStatus, MULTIPLE_ISSUES};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 28).unwrap()
}

fn arb_status() -> impl Strategy<Value = ReturnStatus> {
    prop_oneof![
        Just(ReturnStatus::Due),
        Just(ReturnStatus::Received),
        Just(ReturnStatus::Completed),
        Just(ReturnStatus::Void),
    ]
}

fn arb_return_log(id: String) -> impl Strategy<Value = ReturnLog> {
    (
        arb_status(),
        0u32..20,
        0u32..20,
        any::<bool>(),
        any::<bool>(),
        proptest::option::of(-5i64..5),
    )
        .prop_map(move |(status, quantity, allocated, outside, query, offset)| ReturnLog {
            id: id.clone(),
            status,
            quantity: quantity as f64,
            allocated_quantity: allocated as f64,
            abstraction_outside_period: outside,
            under_query: query,
            received_date: offset.map(|d| due_date() + chrono::Duration::days(d)),
            due_date: due_date(),
        })
}

fn arb_factor() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![Just(None), Just(Some(1.0)), Just(Some(0.5)), Just(Some(2.0))]
}

/// A licence with up to 5 return logs and up to 4 references of up to 3 elements,
/// spread round-robin over 1 to 3 charge versions. Each element matches a random
/// subset of the return ids.
fn arb_licence() -> impl Strategy<Value = Licence> {
    (0usize..=5, 1usize..=3)
        .prop_flat_map(|(n_returns, n_versions)| {
            let logs: Vec<_> = (0..n_returns).map(|i| arb_return_log(format!("r{i}"))).collect();
            let element = (
                any::<bool>(),
                proptest::option::weighted(0.9, proptest::collection::vec(0..n_returns.max(1), 0..=3)),
            );
            let reference = (arb_factor(), proptest::collection::vec(element, 1..=3));
            (Just(n_returns), Just(n_versions), logs, proptest::collection::vec(reference, 0..=4))
        })
        .prop_map(|(n_returns, n_versions, return_logs, references)| {
            let mut charge_versions: Vec<ChargeVersion> = (0..n_versions)
                .map(|vi| ChargeVersion {
                    id: format!("cv{vi}"),
                    charge_references: Vec::new(),
                })
                .collect();

            for (ri, (aggregate_factor, elements)) in references.into_iter().enumerate() {
                let reference = ChargeReference {
                    id: format!("ref{ri}"),
                    aggregate_factor,
                    charge_elements: elements
                        .into_iter()
                        .enumerate()
                        .map(|(ei, (overlap, matched))| ChargeElement {
                            id: format!("ref{ri}-e{ei}"),
                            charge_dates_overlap: overlap,
                            matched_return_ids: matched.map(|idx| {
                                let unique: BTreeSet<usize> =
                                    idx.into_iter().filter(|i| *i < n_returns).collect();
                                unique.into_iter().map(|i| format!("r{i}")).collect()
                            }),
                        })
                        .collect(),
                };
                charge_versions[ri % n_versions].charge_references.push(reference);
            }

            Licence {
                id: "L1".into(),
                charge_versions,
                return_logs,
            }
        })
}

fn all_references(licence: &Licence) -> impl Iterator<Item = &ChargeReference> {
    licence.charge_versions.iter().flat_map(|v| v.charge_references.iter())
}

fn return_issue_order() -> [Issue; 7] {
    [
        Issue::OverAbstraction,
        Issue::AbstractionOutsidePeriod,
        Issue::CheckingQuery,
        Issue::NoReturnsReceived,
        Issue::ReturnsReceivedNotProcessed,
        Issue::ReturnsReceivedLate,
        Issue::ReturnSplitOverChargeReferences,
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn return_issues_are_fixed_order_filter(licence in arb_licence()) {
        let review = review_licence(&licence, &ReviewPolicy::default()).unwrap();
        let order = return_issue_order();

        for (log, reviewed) in licence.return_logs.iter().zip(&review.return_logs) {
            let refs: BTreeSet<&str> = all_references(&licence)
                .filter(|r| r.charge_elements.iter().any(|e| e.matched_ids().contains(&log.id)))
                .map(|r| r.id.as_str())
                .collect();

            let present = [
                log.quantity > log.allocated_quantity,
                log.abstraction_outside_period,
                log.under_query,
                log.status == ReturnStatus::Due,
                log.status == ReturnStatus::Received,
                log.received_date.is_some_and(|d| d > log.due_date),
                refs.len() >= 2,
            ];
            let expected: Vec<Issue> = order
                .iter()
                .zip(present)
                .filter(|(_, p)| *p)
                .map(|(i, _)| *i)
                .collect();
            prop_assert_eq!(&reviewed.issues, &expected);
        }
    }

    #[test]
    fn unmatched_elements_never_report_missing_returns(licence in arb_licence()) {
        let review = review_licence(&licence, &ReviewPolicy::default()).unwrap();
        let elements = all_references(&licence).flat_map(|r| r.charge_elements.iter());

        for element in elements {
            let reviewed = review.charge_element(&element.id).unwrap();
            if element.matched_ids().is_empty() {
                prop_assert_eq!(reviewed.issues[0], Issue::UnableToMatchReturn);
                prop_assert_eq!(
                    reviewed.issues.iter().filter(|i| **i == Issue::UnableToMatchReturn).count(),
                    1
                );
                prop_assert!(!reviewed.issues.contains(&Issue::SomeReturnsNotReceived));
                prop_assert_eq!(reviewed.status, ReviewStatus::Review);
            } else {
                prop_assert!(!reviewed.issues.contains(&Issue::UnableToMatchReturn));
            }
        }
    }

    #[test]
    fn licence_verdict_matches_graph(licence in arb_licence()) {
        let review = review_licence(&licence, &ReviewPolicy::default()).unwrap();

        let all: Vec<Issue> = review.all_issues().collect();
        let any_review_grade = all.iter().any(|i| i.is_review_grade());
        let expected_status = if any_review_grade { ReviewStatus::Review } else { ReviewStatus::Ready };
        prop_assert_eq!(review.status, expected_status);

        let distinct: BTreeSet<Issue> = all.into_iter().collect();
        let expected_label = match distinct.len() {
            0 => String::new(),
            1 => distinct.iter().next().unwrap().label().to_string(),
            _ => MULTIPLE_ISSUES.to_string(),
        };
        prop_assert_eq!(&review.issue, &expected_label);
    }

    #[test]
    fn split_traversal_agrees_with_index(licence in arb_licence()) {
        let index = ReturnIndex::build(&licence);
        for log in &licence.return_logs {
            prop_assert_eq!(
                is_return_split(&licence, &log.id),
                index.is_split(&log.id),
                "return {}", log.id
            );
        }
        prop_assert!(!is_return_split(&licence, "not-a-return"));
        prop_assert!(!index.is_split("not-a-return"));
    }

    #[test]
    fn review_is_idempotent(licence in arb_licence()) {
        let first = review_licence(&licence, &ReviewPolicy::default()).unwrap();
        let second = review_licence(&licence, &ReviewPolicy::default()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reordering_references_keeps_verdict(licence in arb_licence()) {
        let mut reversed = licence.clone();
        reversed.charge_versions.reverse();
        for version in &mut reversed.charge_versions {
            version.charge_references.reverse();
        }
        reversed.return_logs.reverse();

        let a = review_licence(&licence, &ReviewPolicy::default()).unwrap();
        let b = review_licence(&reversed, &ReviewPolicy::default()).unwrap();
        prop_assert_eq!(a.status, b.status);
        prop_assert_eq!(a.issue, b.issue);
    }
}
