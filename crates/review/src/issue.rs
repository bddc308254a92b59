//! Issue taxonomy shared by the return-log and charge-element classifiers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Issue {
    // Return log issues, in evaluation order
    #[serde(rename = "Over abstraction")]
    OverAbstraction,
    #[serde(rename = "Abstraction outside period")]
    AbstractionOutsidePeriod,
    #[serde(rename = "Checking query")]
    CheckingQuery,
    #[serde(rename = "No returns received")]
    NoReturnsReceived,
    #[serde(rename = "Returns received but not processed")]
    ReturnsReceivedNotProcessed,
    #[serde(rename = "Returns received late")]
    ReturnsReceivedLate,
    #[serde(rename = "Return split over charge references")]
    ReturnSplitOverChargeReferences,

    // Charge element issues, in evaluation order
    #[serde(rename = "Unable to match return")]
    UnableToMatchReturn,
    #[serde(rename = "Aggregate")]
    Aggregate,
    #[serde(rename = "Overlap of charge dates")]
    OverlapOfChargeDates,
    #[serde(rename = "Some returns not received")]
    SomeReturnsNotReceived,

    /// Raised by the allocation collaborator, never by this crate's classifiers.
    #[serde(rename = "Unable to allocate returns")]
    UnableToAllocateReturns,
}

/// Issues that force Review wherever they appear in a licence's graph.
pub const REVIEW_GRADE_ISSUES: [Issue; 7] = [
    Issue::Aggregate,
    Issue::CheckingQuery,
    Issue::OverlapOfChargeDates,
    Issue::ReturnsReceivedNotProcessed,
    Issue::ReturnSplitOverChargeReferences,
    Issue::UnableToAllocateReturns,
    Issue::UnableToMatchReturn,
];

/// Licence label used when more than one distinct issue is present.
pub const MULTIPLE_ISSUES: &str = "Multiple issues";

impl Issue {
    pub const ALL: [Issue; 12] = [
        Issue::OverAbstraction,
        Issue::AbstractionOutsidePeriod,
        Issue::CheckingQuery,
        Issue::NoReturnsReceived,
        Issue::ReturnsReceivedNotProcessed,
        Issue::ReturnsReceivedLate,
        Issue::ReturnSplitOverChargeReferences,
        Issue::UnableToMatchReturn,
        Issue::Aggregate,
        Issue::OverlapOfChargeDates,
        Issue::SomeReturnsNotReceived,
        Issue::UnableToAllocateReturns,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OverAbstraction => "Over abstraction",
            Self::AbstractionOutsidePeriod => "Abstraction outside period",
            Self::CheckingQuery => "Checking query",
            Self::NoReturnsReceived => "No returns received",
            Self::ReturnsReceivedNotProcessed => "Returns received but not processed",
            Self::ReturnsReceivedLate => "Returns received late",
            Self::ReturnSplitOverChargeReferences => "Return split over charge references",
            Self::UnableToMatchReturn => "Unable to match return",
            Self::Aggregate => "Aggregate",
            Self::OverlapOfChargeDates => "Overlap of charge dates",
            Self::SomeReturnsNotReceived => "Some returns not received",
            Self::UnableToAllocateReturns => "Unable to allocate returns",
        }
    }

    /// Look up an issue by its exact label.
    pub fn from_label(label: &str) -> Option<Issue> {
        Self::ALL.iter().copied().find(|i| i.label() == label)
    }

    /// Membership in the canonical review-grade set, before any configured escalation.
    pub fn is_review_grade(&self) -> bool {
        REVIEW_GRADE_ISSUES.contains(self)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialized as "Ready" / "Review", the values review records store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    Ready,
    Review,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Review => write!(f, "Review"),
        }
    }
}
