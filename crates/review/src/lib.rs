//! `wrls-review` — Two-part-tariff review engine.
//!
//! Pure engine crate: receives a pre-loaded licence graph (charge versions,
//! references, elements and return logs) and returns the issues and review
//! status of every return log, charge element and the licence itself.
//! No persistence or presentation dependencies.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod config;
pub mod crossref;
pub mod engine;
pub mod error;
pub mod issue;
pub mod matcher;
pub mod model;
pub mod summary;

pub use config::{ReviewConfig, ReviewPolicy};
pub use engine::review_licence;
pub use error::ReviewError;
pub use issue::{Issue, ReviewStatus, MULTIPLE_ISSUES, REVIEW_GRADE_ISSUES};
pub use model::{Licence, LicenceReview, RawReturnRow};
pub use summary::{review_bill_run, BillRunReview, BillRunSummary};
