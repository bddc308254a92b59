use std::path::Path;

use serde::Deserialize;

use crate::error::ReviewError;
use crate::issue::Issue;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub policy: ReviewPolicy,
    #[serde(default)]
    pub input: InputConfig,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which issues force a licence into Review.
///
/// The canonical review-grade set is fixed (`REVIEW_GRADE_ISSUES`). `escalate`
/// promotes additional issues, e.g. "Returns received late", for billing
/// teams that want those checked by hand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPolicy {
    #[serde(default)]
    pub escalate: Vec<Issue>,
}

impl ReviewPolicy {
    pub fn is_review_grade(&self, issue: Issue) -> bool {
        issue.is_review_grade() || self.escalate.contains(&issue)
    }

    pub fn any_review_grade(&self, issues: &[Issue]) -> bool {
        issues.iter().any(|i| self.is_review_grade(*i))
    }
}

// ---------------------------------------------------------------------------
// Raw row input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d".into()
}

/// Header names for the raw pairing-row CSV.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub return_id: String,
    pub charge_element_id: String,
    pub charge_version_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            return_id: "return_id".into(),
            charge_element_id: "charge_element_id".into(),
            charge_version_id: "charge_version_id".into(),
            start_date: "charge_period_start_date".into(),
            end_date: "charge_period_end_date".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReviewConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReviewError> {
        let config: ReviewConfig =
            toml::from_str(input).map_err(|e| ReviewError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ReviewError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReviewError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReviewError> {
        for (i, issue) in self.policy.escalate.iter().enumerate() {
            if issue.is_review_grade() {
                return Err(ReviewError::ConfigValidation(format!(
                    "escalate: '{issue}' is already review-grade"
                )));
            }
            if self.policy.escalate[..i].contains(issue) {
                return Err(ReviewError::ConfigValidation(format!(
                    "escalate: '{issue}' listed more than once"
                )));
            }
        }

        let col = &self.input.columns;
        let names = [
            ("return_id", &col.return_id),
            ("charge_element_id", &col.charge_element_id),
            ("charge_version_id", &col.charge_version_id),
            ("start_date", &col.start_date),
            ("end_date", &col.end_date),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ReviewError::ConfigValidation(format!(
                    "input.columns.{field} must not be empty"
                )));
            }
        }

        if self.input.date_format.trim().is_empty() {
            return Err(ReviewError::ConfigValidation(
                "input.date_format must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "2PT annual review"

[policy]
escalate = ["Returns received late"]

[input]
date_format = "%d/%m/%Y"

[input.columns]
return_id = "returnResultId"
charge_element_id = "chargeElementResultId"
"#;

    #[test]
    fn parse_full() {
        let config = ReviewConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "2PT annual review");
        assert_eq!(config.policy.escalate, vec![Issue::ReturnsReceivedLate]);
        assert_eq!(config.input.date_format, "%d/%m/%Y");
        assert_eq!(config.input.columns.return_id, "returnResultId");
        assert_eq!(config.input.columns.charge_element_id, "chargeElementResultId");
        // Unspecified columns keep their defaults
        assert_eq!(config.input.columns.charge_version_id, "charge_version_id");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReviewConfig::from_toml("").unwrap();
        assert!(config.policy.escalate.is_empty());
        assert_eq!(config.input.date_format, "%Y-%m-%d");
        assert_eq!(config.input.columns.start_date, "charge_period_start_date");
    }

    #[test]
    fn escalation_extends_review_grade() {
        let config = ReviewConfig::from_toml(FULL).unwrap();
        assert!(config.policy.is_review_grade(Issue::ReturnsReceivedLate));
        assert!(config.policy.is_review_grade(Issue::Aggregate));
        assert!(!config.policy.is_review_grade(Issue::NoReturnsReceived));

        let default_policy = ReviewPolicy::default();
        assert!(!default_policy.is_review_grade(Issue::ReturnsReceivedLate));
    }

    #[test]
    fn reject_unknown_issue_label() {
        let err = ReviewConfig::from_toml("[policy]\nescalate = [\"Late returns\"]\n").unwrap_err();
        assert!(matches!(err, ReviewError::ConfigParse(_)));
    }

    #[test]
    fn reject_already_review_grade() {
        let err = ReviewConfig::from_toml("[policy]\nescalate = [\"Aggregate\"]\n").unwrap_err();
        assert!(err.to_string().contains("already review-grade"));
    }

    #[test]
    fn reject_duplicate_escalation() {
        let input = "[policy]\nescalate = [\"No returns received\", \"No returns received\"]\n";
        let err = ReviewConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn reject_empty_column() {
        let err = ReviewConfig::from_toml("[input.columns]\nreturn_id = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("input.columns.return_id"));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = ReviewConfig::from_file(&path).unwrap();
        assert_eq!(config.name, "2PT annual review");

        let missing = ReviewConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ReviewError::Io(_)));
    }
}
