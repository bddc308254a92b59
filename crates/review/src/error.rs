use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate escalation, empty column name, etc.).
    ConfigValidation(String),
    /// IO error (file read, CSV read, etc.).
    Io(String),
    /// Missing required column in raw pairing rows.
    MissingColumn { column: String },
    /// Date parse error in raw pairing rows.
    DateParse { row: usize, column: String, value: String },
    /// A charge element references a return log the licence does not have.
    UnknownReturnLog {
        licence_id: String,
        element_id: String,
        return_id: String,
    },
    /// Two return logs in one licence share an id.
    DuplicateReturnLog { licence_id: String, return_id: String },
    /// Two charge versions, references or elements in one licence share an id.
    DuplicateChargeId {
        licence_id: String,
        kind: &'static str,
        id: String,
    },
    /// A flat charge record points at an owner that was not supplied.
    MissingOwner {
        kind: &'static str,
        id: String,
        owner_id: String,
    },
}

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::DateParse { row, column, value } => {
                write!(f, "row {row}, column '{column}': cannot parse date '{value}'")
            }
            Self::UnknownReturnLog { licence_id, element_id, return_id } => write!(
                f,
                "licence '{licence_id}': charge element '{element_id}' is matched to unknown return log '{return_id}'"
            ),
            Self::DuplicateReturnLog { licence_id, return_id } => {
                write!(f, "licence '{licence_id}': duplicate return log '{return_id}'")
            }
            Self::DuplicateChargeId { licence_id, kind, id } => {
                write!(f, "licence '{licence_id}': duplicate {kind} '{id}'")
            }
            Self::MissingOwner { kind, id, owner_id } => {
                write!(f, "{kind} '{id}': owner '{owner_id}' not found")
            }
        }
    }
}

impl std::error::Error for ReviewError {}

impl serde::Serialize for ReviewError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl ReviewError {
    /// True for errors caused by a defective licence graph rather than bad config or IO.
    pub fn is_malformed_graph(&self) -> bool {
        matches!(
            self,
            Self::UnknownReturnLog { .. }
                | Self::DuplicateReturnLog { .. }
                | Self::DuplicateChargeId { .. }
                | Self::MissingOwner { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_return_message_names_all_ids() {
        let err = ReviewError::UnknownReturnLog {
            licence_id: "L1".into(),
            element_id: "E1".into(),
            return_id: "R9".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'L1'"));
        assert!(msg.contains("'E1'"));
        assert!(msg.contains("'R9'"));
        assert!(err.is_malformed_graph());
        assert_eq!(serde_json::to_value(&err).unwrap(), serde_json::json!(msg));
    }

    #[test]
    fn config_errors_are_not_graph_errors() {
        assert!(!ReviewError::ConfigParse("bad".into()).is_malformed_graph());
        assert!(!ReviewError::Io("gone".into()).is_malformed_graph());
    }
}
