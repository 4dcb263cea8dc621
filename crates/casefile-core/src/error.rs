use crate::session::Phase;

/// Errors produced by the case engine
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    /// No case with this id exists in the catalog
    #[error("case not found: {0}")]
    CaseNotFound(String),

    /// A grid operation addressed a pair outside the case's categories
    #[error("({subject}, {item}) is not a cell of this grid")]
    InvalidCoordinate { subject: String, item: String },

    /// Case data failed validation at load time
    #[error("invalid case '{case_id}': {reason}")]
    InvalidCase { case_id: String, reason: String },

    /// A session operation was attempted in the wrong phase
    #[error("cannot {action} while the session is {phase}")]
    InvalidState { action: &'static str, phase: Phase },

    /// Catalog text was not valid JSON for the authoring format
    #[error("failed to parse case data: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CaseError {
    pub(crate) fn invalid_case(case_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCase {
            case_id: case_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_coordinate(subject: &str, item: &str) -> Self {
        Self::InvalidCoordinate {
            subject: subject.to_string(),
            item: item.to_string(),
        }
    }
}

/// Result type for case engine operations
pub type Result<T> = std::result::Result<T, CaseError>;
