use thiserror::Error;

use crate::ids::{FormId, OptionId, QuestionId};
use crate::spec::MIN_CHOICE_OPTIONS;
use crate::validate::Violation;

/// Why a schema mutation was not applied. The input form is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("question '{0}' not found")]
    QuestionNotFound(QuestionId),
    #[error("option '{option}' not found in question '{question}'")]
    OptionNotFound {
        question: QuestionId,
        option: OptionId,
    },
    #[error("question '{0}' does not take options")]
    OptionsNotSupported(QuestionId),
    #[error(
        "question '{question}' must keep at least {min} options (has {count})",
        min = MIN_CHOICE_OPTIONS
    )]
    OptionFloor { question: QuestionId, count: usize },
}

/// Failures reported by persistence and file-storage collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("form '{id}' is at version {actual}; save was based on version {expected}")]
    VersionConflict {
        id: FormId,
        expected: u32,
        actual: u32,
    },
    #[error("form '{id}' is at version {version} and cannot be saved again")]
    VersionExhausted { id: FormId, version: u32 },
    #[error("storage unavailable: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn form_not_found(id: &FormId) -> Self {
        StoreError::NotFound {
            kind: "form",
            id: id.to_string(),
        }
    }
}

/// Error taxonomy surfaced to callers of the service layer.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation failed: {}", join_messages(.0))]
    Validation(Vec<Violation>),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("form '{id}' is at version {actual}; save was based on version {expected}")]
    VersionConflict {
        id: FormId,
        expected: u32,
        actual: u32,
    },
    #[error("form '{id}' is at version {version} and cannot be saved again")]
    VersionExhausted { id: FormId, version: u32 },
    #[error("storage unavailable: {0}")]
    Transport(String),
    #[error("schema edit rejected: {0}")]
    Edit(#[from] EditError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for FormError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { kind, id } => FormError::NotFound { kind, id },
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => FormError::VersionConflict {
                id,
                expected,
                actual,
            },
            StoreError::VersionExhausted { id, version } => {
                FormError::VersionExhausted { id, version }
            }
            StoreError::Transport(message) => FormError::Transport(message),
        }
    }
}

impl FormError {
    /// Violations carried by a validation failure; empty for other kinds.
    pub fn violations(&self) -> &[Violation] {
        match self {
            FormError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn join_messages(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| violation.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
