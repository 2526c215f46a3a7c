use std::fmt;

use thiserror::Error;

use crate::diagnostics::Operation;

/// The user intents accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Initialize,
    StartEdit,
    ChangeField,
    SaveEdit,
    SaveAdd,
    CancelAdd,
    Delete,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialize => "initialize",
            Self::StartEdit => "start-edit",
            Self::ChangeField => "change-field",
            Self::SaveEdit => "save-edit",
            Self::SaveAdd => "save-add",
            Self::CancelAdd => "cancel-add",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The remote call could not be sent or returned a non-success status.
    #[error("network failure during {operation}: {source:#}")]
    NetworkFailure {
        operation: Operation,
        source: anyhow::Error,
    },
    /// The intent was issued while the state it requires is absent.
    #[error("{intent} rejected: {reason}")]
    PreconditionViolation { intent: Intent, reason: String },
}

impl ControllerError {
    pub(crate) fn precondition(intent: Intent, reason: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            intent,
            reason: reason.into(),
        }
    }

    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }
}
