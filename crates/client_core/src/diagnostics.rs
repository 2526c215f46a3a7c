//! Diagnostic channel for remote outcomes and implicit draft loss.

use std::fmt;

use chrono::{DateTime, Utc};
use shared::domain::UserId;

use crate::draft::DraftState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Update,
    Create,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Update => "update",
            Self::Create => "create",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    Loaded {
        count: usize,
    },
    LoadFailed {
        message: String,
    },
    RemoteCallSucceeded {
        operation: Operation,
        id: Option<UserId>,
    },
    RemoteCallFailed {
        operation: Operation,
        id: Option<UserId>,
        message: String,
    },
    /// An open draft was replaced or invalidated without being saved.
    DraftDiscarded {
        draft: DraftState,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub occurred_at: DateTime<Utc>,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn now(kind: DiagnosticKind) -> Self {
        Self {
            occurred_at: Utc::now(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.occurred_at.format("%H:%M:%S");
        match &self.kind {
            DiagnosticKind::Loaded { count } => write!(f, "[{at}] loaded {count} users"),
            DiagnosticKind::LoadFailed { message } => {
                write!(f, "[{at}] unable to load users: {message}")
            }
            DiagnosticKind::RemoteCallSucceeded { operation, id } => match id {
                Some(id) => write!(f, "[{at}] {operation} of user {id} acknowledged"),
                None => write!(f, "[{at}] {operation} acknowledged"),
            },
            DiagnosticKind::RemoteCallFailed {
                operation,
                id,
                message,
            } => match id {
                Some(id) => write!(f, "[{at}] unable to {operation} user {id}: {message}"),
                None => write!(f, "[{at}] unable to {operation} user: {message}"),
            },
            DiagnosticKind::DraftDiscarded { draft } => {
                write!(f, "[{at}] discarded unsaved {}", draft.label())
            }
        }
    }
}
