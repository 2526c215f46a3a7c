use shared::{domain::UserId, protocol::UserFields};

/// The single open draft, if any. Editing and adding are mutually exclusive
/// by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftState {
    #[default]
    Idle,
    EditingExisting {
        target: UserId,
        fields: UserFields,
    },
    AddingNew {
        fields: UserFields,
    },
}

impl DraftState {
    pub fn adding() -> Self {
        Self::AddingNew {
            fields: UserFields::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn editing_target(&self) -> Option<UserId> {
        match self {
            Self::EditingExisting { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&UserFields> {
        match self {
            Self::Idle => None,
            Self::EditingExisting { fields, .. } | Self::AddingNew { fields } => Some(fields),
        }
    }

    pub(crate) fn fields_mut(&mut self) -> Option<&mut UserFields> {
        match self {
            Self::Idle => None,
            Self::EditingExisting { fields, .. } | Self::AddingNew { fields } => Some(fields),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Idle => "no draft".to_string(),
            Self::EditingExisting { target, .. } => format!("edit of user {target}"),
            Self::AddingNew { .. } => "new user draft".to_string(),
        }
    }
}
