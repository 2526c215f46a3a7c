use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{FieldName, UserId};

/// Body of the create and partial-update calls. `id` is never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    pub name: String,
    pub email: String,
}

impl UserFields {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        match field {
            FieldName::Name => self.name = value.into(),
            FieldName::Email => self.email = value.into(),
        }
    }
}

/// One user as held by the remote resource.
///
/// Attributes other than `id`, `name` and `email` are kept in `extra` so a
/// local merge never drops data the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }

    pub fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Returns a new snapshot with `name` and `email` replaced by `fields`.
    pub fn merged(&self, fields: &UserFields) -> Self {
        Self {
            id: self.id,
            name: fields.name.clone(),
            email: fields.email.clone(),
            extra: self.extra.clone(),
        }
    }
}
