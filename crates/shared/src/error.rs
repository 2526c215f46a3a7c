use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field '{field}', expected 'name' or 'email'")]
pub struct UnknownField {
    pub field: String,
}

impl UnknownField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}
