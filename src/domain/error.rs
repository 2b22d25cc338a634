use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain validation failed for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("`{value}` is not a deliverable e-mail address: {reason}")]
    InvalidEmail { value: String, reason: String },
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
