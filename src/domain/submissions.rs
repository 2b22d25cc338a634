//! Validated contact and newsletter submissions.

use brewcache_api_types::{ContactRequest, SubscribeRequest};
use lettre::Address;

use super::error::DomainError;

/// A contact form submission with every field present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl TryFrom<ContactRequest> for ContactSubmission {
    type Error = DomainError;

    fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("name", request.name)?,
            email: email(required("email", request.email)?)?,
            subject: required("subject", request.subject)?,
            message: required("message", request.message)?,
        })
    }
}

impl ContactSubmission {
    /// Message body split on line breaks, for templates that join lines with `<br>`.
    pub fn message_lines(&self) -> Vec<&str> {
        self.message.lines().collect()
    }
}

/// A newsletter subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub email: String,
}

impl TryFrom<SubscribeRequest> for Subscription {
    type Error = DomainError;

    fn try_from(request: SubscribeRequest) -> Result<Self, Self::Error> {
        let email = email(required("email", request.email)?)?;
        Ok(Self { email })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DomainError::validation(field, "field is required")),
    }
}

/// Accept only addresses the outbound mailer can use as `Reply-To`.
fn email(value: String) -> Result<String, DomainError> {
    match value.parse::<Address>() {
        Ok(_) => Ok(value),
        Err(err) => Err(DomainError::InvalidEmail {
            reason: err.to_string(),
            value,
        }),
    }
}
