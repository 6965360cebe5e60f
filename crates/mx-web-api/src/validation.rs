use serde_json::Value;

use crate::api::{ExpandMessageRequest, FieldError, SendEmailRequest};

/// A request that checks its own fields and yields the trimmed values.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, Vec<FieldError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInput {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn required_text(field: &str, value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, format!("{} is required", label(field))));
            None
        }
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                errors.push(FieldError::new(field, format!("{} must not be empty", label(field))));
                None
            } else {
                Some(text.to_string())
            }
        }
        Some(_) => {
            errors.push(FieldError::new(field, format!("{} must be a string", label(field))));
            None
        }
    }
}

fn email_address(field: &str, value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let email = required_text(field, value, errors)?;
    if mx_mail::is_valid_address(&email) {
        Some(email)
    } else {
        errors.push(FieldError::new(field, "Email must be a valid email address"));
        None
    }
}

impl Validate for ExpandMessageRequest {
    type Output = MessageInput;

    fn validate(self) -> Result<Self::Output, Vec<FieldError>> {
        let mut errors = Vec::new();
        match required_text("message", self.message.as_ref(), &mut errors) {
            Some(message) => Ok(MessageInput { message }),
            None => Err(errors),
        }
    }
}

impl Validate for SendEmailRequest {
    type Output = EmailInput;

    fn validate(self) -> Result<Self::Output, Vec<FieldError>> {
        let mut errors = Vec::new();
        let name = required_text("name", self.name.as_ref(), &mut errors);
        let email = email_address("email", self.email.as_ref(), &mut errors);
        let message = required_text("message", self.message.as_ref(), &mut errors);

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(EmailInput {
                name,
                email,
                message,
            }),
            _ => Err(errors),
        }
    }
}
