use mx_expand::ExpandError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport is not configured")]
    NotConfigured,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Send(String),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}
