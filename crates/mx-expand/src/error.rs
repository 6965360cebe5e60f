use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion API key is not configured")]
    MissingApiKey,
    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Completion response contained no message content")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error("Failed to expand message: {0}")]
    Provider(#[from] CompletionError),
}
