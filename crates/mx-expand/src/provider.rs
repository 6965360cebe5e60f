use async_trait::async_trait;

use crate::{error::CompletionError, prompt::Prompt};

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}
