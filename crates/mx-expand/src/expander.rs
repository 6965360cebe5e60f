use std::{fmt, str::FromStr, sync::Arc};

use tracing::{debug, warn};

use crate::{
    clean::clean_response, error::ExpandError, prompt::Prompt, provider::CompletionProvider,
};

/// What to do when the completion provider fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Surface the provider error to the caller.
    #[default]
    Fail,
    /// Log the provider error and hand back the original message.
    FallbackToOriginal,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" | "error" => Ok(FailurePolicy::Fail),
            "fallback" | "original" => Ok(FailurePolicy::FallbackToOriginal),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Fail => write!(f, "fail"),
            FailurePolicy::FallbackToOriginal => write!(f, "fallback"),
        }
    }
}

#[derive(Clone)]
pub struct Expander {
    provider: Arc<dyn CompletionProvider>,
    policy: FailurePolicy,
}

impl fmt::Debug for Expander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expander").field("policy", &self.policy).finish()
    }
}

impl Expander {
    pub fn new(provider: Arc<dyn CompletionProvider>, policy: FailurePolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Expands `message` into a longer version of itself.
    ///
    /// The result is never empty: a blank completion yields the trimmed
    /// original message.
    pub async fn expand(&self, message: &str) -> Result<String, ExpandError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ExpandError::EmptyMessage);
        }

        match self.provider.complete(&Prompt::expand(message)).await {
            Ok(raw) => {
                let expanded = clean_response(&raw, message);
                debug!(
                    "Expanded message from {} to {} characters",
                    message.chars().count(),
                    expanded.chars().count()
                );
                Ok(expanded)
            }
            Err(err) => match self.policy {
                FailurePolicy::Fail => Err(ExpandError::Provider(err)),
                FailurePolicy::FallbackToOriginal => {
                    warn!("Completion failed, returning original message: {}", err);
                    Ok(message.to_string())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::Mutex;

    struct StubProvider {
        reply: Result<String, String>,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl StubProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.reply.clone().map_err(CompletionError::Other)
        }
    }

    #[tokio::test]
    async fn test_expand_cleans_provider_reply() {
        let provider = StubProvider::replying("Here's an expanded version: Hello, how are you doing today?");
        let expander = Expander::new(provider.clone(), FailurePolicy::Fail);

        let expanded = expander.expand("  hi  ").await.unwrap();

        assert_eq!(expanded, "Hello, how are you doing today?");
        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts[0].user, "Expand the following message: hi");
    }

    #[tokio::test]
    async fn test_expand_blank_reply_returns_original() {
        let provider = StubProvider::replying("Here is an expanded version of the message:");
        let expander = Expander::new(provider, FailurePolicy::Fail);

        assert_eq!(expander.expand("hi").await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_expand_rejects_empty_message_without_calling_provider() {
        let provider = StubProvider::replying("unused");
        let expander = Expander::new(provider.clone(), FailurePolicy::FallbackToOriginal);

        let err = expander.expand(" \n ").await.unwrap_err();

        assert!(matches!(err, ExpandError::EmptyMessage));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_fail_policy_surfaces_provider_error() {
        let expander = Expander::new(StubProvider::failing("quota exceeded"), FailurePolicy::Fail);

        let err = expander.expand("hi").await.unwrap_err();

        assert!(matches!(err, ExpandError::Provider(_)));
        assert_eq!(err.to_string(), "Failed to expand message: quota exceeded");
    }

    #[tokio::test]
    async fn test_fallback_policy_returns_original_message() {
        let expander = Expander::new(
            StubProvider::failing("quota exceeded"),
            FailurePolicy::FallbackToOriginal,
        );

        assert_eq!(expander.expand(" see you at 5 ").await.unwrap(), "see you at 5");
    }

    #[rstest]
    #[case("fail", FailurePolicy::Fail)]
    #[case("error", FailurePolicy::Fail)]
    #[case("fallback", FailurePolicy::FallbackToOriginal)]
    #[case(" Original ", FailurePolicy::FallbackToOriginal)]
    fn test_failure_policy_from_str(#[case] input: &str, #[case] expected: FailurePolicy) {
        assert_eq!(input.parse::<FailurePolicy>().unwrap(), expected);
    }

    #[test]
    fn test_failure_policy_from_str_rejects_unknown() {
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
