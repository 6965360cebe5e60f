use std::sync::Arc;

use mx_expand::Expander;
use tracing::info;

use crate::{
    compose::{MailSettings, compose_expanded_mail},
    error::MailError,
    message::MailReceipt,
    transport::Mailer,
};

/// Expands a message and mails the result to its recipient.
#[derive(Clone)]
pub struct MailService {
    expander: Expander,
    mailer: Arc<dyn Mailer>,
    settings: MailSettings,
}

impl MailService {
    pub fn new(expander: Expander, mailer: Arc<dyn Mailer>, settings: MailSettings) -> Self {
        Self {
            expander,
            mailer,
            settings,
        }
    }

    pub async fn send_expanded(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<MailReceipt, MailError> {
        let expanded = self.expander.expand(message).await?;
        let mail = compose_expanded_mail(name, email, &expanded, &self.settings);
        let receipt = self.mailer.send(mail).await?;

        info!("Sent expanded message: {}", receipt.response);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::OutgoingMail;
    use async_trait::async_trait;
    use mx_expand::{CompletionError, CompletionProvider, FailurePolicy, Prompt};
    use std::sync::Mutex;

    struct FixedProvider(Result<&'static str, &'static str>);

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn complete(&self, _prompt: &Prompt) -> Result<String, CompletionError> {
            self.0
                .map(str::to_string)
                .map_err(|e| CompletionError::Other(e.to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<MailReceipt, MailError> {
            if self.fail {
                return Err(MailError::Send("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(mail);
            Ok(MailReceipt {
                response: "250 OK".to_string(),
                preview_url: None,
            })
        }
    }

    fn service(
        reply: Result<&'static str, &'static str>,
        policy: FailurePolicy,
        mailer: Arc<RecordingMailer>,
    ) -> MailService {
        let expander = Expander::new(Arc::new(FixedProvider(reply)), policy);
        let settings = MailSettings {
            from_address: "sender@example.com".to_string(),
            ..MailSettings::default()
        };
        MailService::new(expander, mailer, settings)
    }

    #[tokio::test]
    async fn test_send_expanded_mails_expanded_text() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(
            Ok("Here's an expanded version: Dear Ada, I will see you at five o'clock."),
            FailurePolicy::Fail,
            mailer.clone(),
        );

        let receipt = service
            .send_expanded("Ada", "ada@example.com", "see you at 5")
            .await
            .unwrap();

        assert_eq!(receipt.response, "250 OK");
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_address, "ada@example.com");
        assert!(sent[0].html.contains("Hello Ada,"));
        assert!(sent[0].html.contains("I will see you at five o'clock."));
        assert!(!sent[0].html.contains("see you at 5"));
        assert!(sent[0].html.contains("?email=ada%40example.com"));
    }

    #[tokio::test]
    async fn test_send_expanded_stops_on_expansion_failure() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(Err("upstream down"), FailurePolicy::Fail, mailer.clone());

        let err = service
            .send_expanded("Ada", "ada@example.com", "hi")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to expand message: upstream down");
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_expanded_falls_back_to_original_text() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(
            Err("upstream down"),
            FailurePolicy::FallbackToOriginal,
            mailer.clone(),
        );

        service
            .send_expanded("Ada", "ada@example.com", "see you at 5")
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert!(sent[0].html.contains("see you at 5"));
    }

    #[tokio::test]
    async fn test_send_expanded_wraps_transport_failure() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        });
        let service = service(Ok("expanded"), FailurePolicy::Fail, mailer);

        let err = service
            .send_expanded("Ada", "ada@example.com", "hi")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to send email: connection refused");
    }
}
