use std::{path::PathBuf, str::FromStr, sync::Arc};

use async_trait::async_trait;
use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};

use crate::{
    compose::MailSettings,
    error::MailError,
    message::{MailReceipt, OutgoingMail},
};

pub const GMAIL_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Delivers a composed mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<MailReceipt, MailError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465.
    Tls,
    #[default]
    StartTls,
    None,
}

impl FromStr for SmtpSecurity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tls" | "ssl" => Ok(SmtpSecurity::Tls),
            "starttls" => Ok(SmtpSecurity::StartTls),
            "none" | "plain" => Ok(SmtpSecurity::None),
            other => Err(format!("unknown SMTP security mode '{}'", other)),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum MailTransportConfig {
    Gmail {
        user: String,
        app_password: String,
    },
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        security: SmtpSecurity,
    },
    /// Writes `.eml` files into `dir` instead of delivering them.
    File { dir: PathBuf },
}

impl std::fmt::Debug for MailTransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailTransportConfig::Gmail { user, .. } => f
                .debug_struct("Gmail")
                .field("user", user)
                .field("app_password", &"<redacted>")
                .finish(),
            MailTransportConfig::Smtp {
                host,
                port,
                username,
                security,
                ..
            } => f
                .debug_struct("Smtp")
                .field("host", host)
                .field("port", port)
                .field("username", username)
                .field("password", &"<redacted>")
                .field("security", security)
                .finish(),
            MailTransportConfig::File { dir } => f.debug_struct("File").field("dir", dir).finish(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailConfig {
    pub transport: Option<MailTransportConfig>,
    pub settings: MailSettings,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailTransportConfig) -> Result<Self, MailError> {
        let transport = match config {
            MailTransportConfig::Gmail { user, app_password } => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(GMAIL_SMTP_HOST)
                    .map_err(|e| MailError::Build(e.to_string()))?
                    .credentials(Credentials::new(user.clone(), app_password.clone()))
                    .build()
            }
            MailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                security,
            } => {
                let builder = match security {
                    SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                        .map_err(|e| MailError::Build(e.to_string()))?,
                    SmtpSecurity::StartTls => {
                        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                            .map_err(|e| MailError::Build(e.to_string()))?
                    }
                    SmtpSecurity::None => {
                        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    }
                };
                let builder = builder.port(*port);
                match (username, password) {
                    (Some(username), Some(password)) => builder
                        .credentials(Credentials::new(username.clone(), password.clone()))
                        .build(),
                    _ => builder.build(),
                }
            }
            MailTransportConfig::File { .. } => {
                return Err(MailError::Build(
                    "file transport cannot back an SMTP mailer".to_string(),
                ));
            }
        };

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<MailReceipt, MailError> {
        let message = mail.to_message()?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        let text = response.message().collect::<Vec<_>>().join(" ");
        debug!("SMTP relay accepted message: {} {}", response.code(), text);

        Ok(MailReceipt {
            response: format!("{} {}", response.code(), text).trim().to_string(),
            preview_url: None,
        })
    }
}

pub struct FileMailer {
    dir: PathBuf,
    transport: AsyncFileTransport<Tokio1Executor>,
}

impl FileMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            transport: AsyncFileTransport::<Tokio1Executor>::new(&dir),
            dir,
        }
    }
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<MailReceipt, MailError> {
        let message = mail.to_message()?;
        let id = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        let path = self.dir.join(format!("{}.eml", id));
        Ok(MailReceipt {
            response: format!("stored {}", id),
            preview_url: Some(format!("file://{}", path.display())),
        })
    }
}

/// Stands in when no transport is configured.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<MailReceipt, MailError> {
        Err(MailError::NotConfigured)
    }
}

pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match &config.transport {
        None => {
            info!("No mail transport configured, email delivery is disabled");
            Ok(Arc::new(DisabledMailer))
        }
        Some(MailTransportConfig::File { dir }) => {
            info!("Writing outgoing mail to {}", dir.display());
            Ok(Arc::new(FileMailer::new(dir.clone())))
        }
        Some(transport) => {
            info!("Using SMTP mail transport: {:?}", transport);
            Ok(Arc::new(SmtpMailer::new(transport)?))
        }
    }
}
