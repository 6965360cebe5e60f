//! Email delivery for expanded messages.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `MX_MAIL_PREVIEW_DIR` | Write messages as `.eml` files instead of sending them |
//! | `SMTP_HOST` / `SMTP_PORT` / `SMTP_USER` / `SMTP_PASS` / `SMTP_SECURITY` | Explicit SMTP relay |
//! | `EMAIL_USER` / `EMAIL_PASS` | Gmail account and app password |
//!
//! The variables are read by the web service's configuration loader and
//! handed to [`build_mailer`] as a [`MailTransportConfig`].
pub mod compose;
pub mod error;
pub mod message;
pub mod service;
pub mod transport;

pub use compose::{MailSettings, compose_expanded_mail, confirmation_link};
pub use error::MailError;
pub use message::{MailReceipt, OutgoingMail, is_valid_address};
pub use service::MailService;
pub use transport::{
    DisabledMailer, FileMailer, MailConfig, MailTransportConfig, Mailer, SmtpMailer, SmtpSecurity,
    build_mailer,
};
