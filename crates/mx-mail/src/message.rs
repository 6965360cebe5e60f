use lettre::{
    Address, Message,
    message::{Mailbox, MultiPart},
};

use crate::error::MailError;

/// A fully composed email, independent of any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from_name: String,
    pub from_address: String,
    pub to_name: String,
    pub to_address: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Acknowledgement returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub response: String,
    /// Only set by transports that keep a viewable copy of the message.
    pub preview_url: Option<String>,
}

pub fn is_valid_address(address: &str) -> bool {
    address.trim().parse::<Address>().is_ok()
}

fn mailbox(name: &str, address: &str) -> Result<Mailbox, MailError> {
    let address = address
        .trim()
        .parse::<Address>()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))?;
    let name = Some(name.trim().to_string()).filter(|name| !name.is_empty());
    Ok(Mailbox::new(name, address))
}

impl OutgoingMail {
    pub fn to_message(&self) -> Result<Message, MailError> {
        Message::builder()
            .from(mailbox(&self.from_name, &self.from_address)?)
            .to(mailbox(&self.to_name, &self.to_address)?)
            .subject(self.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                self.text.clone(),
                self.html.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}
