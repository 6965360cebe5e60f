use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::message::OutgoingMail;

pub const DEFAULT_CONFIRM_BASE_URL: &str = "https://example.com/confirm";
pub const DEFAULT_FROM_NAME: &str = "Message Expander";
pub const DEFAULT_SUBJECT: &str = "You have received a message";

// Characters left alone by JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Sender identity and template settings shared by every outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub from_name: String,
    pub from_address: String,
    pub subject: String,
    pub confirm_base_url: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from_name: DEFAULT_FROM_NAME.to_string(),
            from_address: String::new(),
            subject: DEFAULT_SUBJECT.to_string(),
            confirm_base_url: DEFAULT_CONFIRM_BASE_URL.to_string(),
        }
    }
}

/// Builds the confirmation link embedded in every mail. Nothing serves it.
pub fn confirmation_link(base_url: &str, email: &str) -> String {
    format!(
        "{}?email={}",
        base_url,
        utf8_percent_encode(email, URI_COMPONENT)
    )
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// Attribute values also need their quotes escaped.
fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_html(name: &str, expanded: &str, link: &str, from_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2 style="color: #2c3e50;">Hello {name},</h2>
      <p style="white-space: pre-line;">{message}</p>
      <p>Please confirm that you received this message:</p>
      <p>
        <a href="{link}" style="display: inline-block; padding: 10px 20px; background-color: #3498db; color: #ffffff; text-decoration: none; border-radius: 4px;">Confirm</a>
      </p>
      <p>Best regards,<br>{from}</p>
    </div>
  </body>
</html>
"#,
        name = escape_text(name),
        message = escape_text(expanded),
        link = escape_attribute(link),
        from = escape_text(from_name),
    )
}

fn render_text(name: &str, expanded: &str, link: &str, from_name: &str) -> String {
    format!(
        "Hello {},\n\n{}\n\nPlease confirm that you received this message: {}\n\nBest regards,\n{}\n",
        name, expanded, link, from_name
    )
}

/// Composes the mail carrying an already expanded message.
pub fn compose_expanded_mail(
    name: &str,
    email: &str,
    expanded: &str,
    settings: &MailSettings,
) -> OutgoingMail {
    let name = name.trim();
    let email = email.trim();
    let link = confirmation_link(&settings.confirm_base_url, email);

    OutgoingMail {
        from_name: settings.from_name.clone(),
        from_address: settings.from_address.clone(),
        to_name: name.to_string(),
        to_address: email.to_string(),
        subject: settings.subject.clone(),
        text: render_text(name, expanded, &link, &settings.from_name),
        html: render_html(name, expanded, &link, &settings.from_name),
    }
}
