use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are a helpful writing assistant. Expand the short message you are given \
into a longer, clear and well-written message. Preserve the original intent, tone and language. \
Reply with the expanded message only, without any introduction or explanation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// The system + user message pair sent for one expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn expand(message: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("Expand the following message: {}", message),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: Role::System,
                content: self.system.clone(),
            },
            ChatMessage {
                role: Role::User,
                content: self.user.clone(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_prompt_embeds_message() {
        let prompt = Prompt::expand("see you at 5");
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert_eq!(prompt.user, "Expand the following message: see you at 5");
    }

    #[test]
    fn test_messages_order_and_roles() {
        let messages = Prompt::expand("hi").messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.ends_with("hi"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::System).unwrap();
        assert_eq!(json, "\"system\"");
    }
}
