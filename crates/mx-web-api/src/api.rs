use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// Request fields stay loosely typed so type errors surface as field
// violations instead of body rejections.

#[derive(Deserialize, ToSchema, Clone, Debug, Default)]
pub struct ExpandMessageRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "running late, start without me")]
    pub message: Option<Value>,
}

#[derive(Deserialize, ToSchema, Clone, Debug, Default)]
pub struct SendEmailRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub name: Option<Value>,
    #[serde(default)]
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: Option<Value>,
    #[serde(default)]
    #[schema(value_type = String, example = "running late, start without me")]
    pub message: Option<Value>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
pub struct ExpandMessageResponse {
    pub original: String,
    pub expanded: String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    pub expanded_message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    #[schema(example = "Email sent successfully!")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
