use axum::http::StatusCode;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// An `application/problem+json`-style error body.
#[derive(Debug, Clone)]
pub struct ProblemDetails {
    status: StatusCode,
    details: BTreeMap<Cow<'static, str>, Value>,
}

impl Serialize for ProblemDetails {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.details.len() + 1))?;
        map.serialize_entry("status", &self.status.as_u16())?;
        for (k, v) in &self.details {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl ProblemDetails {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            details: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, value: &str) -> Self {
        self.details
            .insert(Cow::Borrowed("title"), Value::String(value.to_string()));
        self
    }

    pub fn with_detail(mut self, value: &str) -> Self {
        self.details
            .insert(Cow::Borrowed("detail"), Value::String(value.to_string()));
        self
    }

    pub fn with_extension(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.details.insert(Cow::Owned(key.to_string()), value);
        self
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
