use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What a handler hands back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Response {
    Text(String),
    Structured { summary: String, payload: Value },
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Response::Text(text.into())
    }

    pub fn structured(summary: impl Into<String>, payload: Value) -> Self {
        Response::Structured {
            summary: summary.into(),
            payload,
        }
    }

    /// Human-readable part of the response
    pub fn summary(&self) -> &str {
        match self {
            Response::Text(text) => text,
            Response::Structured { summary, .. } => summary,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Response::Text(_) => None,
            Response::Structured { payload, .. } => Some(payload),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}
