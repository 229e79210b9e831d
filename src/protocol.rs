use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// Body of `POST /api/execute-command`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExecuteCommandRequest<'a> {
    pub command: &'a str,
}

/// The two fields the form consumes from the endpoint's reply.
///
/// Either may be missing; a missing `status` means the outcome panel has no
/// category and a missing `message` renders as blank text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResponse {
    pub status: Option<String>,
    pub message: Option<String>,
}

/// How strictly a reply body is checked before it becomes a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSchema {
    /// Accept any JSON value and pick out whatever fields are there.
    #[default]
    Lenient,
    /// Require an object with string `status` and `message`.
    Strict,
}

impl FromStr for ResponseSchema {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(ResponseSchema::Lenient),
            "strict" => Ok(ResponseSchema::Strict),
            _ => Err(anyhow::anyhow!("Unknown response schema '{}'. Use 'lenient' or 'strict'", s)),
        }
    }
}

impl fmt::Display for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSchema::Lenient => write!(f, "lenient"),
            ResponseSchema::Strict => write!(f, "strict"),
        }
    }
}

impl CommandResponse {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            message: Some(message.into()),
        }
    }

    /// Decodes a raw reply body according to `schema`.
    ///
    /// `Ok(None)` is a blank reply (`null`, `false`, `0` or `""`), which leaves
    /// nothing to show.
    pub fn decode(body: &[u8], schema: ResponseSchema) -> Result<Option<Self>, TransportError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value, schema)
    }

    pub fn from_value(value: &Value, schema: ResponseSchema) -> Result<Option<Self>, TransportError> {
        match schema {
            ResponseSchema::Lenient if is_blank(value) => Ok(None),
            ResponseSchema::Lenient => Ok(Some(Self {
                status: lenient_field(value, "status"),
                message: lenient_field(value, "message"),
            })),
            ResponseSchema::Strict => Ok(Some(Self {
                status: Some(strict_field(value, "status")?),
                message: Some(strict_field(value, "message")?),
            })),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn lenient_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn strict_field(value: &Value, key: &str) -> Result<String, TransportError> {
    match value.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(TransportError::Schema(format!(
            "field '{}' must be a string, got {}",
            key, other
        ))),
        None => Err(TransportError::Schema(format!("missing field '{}'", key))),
    }
}
