//! Calculator request and response model.
//!
//! Mirrors the JSON exchanged with the browser client: an encoded canvas
//! image plus variable bindings in, a list of recognised expressions out.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CalcResult;

/// Message carried by every successful response envelope.
pub const SUCCESS_MESSAGE: &str = "Image processed";

/// Caller supplied variable bindings, in the order the caller sent them.
pub type Variables = serde_json::Map<String, Value>;

/// Inbound request body for `POST /calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Data URI style string: `<media-type-prefix>,<base64-payload>`.
    pub image: String,
    #[serde(default)]
    pub dict_of_vars: Variables,
}

/// One recognised expression with its evaluated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionResult {
    #[serde(deserialize_with = "scalar_text")]
    pub expr: String,
    #[serde(deserialize_with = "scalar_text")]
    pub result: String,
    #[serde(default)]
    pub assign: bool,
}

impl ExpressionResult {
    pub fn new(expr: impl Into<String>, result: impl Into<String>, assign: bool) -> Self {
        Self {
            expr: expr.into(),
            result: result.into(),
            assign,
        }
    }
}

/// Response envelope; `status` discriminates success from failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisResponse {
    Success {
        message: String,
        data: Vec<ExpressionResult>,
    },
    Error {
        message: String,
    },
}

impl AnalysisResponse {
    pub fn success(data: Vec<ExpressionResult>) -> Self {
        Self::Success {
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<CalcResult<Vec<ExpressionResult>>> for AnalysisResponse {
    fn from(result: CalcResult<Vec<ExpressionResult>>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Accept a JSON string, or a number/boolean rendered as its JSON text.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Ok(v.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}
