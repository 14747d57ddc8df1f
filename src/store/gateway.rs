//! Remote data gateway seam

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::session::{Session, SessionHolder, StorageError};

/// One HTTP call per operation against the auth + REST service.
///
/// Every method returns the parsed response body verbatim; a non-2xx status
/// is not distinguished from success here. Callers interpret the shape.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        business_name: &str,
    ) -> Result<Value, GatewayError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, GatewayError>;

    async fn get_user(&self, token: &str) -> Result<Value, GatewayError>;

    async fn query_rows(
        &self,
        table: &str,
        session: &Session,
        filter: &Filter,
    ) -> Result<Value, GatewayError>;

    async fn insert_row(
        &self,
        table: &str,
        session: &Session,
        data: &Value,
    ) -> Result<Value, GatewayError>;

    async fn delete_row(
        &self,
        table: &str,
        session: &Session,
        id: &str,
    ) -> Result<Value, GatewayError>;

    /// Local only: the remote logout endpoint is not called.
    fn sign_out(&self, sessions: &SessionHolder) -> Result<(), StorageError> {
        sessions.clear()
    }
}

/// Equality filter on one column, sent as `column=eq.value`.
///
/// The value is kept raw and only encoded when the query string is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: &'static str,
    value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    /// Query-string pair with the operator folded into the value
    pub fn query_pair(&self) -> (&'static str, String) {
        (self.column, format!("eq.{}", self.value))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=eq.{}", self.column, self.value)
    }
}

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Pull a human-readable message out of an error payload, if the body is one.
///
/// Recognizes the shapes the auth and REST endpoints produce:
/// `{"error": {"message"}}`, `{"message"}`, `{"msg"}`,
/// `{"error_description"}` and `{"error": "..."}`.
pub fn error_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    if let Some(message) = object
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }

    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
