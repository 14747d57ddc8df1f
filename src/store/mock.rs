//! In-memory gateway for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::gateway::{Filter, Gateway, GatewayError};
use crate::session::Session;

/// Gateway double that serves canned bodies and records every call.
///
/// Queries return the rows set with `set_rows` (or `[]`). Inserts echo the
/// payload with a generated id unless a response is set. Tables marked with
/// `fail_table` answer with a body that is not JSON; tables marked with
/// `unreachable_table` fail before any response arrives.
#[derive(Default)]
pub struct MockGateway {
    rows: Mutex<HashMap<String, Value>>,
    insert_responses: Mutex<HashMap<String, Value>>,
    delete_response: Mutex<Option<Value>>,
    auth_response: Mutex<Option<Value>>,
    failing: Mutex<HashMap<String, Failure>>,
    calls: Mutex<Vec<String>>,
}

#[derive(Clone, Copy)]
enum Failure {
    Garbled,
    Unreachable,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rows(&self, table: &str, rows: Value) {
        self.rows.lock().insert(table.to_string(), rows);
    }

    pub fn set_insert_response(&self, table: &str, body: Value) {
        self.insert_responses.lock().insert(table.to_string(), body);
    }

    pub fn set_delete_response(&self, body: Value) {
        *self.delete_response.lock() = Some(body);
    }

    pub fn set_auth_response(&self, body: Value) {
        *self.auth_response.lock() = Some(body);
    }

    pub fn fail_table(&self, table: &str) {
        self.failing.lock().insert(table.to_string(), Failure::Garbled);
    }

    pub fn unreachable_table(&self, table: &str) {
        self.failing
            .lock()
            .insert(table.to_string(), Failure::Unreachable);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn check(&self, table: &str) -> Result<(), GatewayError> {
        let failure = self.failing.lock().get(table).copied();
        match failure {
            Some(Failure::Garbled) => {
                let source = serde_json::from_str::<Value>("<html>502 Bad Gateway</html>")
                    .expect_err("mock failure body must not parse");
                Err(GatewayError::Parse(source))
            }
            Some(Failure::Unreachable) => {
                let source = reqwest::Client::new()
                    .get("not a url")
                    .build()
                    .expect_err("mock request must not build");
                Err(GatewayError::Request(source))
            }
            None => Ok(()),
        }
    }

    fn auth_body(&self) -> Value {
        self.auth_response.lock().clone().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _business_name: &str,
    ) -> Result<Value, GatewayError> {
        self.record(format!("sign_up {}", email));
        self.check("auth")?;
        Ok(self.auth_body())
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Value, GatewayError> {
        self.record(format!("sign_in {}", email));
        self.check("auth")?;
        Ok(self.auth_body())
    }

    async fn get_user(&self, _token: &str) -> Result<Value, GatewayError> {
        self.record("get_user".to_string());
        self.check("auth")?;
        Ok(self.auth_body())
    }

    async fn query_rows(
        &self,
        table: &str,
        _session: &Session,
        filter: &Filter,
    ) -> Result<Value, GatewayError> {
        self.record(format!("query {}?{}", table, filter));
        self.check(table)?;
        Ok(self.rows.lock().get(table).cloned().unwrap_or_else(|| json!([])))
    }

    async fn insert_row(
        &self,
        table: &str,
        _session: &Session,
        data: &Value,
    ) -> Result<Value, GatewayError> {
        let n = self.call_count();
        self.record(format!("insert {}", table));
        self.check(table)?;

        if let Some(body) = self.insert_responses.lock().get(table) {
            return Ok(body.clone());
        }

        let mut row = data.clone();
        if let Some(object) = row.as_object_mut() {
            object.insert("id".to_string(), json!(format!("{}-{}", table, n)));
        }
        Ok(json!([row]))
    }

    async fn delete_row(
        &self,
        table: &str,
        _session: &Session,
        id: &str,
    ) -> Result<Value, GatewayError> {
        self.record(format!("delete {}?id=eq.{}", table, id));
        self.check(table)?;
        Ok(self.delete_response.lock().clone().unwrap_or(Value::Null))
    }
}
