//! Supabase auth + REST client using the anonymous key and the session token

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::debug;

use super::gateway::{Filter, Gateway, GatewayError};
use crate::config::Config;
use crate::session::Session;

/// Supabase client for the dashboard's auth and table operations
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    /// Get the REST API URL for a table
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Get the auth API URL for a path
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Attach the API key and, if given, the bearer token
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let request = request.header("apikey", &self.anon_key);
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Filtered select on a table; the filter value is query-encoded
    fn select_request(&self, table: &str, token: &str, filter: &Filter) -> RequestBuilder {
        let request = self
            .client
            .get(self.rest_url(table))
            .query(&[filter.query_pair()]);
        self.authorize(request, Some(token))
    }

    fn delete_request(&self, table: &str, token: &str, id: &str) -> RequestBuilder {
        let request = self
            .client
            .delete(self.rest_url(table))
            .query(&[Filter::eq("id", id).query_pair()]);
        self.authorize(request, Some(token))
    }

    /// Send the request and parse whatever body comes back.
    ///
    /// The status code is only logged; an empty body parses as `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value, GatewayError> {
        let response = request.send().await.map_err(GatewayError::Request)?;
        let status = response.status();
        let body = response.text().await.map_err(GatewayError::Request)?;

        debug!(status = status.as_u16(), bytes = body.len(), "Supabase response");

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(GatewayError::Parse)
    }
}

#[async_trait]
impl Gateway for SupabaseClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        business_name: &str,
    ) -> Result<Value, GatewayError> {
        let body = json!({
            "email": email,
            "password": password,
            "user_metadata": { "business_name": business_name },
        });
        let request = self
            .client
            .post(self.auth_url("signup"))
            .header("Content-Type", "application/json")
            .json(&body);

        self.send(self.authorize(request, None)).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, GatewayError> {
        let request = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("Content-Type", "application/json")
            .json(&json!({ "email": email, "password": password }));

        self.send(self.authorize(request, None)).await
    }

    async fn get_user(&self, token: &str) -> Result<Value, GatewayError> {
        let request = self.client.get(self.auth_url("user"));
        self.send(self.authorize(request, Some(token))).await
    }

    async fn query_rows(
        &self,
        table: &str,
        session: &Session,
        filter: &Filter,
    ) -> Result<Value, GatewayError> {
        self.send(self.select_request(table, &session.access_token, filter))
            .await
    }

    async fn insert_row(
        &self,
        table: &str,
        session: &Session,
        data: &Value,
    ) -> Result<Value, GatewayError> {
        // PostgREST echoes the created rows as an array
        let request = self
            .client
            .post(self.rest_url(table))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(data);

        self.send(self.authorize(request, Some(session.access_token.as_str())))
            .await
    }

    async fn delete_row(
        &self,
        table: &str,
        session: &Session,
        id: &str,
    ) -> Result<Value, GatewayError> {
        self.send(self.delete_request(table, &session.access_token, id))
            .await
    }
}
