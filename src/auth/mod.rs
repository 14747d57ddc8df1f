//! Sign-up, sign-in and sign-out flows on top of the gateway

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::session::{Session, SessionHolder, StorageError};
use crate::store::{error_message, Gateway, GatewayError};

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub repeat_password: String,
    pub business_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// What happened after a successful sign-up
#[derive(Debug)]
pub enum SignUpOutcome {
    /// Account created; the user must confirm their email before signing in
    ConfirmEmail,
    /// Confirmation is disabled remotely and a session was issued and saved
    SignedIn(Session),
}

/// Create an account. Passwords are compared before anything is sent.
pub async fn sign_up(
    gateway: &dyn Gateway,
    sessions: &SessionHolder,
    request: &SignUpRequest,
) -> Result<SignUpOutcome, AuthError> {
    if request.password != request.repeat_password {
        return Err(AuthError::PasswordMismatch);
    }

    let body = gateway
        .sign_up(&request.email, &request.password, &request.business_name)
        .await?;

    if let Some(message) = rejection(&body) {
        return Err(AuthError::Rejected(message));
    }

    match Session::from_auth_response(&body) {
        Some(session) => {
            sessions.save(&session)?;
            info!(user_id = %session.user.id, "Signed up and signed in");
            Ok(SignUpOutcome::SignedIn(session))
        }
        None => {
            info!(email = %request.email, "Signed up, awaiting email confirmation");
            Ok(SignUpOutcome::ConfirmEmail)
        }
    }
}

/// Exchange credentials for a session and store it
pub async fn sign_in(
    gateway: &dyn Gateway,
    sessions: &SessionHolder,
    request: &SignInRequest,
) -> Result<Session, AuthError> {
    let body = gateway.sign_in(&request.email, &request.password).await?;

    let session = Session::from_auth_response(&body).ok_or_else(|| {
        AuthError::Rejected(
            error_message(&body).unwrap_or_else(|| "Invalid login credentials".to_string()),
        )
    })?;

    sessions.save(&session)?;
    info!(user_id = %session.user.id, "Signed in");
    Ok(session)
}

pub fn sign_out(gateway: &dyn Gateway, sessions: &SessionHolder) -> Result<(), AuthError> {
    gateway.sign_out(sessions)?;
    info!("Signed out");
    Ok(())
}

/// Current user as the auth service sees the stored token
pub async fn current_user(gateway: &dyn Gateway, session: &Session) -> Result<Value, AuthError> {
    let body = gateway.get_user(&session.access_token).await?;
    if body.get("id").is_none() {
        if let Some(message) = error_message(&body) {
            return Err(AuthError::Rejected(message));
        }
    }
    Ok(body)
}

/// Error payloads from the signup endpoint carry no `id` and a message
fn rejection(body: &Value) -> Option<String> {
    if body.get("id").is_some() || body.get("user").is_some() {
        return None;
    }
    error_message(body)
}

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
