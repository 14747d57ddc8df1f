//! Session gate for routes that call the gateway on the user's behalf

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::routes::AppError;
use crate::app::AppState;
use crate::session::Session;

/// Middleware to require a stored session.
///
/// The session is read from storage on every request and handed to the
/// handler as an extension; there is no ambient token lookup past this point.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = match state.sessions.read() {
        Ok(Some(session)) => session,
        Ok(None) => return Err(AppError::Unauthorized),
        Err(e) => {
            warn!(error = %e, "Could not read stored session");
            return Err(AppError::Unauthorized);
        }
    };

    request.extensions_mut().insert::<Session>(session);

    Ok(next.run(request).await)
}
