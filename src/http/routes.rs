//! HTTP route definitions

use axum::{
    extract::{Extension, Path, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Redirect, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::app::{AppState, ViewState};
use crate::auth::{self, AuthError, SignInRequest, SignUpOutcome, SignUpRequest};
use crate::dashboard::{self, DashboardError, LoadOutcome, Mutation, Tracked};
use crate::http::middleware::require_session;
use crate::session::{Session, SessionUser};
use crate::shell::{Page, ShellView};
use crate::store::{
    inventory, purchases, Draft, InventoryDraft, InventoryItem, Order, OrderDraft, OrderStatus,
    Purchase, PurchaseDraft, Record,
};
use crate::util::time::uptime_secs;

const LOGIN_PATH: &str = "/auth/login";
const DASHBOARD_PATH: &str = "/dashboard";

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .route("/auth/signup", post(sign_up_handler))
        .route("/auth/login", post(sign_in_handler))
        .route("/auth/logout", post(sign_out_handler))
        .route(DASHBOARD_PATH, get(dashboard_handler));

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/auth/user", get(user_handler))
        .route("/shell", get(shell_handler).put(select_page_handler))
        .route("/form-options", get(form_options_handler))
        .route(
            "/inventory",
            get(list_handler::<InventoryItem>).post(add_handler::<InventoryDraft>),
        )
        .route("/inventory/:id", delete(delete_handler::<InventoryItem>))
        .route(
            "/purchases",
            get(list_handler::<Purchase>).post(add_handler::<PurchaseDraft>),
        )
        .route("/purchases/:id", delete(delete_handler::<Purchase>))
        .route(
            "/orders",
            get(list_handler::<Order>).post(add_handler::<OrderDraft>),
        )
        .route("/orders/:id", delete(delete_handler::<Order>))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health and entry
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    signed_in: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        signed_in: state.sessions.has_token().unwrap_or(false),
    })
}

/// Send the visitor to the dashboard if a token is stored, otherwise to login
async fn root_handler(State(state): State<AppState>) -> Redirect {
    match state.sessions.has_token() {
        Ok(true) => Redirect::temporary(DASHBOARD_PATH),
        Ok(false) => Redirect::temporary(LOGIN_PATH),
        Err(e) => {
            warn!(error = %e, "Could not read stored session");
            Redirect::temporary(LOGIN_PATH)
        }
    }
}

// ============================================================================
// Auth endpoints
// ============================================================================

#[derive(Serialize)]
struct SignUpResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<SessionUser>,
}

async fn sign_up_handler(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    let outcome = auth::sign_up(state.gateway.as_ref(), &state.sessions, &req).await?;

    let response = match outcome {
        SignUpOutcome::ConfirmEmail => SignUpResponse {
            status: "confirm_email",
            user: None,
        },
        SignUpOutcome::SignedIn(session) => {
            state.view.lock().await.reset();
            SignUpResponse {
                status: "signed_in",
                user: Some(session.user),
            }
        }
    };
    Ok(Json(response))
}

#[derive(Serialize)]
struct SignInResponse {
    user: SessionUser,
}

async fn sign_in_handler(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let session = auth::sign_in(state.gateway.as_ref(), &state.sessions, &req).await?;
    state.view.lock().await.reset();
    Ok(Json(SignInResponse { user: session.user }))
}

#[derive(Serialize)]
struct SignOutResponse {
    success: bool,
}

async fn sign_out_handler(State(state): State<AppState>) -> Result<Json<SignOutResponse>, AppError> {
    auth::sign_out(state.gateway.as_ref(), &state.sessions)?;
    state.view.lock().await.reset();
    Ok(Json(SignOutResponse { success: true }))
}

async fn user_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let user = auth::current_user(state.gateway.as_ref(), &session).await?;
    Ok(Json(user))
}

// ============================================================================
// Dashboard and shell
// ============================================================================

/// Load (or reload) the dashboard and show the first page
async fn dashboard_handler(State(state): State<AppState>) -> Response {
    let outcome = dashboard::load(&state.sessions, state.gateway.as_ref()).await;

    let mut view = state.view.lock().await;
    view.reset();

    match outcome {
        LoadOutcome::Ready(workspace) => {
            let rendered = view.shell.render(&workspace);
            view.workspace = Some(workspace);
            Json(rendered).into_response()
        }
        LoadOutcome::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
    }
}

async fn shell_handler(State(state): State<AppState>) -> Result<Json<ShellView>, AppError> {
    let view = state.view.lock().await;
    let workspace = view.workspace.as_ref().ok_or(AppError::NotLoaded)?;
    Ok(Json(view.shell.render(workspace)))
}

#[derive(Deserialize)]
struct SelectPageRequest {
    page: String,
}

async fn select_page_handler(
    State(state): State<AppState>,
    Json(req): Json<SelectPageRequest>,
) -> Result<Json<ShellView>, AppError> {
    let page = req
        .page
        .parse::<Page>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut view = state.view.lock().await;
    let ViewState { shell, workspace } = &mut *view;
    let workspace = workspace.as_ref().ok_or(AppError::NotLoaded)?;

    shell.select(page);
    Ok(Json(shell.render(workspace)))
}

#[derive(Serialize)]
struct FormOptions {
    inventory_categories: &'static [&'static str],
    purchase_statuses: &'static [&'static str],
    order_statuses: [&'static str; 4],
}

/// Choices offered by the add forms
async fn form_options_handler() -> Json<FormOptions> {
    Json(FormOptions {
        inventory_categories: &inventory::CATEGORIES,
        purchase_statuses: &purchases::STATUSES,
        order_statuses: [
            OrderStatus::Pending.as_str(),
            OrderStatus::InProgress.as_str(),
            OrderStatus::Completed.as_str(),
            OrderStatus::Cancelled.as_str(),
        ],
    })
}

// ============================================================================
// Collection endpoints
// ============================================================================

async fn list_handler<T: Tracked>(State(state): State<AppState>) -> Result<Json<Vec<T>>, AppError> {
    let view = state.view.lock().await;
    let workspace = view.workspace.as_ref().ok_or(AppError::NotLoaded)?;
    Ok(Json(T::collection(workspace).records().to_vec()))
}

async fn add_handler<D>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(draft): Json<D>,
) -> Result<(StatusCode, Json<D::Row>), AppError>
where
    D: Draft,
    D::Row: Tracked,
{
    let mut view = state.view.lock().await;
    let workspace = view.workspace.as_mut().ok_or(AppError::NotLoaded)?;

    let row = <D::Row as Tracked>::collection_mut(workspace)
        .add(&draft, &session, state.gateway.as_ref())
        .await
        .map_err(|e| AppError::mutation(e, Mutation::Add, <D::Row as Record>::NOUN))?
        .clone();

    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Serialize)]
struct DeleteResponse {
    removed: usize,
}

async fn delete_handler<T: Tracked>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut view = state.view.lock().await;
    let workspace = view.workspace.as_mut().ok_or(AppError::NotLoaded)?;

    let removed = T::collection_mut(workspace)
        .delete(&id, &session, state.gateway.as_ref())
        .await
        .map_err(|e| AppError::mutation(e, Mutation::Delete, T::NOUN))?;

    Ok(Json(DeleteResponse { removed }))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Dashboard not loaded")]
    NotLoaded,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation problems are the caller's; anything else came from upstream
    fn mutation(err: DashboardError, mutation: Mutation, noun: &str) -> Self {
        let message = err.user_message(mutation, noun);
        if err.is_validation() {
            AppError::BadRequest(message)
        } else {
            warn!(error = %err, "Collection update failed");
            AppError::Upstream(message)
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PasswordMismatch => AppError::BadRequest(err.to_string()),
            AuthError::Rejected(message) => AppError::AuthFailed(message),
            AuthError::Gateway(e) => AppError::Upstream(e.to_string()),
            AuthError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::AuthFailed(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotLoaded => (
                StatusCode::CONFLICT,
                "Dashboard not loaded, open /dashboard first".to_string(),
            ),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = if status == StatusCode::UNAUTHORIZED {
            serde_json::json!({ "error": message, "redirect": LOGIN_PATH })
        } else {
            serde_json::json!({ "error": message })
        };

        (status, Json(body)).into_response()
    }
}
