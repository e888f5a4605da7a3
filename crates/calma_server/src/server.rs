use crate::error::ApiError;
use crate::types::{
    normalize_email, CheckInRequest, CheckInResponse, CompleteResponse, HistoryParams,
    HistoryResponse, LoginRequest, LoginResponse, VerifyRequest, VerifyResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use calma_core::{
    config::AuthConfig, AuthStore, CalmaStore, CheckIn, Feeling, HistoryStore, MoodSummary,
    RelaxationSession, Severity,
};
use calma_engine::select_experience;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

const MAX_NOTE_CHARS: usize = 500;

/// Shared state for the API.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn CalmaStore>,
    auth: AuthConfig,
}

/// Build the API router over a store. Used directly by tests; the binary
/// goes through [`ApiServer`].
pub fn router(store: Arc<dyn CalmaStore>, auth: AuthConfig) -> Router {
    let state = AppState { store, auth };
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/verify", post(verify))
        .route("/checkin", post(check_in))
        .route("/history", get(history))
        .route("/sessions/:id", get(session_detail))
        .route("/sessions/:id/complete", post(complete_session))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The Calma HTTP server.
///
/// - `POST /auth/login` + `POST /auth/verify` — login-token auth flow
/// - `POST /checkin` — run the engine, persist, return the experience
/// - `GET /history`, `GET /sessions/{id}`, `POST /sessions/{id}/complete`,
///   `GET /stats` — history tracking
/// - `GET /health` — health check
pub struct ApiServer {
    store: Arc<dyn CalmaStore>,
    auth: AuthConfig,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(store: Arc<dyn CalmaStore>, auth: AuthConfig, host: &str, port: u16) -> Self {
        Self {
            store,
            auth,
            host: host.to_string(),
            port,
        }
    }

    /// Start the server. Spawns a background task and returns its handle.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let app = router(self.store, self.auth);
        let addr = format!("{}:{}", self.host, self.port);

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("API server failed to bind {}: {}", addr, e);
                    return;
                }
            };
            tracing::info!("API server listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("API server error: {}", e);
            }
        })
    }
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect()
}

/// Resolve the bearer token from `Authorization` to a user id.
async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    state
        .store
        .resolve_api_session(token)
        .await?
        .ok_or(ApiError::Unauthorized)
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// POST /auth/login — issue a short-lived single-use login token.
///
/// The token is delivered out-of-band (here: the server log). Dev setups can
/// set `expose_login_token` to get it echoed in the response instead.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&req.email)
        .ok_or_else(|| ApiError::InvalidInput("invalid email address".to_string()))?;

    let token = new_token();
    let ttl_secs = state.auth.login_token_ttl_mins as i64 * 60;
    state.store.issue_login_token(&email, &token, ttl_secs).await?;

    tracing::info!(email = %email, token = %token, "login token issued");

    Ok(Json(LoginResponse {
        message: format!("login token issued for {}", email),
        token: state.auth.expose_login_token.then_some(token),
    }))
}

/// POST /auth/verify — exchange a login token for a bearer session.
async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let email = normalize_email(&req.email)
        .ok_or_else(|| ApiError::InvalidInput("invalid email address".to_string()))?;

    if !state.store.consume_login_token(&email, &req.token).await? {
        return Err(ApiError::Unauthorized);
    }

    let user_id = state.store.upsert_user_by_email(&email).await?;
    let token = new_token();
    let expires_in_secs = state.auth.session_ttl_hours as i64 * 3600;
    state
        .store
        .create_api_session(user_id, &token, expires_in_secs)
        .await?;

    tracing::info!(user = %user_id, "session created");

    Ok(Json(VerifyResponse {
        token,
        expires_in_secs,
    }))
}

/// POST /checkin — validate, run the engine, persist, return the bundle.
async fn check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let user_id = require_user(&state, &headers).await?;

    let feeling: Feeling = req
        .feeling
        .parse()
        .map_err(|e: calma_core::CalmaError| ApiError::InvalidInput(e.to_string()))?;
    let severity = Severity::new(req.severity)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let note = match req.note.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(n) if n.chars().count() > MAX_NOTE_CHARS => {
            return Err(ApiError::InvalidInput(format!(
                "note longer than {} characters",
                MAX_NOTE_CHARS
            )));
        }
        Some(n) => Some(n.to_string()),
    };

    let experience =
        select_experience(feeling, severity).map_err(|e| ApiError::Internal(e.into()))?;
    let record = CheckIn::new(user_id, feeling, severity, note);
    let session = state.store.record_session(&record, &experience).await?;

    Ok(Json(CheckInResponse {
        session_id: session.id,
        check_in: session.check_in,
        experience: session.experience,
    }))
}

/// GET /history — newest-first sessions for the caller.
async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user_id = require_user(&state, &headers).await?;
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let sessions = state.store.history(user_id, limit).await?;
    Ok(Json(HistoryResponse { sessions }))
}

/// GET /sessions/{id} — one session. 404 covers both "absent" and "not
/// yours" so ids of other users are not probeable.
async fn session_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
) -> Result<Json<RelaxationSession>, ApiError> {
    let user_id = require_user(&state, &headers).await?;
    let session = state
        .store
        .session_by_id(user_id, session_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(session))
}

/// POST /sessions/{id}/complete — idempotent completion marker.
async fn complete_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let user_id = require_user(&state, &headers).await?;
    let completed_at = state
        .store
        .mark_completed(user_id, session_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(CompleteResponse {
        session_id,
        completed_at,
    }))
}

/// GET /stats — aggregates over the caller's history.
async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MoodSummary>, ApiError> {
    let user_id = require_user(&state, &headers).await?;
    let summary = state.store.summary(user_id).await?;
    Ok(Json(summary))
}
