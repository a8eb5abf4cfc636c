//!
//! noteworks HTTP/WS server
//! ------------------------
//! This module defines the Axum-based HTTP API and the WebSocket
//! upgrade endpoint for the realtime note-sync channel.
//!
//! Responsibilities:
//! - Session cookie handling (issue on signup/login, clear on
//!   logout/expiry).
//! - Signup/login endpoints backed by the `security` module.
//! - Note listing/creation/deletion delegating to the repository
//!   adapter, gated on an authenticated identity.
//! - WebSocket endpoint handing authenticated connections to the
//!   realtime session loop.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::identity::gate::{AccessGate, AuthOutcome, SESSION_COOKIE};
use crate::identity::session::SessionManager;
use crate::model::{LoginPayload, NoteDraft, SignupPayload, User};
use crate::repo::NoteRepository;
use crate::security;
use crate::store::SharedStore;

/// Shared server state injected into all handlers. Every component
/// gets its store handle explicitly at construction; there is no
/// ambient global.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub sessions: SessionManager,
    pub gate: AccessGate,
    pub repo: NoteRepository,
    pub ws_idle_timeout: Option<Duration>,
    cookie_max_age_secs: i64,
}

impl AppState {
    pub fn new(store: SharedStore, config: &Config) -> Self {
        let sessions = SessionManager::new(store.clone(), config.session_ttl_days);
        Self {
            gate: AccessGate::new(sessions.clone()),
            repo: NoteRepository::new(store.clone()),
            sessions,
            store,
            ws_idle_timeout: config.ws_idle_timeout(),
            cookie_max_age_secs: config.cookie_max_age_secs(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/user", get(current_user))
        .route("/api/logout", get(logout))
        .route("/api/notes", get(notes_index))
        .route("/api/note", post(new_note))
        .route("/api/note/{id}", delete(delete_note))
        .route("/api/notes/socket", get(notes_socket))
        .with_state(state)
}

/// Start the server with configuration taken from the environment.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::from_env()).await
}

pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(SharedStore::new(), &config);
    let app = router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn set_session_cookie(token: &str, max_age_secs: i64) -> HeaderValue {
    // Script-inaccessible cookie, Lax so top-level navigations keep it
    HeaderValue::from_str(&format!(
        "{}={}; Max-Age={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, token, max_age_secs
    ))
    .unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE
    ))
    .unwrap()
}

/// Run the access gate. Protected handlers bail out here before any
/// other side effect; an expired session also gets its stale cookie
/// cleared.
fn require_identity(state: &AppState, headers: &HeaderMap) -> Result<User, Response> {
    match state.gate.authenticate(headers) {
        AuthOutcome::Authenticated(user) => Ok(user),
        AuthOutcome::Denied { expired } => {
            let mut h = HeaderMap::new();
            if expired {
                h.insert("Set-Cookie", clear_session_cookie());
            }
            Err((StatusCode::UNAUTHORIZED, h, "").into_response())
        }
    }
}

/// 200 with the user (sans password) and a fresh session cookie.
fn issue_session_response(state: &AppState, user: User) -> Response {
    let token = match state.sessions.create(&user.email) {
        Ok(t) => t,
        Err(e) => {
            error!("session persist failed: {e}");
            return AppError::Internal(e).into_response();
        }
    };
    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", set_session_cookie(&token, state.cookie_max_age_secs));
    (StatusCode::OK, headers, Json(user)).into_response()
}

async fn signup(State(state): State<AppState>, Json(payload): Json<SignupPayload>) -> Response {
    let password_hash = match security::hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!("password hash failed: {e}");
            return AppError::Internal(e).into_response();
        }
    };
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        email: payload.email.clone(),
        password_hash,
    };
    match state.store.insert_user_if_absent(user) {
        Ok(Some(user)) => issue_session_response(&state, user),
        Ok(None) => AppError::Conflict(format!(
            "user with email {} already exists",
            payload.email
        ))
        .into_response(),
        Err(e) => {
            error!("signup persist failed: {e}");
            AppError::Internal(e).into_response()
        }
    }
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> Response {
    let user = match state.store.find_user_by_email(&payload.email) {
        Ok(Some(u)) => u,
        Ok(None) => return AppError::NotFound.into_response(),
        Err(e) => {
            error!("login lookup failed: {e}");
            return AppError::Internal(e).into_response();
        }
    };
    if !security::verify_password(&user.password_hash, &payload.password) {
        return AppError::Forbidden.into_response();
    }
    issue_session_response(&state, user)
}

async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match require_identity(&state, &headers) {
        Ok(user) => Json(user).into_response(),
        Err(resp) => resp,
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_identity(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if let Err(e) = state.sessions.invalidate(&user.email) {
        error!("logout failed: {e}");
        return AppError::Internal(e).into_response();
    }
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_session_cookie());
    (h, Redirect::to("/")).into_response()
}

async fn notes_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_identity(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match state.repo.list_by_owner(&user) {
        Ok(groups) => Json(groups).into_response(),
        Err(e) => {
            error!("notes listing failed: {e}");
            e.into_response()
        }
    }
}

async fn new_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<NoteDraft>,
) -> Response {
    let user = match require_identity(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match state.repo.create_note(&user, draft) {
        Ok(note) => Json(note).into_response(),
        Err(e) => {
            error!("note creation failed: {e}");
            e.into_response()
        }
    }
}

async fn delete_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let user = match require_identity(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match state.repo.delete_note(&user, &id) {
        // deleted id echoed as plain text
        Ok(deleted_id) => (StatusCode::OK, deleted_id).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn notes_socket(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    // Authenticate exactly once, at upgrade time. The identity is
    // fixed for the connection's whole lifetime.
    let user = match require_identity(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let store = state.store.clone();
    let idle = state.ws_idle_timeout;
    ws.on_upgrade(move |socket| crate::realtime::run_session(socket, user, store, idle))
}
