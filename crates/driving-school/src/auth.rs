//! Session gate in front of the back office.
//!
//! Credentials are checked by the hosted identity provider; this module only
//! turns its error codes into user-facing messages and decides what a screen
//! may render while the session is resolving. Behind an authenticating proxy the
//! resolved user arrives in the `x-forwarded-user` / `x-forwarded-email` headers.

use axum::{
    extract::{Query, Request},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub const SESSION_USER_HEADER: &str = "x-forwarded-user";
pub const SESSION_EMAIL_HEADER: &str = "x-forwarded-email";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthFailure {
    #[error("Incorrect email or password.")]
    BadCredentials,
    #[error("The email address is not valid.")]
    MalformedEmail,
    #[error("Email sign-in is not enabled for this project.")]
    MethodDisabled,
    #[error("Unexpected sign-in error ({code}).")]
    Unexpected { code: String },
}

impl AuthFailure {
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "auth/user-not-found" | "auth/wrong-password" | "auth/invalid-credential" => {
                Self::BadCredentials
            }
            "auth/invalid-email" => Self::MalformedEmail,
            "auth/operation-not-allowed" => Self::MethodDisabled,
            other => Self::Unexpected {
                code: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// What the provider has reported about the current session so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    /// True until the provider has answered once.
    pub loading: bool,
}

impl SessionState {
    pub fn resolving() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Session as reported by the proxy in front of the API. The proxy answers
    /// before forwarding, so this state is never still loading.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        match header(SESSION_USER_HEADER) {
            Some(uid) => Self::signed_in(SessionUser {
                uid,
                email: header(SESSION_EMAIL_HEADER),
            }),
            None => Self::signed_out(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Wait,
    Allow,
    RedirectToLogin,
}

pub fn guard(session: &SessionState) -> GuardDecision {
    match (session.loading, &session.user) {
        (true, _) => GuardDecision::Wait,
        (false, Some(_)) => GuardDecision::Allow,
        (false, None) => GuardDecision::RedirectToLogin,
    }
}

/// Route layer for the office API. Allowed requests carry the [`SessionUser`]
/// as an extension.
pub async fn require_session(mut request: Request, next: Next) -> Response {
    let session = SessionState::from_headers(request.headers());
    match guard(&session) {
        GuardDecision::Allow => {
            if let Some(user) = session.user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        GuardDecision::RedirectToLogin => {
            debug!(path = %request.uri().path(), "request without a session");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "sign in required", "login": LOGIN_PATH })),
            )
                .into_response()
        }
        GuardDecision::Wait => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "session is still resolving" })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FailureQuery {
    code: String,
}

/// Message lookup for the login screen. Never behind [`require_session`].
pub fn auth_router() -> Router {
    Router::new().route("/api/v1/auth/failure", get(failure_handler))
}

pub(crate) async fn failure_handler(Query(query): Query<FailureQuery>) -> Response {
    let failure = AuthFailure::from_provider_code(query.code.trim());
    let mut body = serde_json::to_value(&failure).unwrap_or_default();
    if let Some(fields) = body.as_object_mut() {
        fields.insert("message".to_string(), failure.to_string().into());
    }
    (StatusCode::OK, Json(body)).into_response()
}
