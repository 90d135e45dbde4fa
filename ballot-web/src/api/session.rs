//! Session authentication middleware
//!
//! Protected routes are layered with [`session_middleware`]: it reads the
//! session cookie, loads the unexpired session and its user, and stores a
//! [`CurrentUser`] in the request extensions for handlers to extract.
//! Requests without a valid session get 401 before reaching any handler.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::cookies::{cookie_value, SESSION_COOKIE};
use crate::db::{sessions, users};
use crate::AppState;

/// Authenticated user attached to the request by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Profile of the logged-in user
    pub user: ballot_common::db::models::User,
    /// Token of the session that authenticated this request
    pub session_token: String,
}

/// Session middleware for protected routes
///
/// Returns 401 when the cookie is missing, unknown, or expired.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionError> {
    let token = cookie_value(request.headers(), SESSION_COOKIE)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .ok_or(SessionError::MissingSession)?;

    let session = sessions::find_valid_session(&state.db, &token)
        .await
        .map_err(|e| SessionError::Database(e.to_string()))?
        .ok_or(SessionError::InvalidSession)?;

    let user = users::get_user(&state.db, &session.user_guid)
        .await
        .map_err(|e| SessionError::Database(e.to_string()))?
        .ok_or_else(|| {
            // Cascade delete should make this unreachable
            warn!("session {} references missing user", session.token);
            SessionError::InvalidSession
        })?;

    request.extensions_mut().insert(CurrentUser {
        user,
        session_token: session.token,
    });

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum SessionError {
    MissingSession,
    InvalidSession,
    Database(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SessionError::MissingSession => {
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }
            SessionError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                "Session expired or invalid".to_string(),
            ),
            SessionError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
