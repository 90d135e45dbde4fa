//! Account management endpoints
//!
//! Registration, login/logout, profile view/update, password change and
//! account deletion. Field rules follow the registration form: a username
//! (unique login identifier), a display name of at least 2 characters, a
//! plausible email, a password of at least 8 characters entered twice, and
//! an optional ISO birthday.

use axum::{
    extract::{Extension, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use ballot_common::auth::{verify_password, MIN_PASSWORD_LEN};
use ballot_common::db::models::User;
use ballot_common::db::settings::get_session_timeout_seconds;

use crate::api::session::CurrentUser;
use crate::cookies::{clear_cookie, set_cookie, SESSION_COOKIE};
use crate::db::users::NewUser;
use crate::db::{sessions, users};
use crate::AppState;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    pub email: String,
    pub birthday: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub birthday: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Profile payload returned by register, login and the profile endpoints
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub guid: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub birthday: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            guid: user.guid,
            username: user.username,
            name: user.name,
            email: user.email,
            birthday: user.birthday,
        }
    }
}

/// POST /api/account/register
///
/// Creates the account and returns the profile. The new user is not logged
/// in; call login next.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AccountError> {
    let username = req.username.trim();
    let name = req.name.trim();
    let email = req.email.trim();
    let birthday = normalize_birthday(req.birthday.as_deref());

    validate_username(username).map_err(AccountError::Validation)?;
    validate_name(name).map_err(AccountError::Validation)?;
    validate_email(email).map_err(AccountError::Validation)?;
    validate_password_pair(&req.password, &req.password_confirm)
        .map_err(AccountError::Validation)?;
    validate_birthday(birthday).map_err(AccountError::Validation)?;

    let new_user = NewUser {
        username,
        password: &req.password,
        name,
        email,
        birthday,
    };

    let user = users::create_user(&state.db, &new_user)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::UsernameTaken(username.to_string())
            } else {
                AccountError::from(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/account/login
///
/// Verifies the credentials, creates a session row and sets the session
/// cookie. Unknown username and wrong password are indistinguishable in the
/// response.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AccountError> {
    let auth = users::find_auth_by_username(&state.db, req.username.trim())
        .await?
        .ok_or(AccountError::InvalidCredentials)?;

    if !verify_password(&req.password, &auth.password_salt, &auth.password_hash) {
        return Err(AccountError::InvalidCredentials);
    }

    let timeout = get_session_timeout_seconds(&state.db).await?;
    let session = sessions::create_session(&state.db, &auth.user.guid, timeout).await?;

    let cookie = set_cookie(SESSION_COOKIE, &session.token, timeout);
    let profile: ProfileResponse = auth.user.into();

    Ok(([(SET_COOKIE, cookie)], Json(profile)).into_response())
}

/// POST /api/account/logout
///
/// Deletes the session row and expires the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, AccountError> {
    sessions::delete_session(&state.db, &current.session_token).await?;

    let cookie = clear_cookie(SESSION_COOKIE);
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

/// GET /api/account/profile
pub async fn get_profile(
    Extension(current): Extension<CurrentUser>,
) -> Json<ProfileResponse> {
    Json(current.user.into())
}

/// PUT /api/account/profile
///
/// Updates name, email and birthday. The username is fixed at registration.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AccountError> {
    let name = req.name.trim();
    let email = req.email.trim();
    let birthday = normalize_birthday(req.birthday.as_deref());

    validate_name(name).map_err(AccountError::Validation)?;
    validate_email(email).map_err(AccountError::Validation)?;
    validate_birthday(birthday).map_err(AccountError::Validation)?;

    users::update_profile(&state.db, &current.user.guid, name, email, birthday).await?;

    Ok(Json(ProfileResponse {
        guid: current.user.guid,
        username: current.user.username,
        name: name.to_string(),
        email: email.to_string(),
        birthday: birthday.map(|s| s.to_string()),
    }))
}

/// POST /api/account/password
///
/// Requires the current password, re-salts and re-hashes the new one, and
/// logs every OTHER session of the user out. The session that made the
/// change stays alive.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AccountError> {
    let (stored_hash, stored_salt) = users::get_credentials(&state.db, &current.user.guid)
        .await?
        .ok_or(AccountError::NotFound)?;

    if !verify_password(&req.current_password, &stored_salt, &stored_hash) {
        return Err(AccountError::Validation(
            "current password is incorrect".to_string(),
        ));
    }

    validate_password_pair(&req.new_password, &req.new_password_confirm)
        .map_err(AccountError::Validation)?;

    users::update_password(&state.db, &current.user.guid, &req.new_password).await?;
    sessions::delete_other_sessions(&state.db, &current.user.guid, &current.session_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/account
///
/// Deletes the user; sessions cascade. Questions and choices are not owned
/// by users and survive. The session cookie is expired.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, AccountError> {
    let deleted = users::delete_user(&state.db, &current.user.guid).await?;
    if !deleted {
        return Err(AccountError::NotFound);
    }

    let cookie = clear_cookie(SESSION_COOKIE);
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

/// Empty-string birthday counts as absent (HTML forms send "")
fn normalize_birthday(birthday: Option<&str>) -> Option<&str> {
    birthday.map(str::trim).filter(|s| !s.is_empty())
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("username must not be empty".to_string());
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.chars().count() < 2 {
        return Err("name must be at least 2 characters".to_string());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err("email address is not valid".to_string());
    }
    Ok(())
}

fn validate_password_pair(password: &str, confirm: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password != confirm {
        return Err("passwords do not match".to_string());
    }
    Ok(())
}

fn validate_birthday(birthday: Option<&str>) -> Result<(), String> {
    if let Some(s) = birthday {
        if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
            return Err("birthday must be an ISO date (YYYY-MM-DD)".to_string());
        }
    }
    Ok(())
}

fn is_unique_violation(err: &ballot_common::Error) -> bool {
    match err {
        ballot_common::Error::Database(sqlx::Error::Database(db_err)) => {
            db_err.is_unique_violation()
        }
        _ => false,
    }
}

/// Account error types for HTTP responses
#[derive(Debug)]
pub enum AccountError {
    Validation(String),
    UsernameTaken(String),
    InvalidCredentials,
    NotFound,
    Database(String),
}

impl From<ballot_common::Error> for AccountError {
    fn from(err: ballot_common::Error) -> Self {
        AccountError::Database(err.to_string())
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AccountError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AccountError::UsernameTaken(username) => (
                StatusCode::CONFLICT,
                format!("username '{}' is already taken", username),
            ),
            AccountError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid username or password".to_string(),
            ),
            AccountError::NotFound => (StatusCode::NOT_FOUND, "user not found".to_string()),
            AccountError::Database(msg) => (
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
