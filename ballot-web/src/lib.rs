//! ballot-web library - Poll web service
//!
//! JSON HTTP API for user accounts (register, login, profile, password
//! change, deletion) and polls (create, paginated listing, vote, results).
//! Single-vote-per-question enforcement rides on a client cookie; login
//! sessions are opaque tokens stored in the database.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod cookies;
pub mod db;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// Account management and poll creation/voting require a login session;
/// registration, login, listings, results, health and buildinfo do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    // Protected routes (require a valid session cookie)
    let protected = Router::new()
        .route("/api/account/logout", post(api::logout))
        .route("/api/account/profile", get(api::get_profile))
        .route("/api/account/profile", put(api::update_profile))
        .route("/api/account/password", post(api::change_password))
        .route("/api/account", delete(api::delete_account))
        .route("/api/questions/create", post(api::create_question))
        .route("/api/questions/:id/vote", post(api::vote))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    // Public routes (no session required)
    let public = Router::new()
        .route("/api/account/register", post(api::register))
        .route("/api/account/login", post(api::login))
        .route("/api/questions", get(api::list_questions))
        .route("/api/questions/:id", get(api::question_detail))
        .route("/api/questions/:id/results", get(api::question_results))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
