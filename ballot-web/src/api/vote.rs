//! Vote endpoint
//!
//! One vote per question per client, enforced through the voted-questions
//! cookie: the request is rejected before touching the tally when the cookie
//! already records the question, and the cookie is grown and re-set after a
//! counted vote. Clearing cookies lets a client vote again; that is the
//! accepted limit of this scheme.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use ballot_common::db::settings::get_vote_cookie_max_age_seconds;
use ballot_common::vote_token::VotedToken;

use crate::api::questions::load_question_detail;
use crate::cookies::{cookie_value, set_cookie, VOTED_COOKIE};
use crate::db::polls;
use crate::AppState;

/// Vote request: the chosen answer
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub choice_id: i64,
}

/// POST /api/questions/:id/vote
///
/// Control flow, in order: guard check against the cookie (409), choice
/// validation (404/400), atomic increment, cookie append, 200 with the
/// updated results payload.
pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<VoteRequest>,
) -> Result<Response, VoteError> {
    if polls::get_question(&state.db, question_id).await?.is_none() {
        return Err(VoteError::QuestionNotFound(question_id));
    }

    let token = VotedToken::parse(cookie_value(&headers, VOTED_COOKIE));
    if token.contains(question_id) {
        return Err(VoteError::AlreadyVoted(question_id));
    }

    let choice = polls::get_choice(&state.db, req.choice_id)
        .await?
        .ok_or(VoteError::ChoiceNotFound(req.choice_id))?;
    if choice.question_id != question_id {
        return Err(VoteError::ChoiceMismatch {
            choice_id: req.choice_id,
            question_id,
        });
    }

    if !polls::increment_vote(&state.db, req.choice_id).await? {
        // Choice deleted between validation and increment
        return Err(VoteError::ChoiceNotFound(req.choice_id));
    }

    let results = load_question_detail(&state.db, question_id)
        .await?
        .ok_or(VoteError::QuestionNotFound(question_id))?;

    let grown = token.append(question_id);
    let max_age = get_vote_cookie_max_age_seconds(&state.db).await?;
    let cookie = set_cookie(VOTED_COOKIE, grown.as_str(), max_age);

    Ok(([(SET_COOKIE, cookie)], Json(results)).into_response())
}

/// Vote error types for HTTP responses
#[derive(Debug)]
pub enum VoteError {
    AlreadyVoted(i64),
    QuestionNotFound(i64),
    ChoiceNotFound(i64),
    ChoiceMismatch { choice_id: i64, question_id: i64 },
    Database(String),
}

impl From<ballot_common::Error> for VoteError {
    fn from(err: ballot_common::Error) -> Self {
        VoteError::Database(err.to_string())
    }
}

impl IntoResponse for VoteError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            VoteError::AlreadyVoted(question_id) => (
                StatusCode::CONFLICT,
                format!("already voted on question {}", question_id),
            ),
            VoteError::QuestionNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("question {} not found", id))
            }
            VoteError::ChoiceNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("choice {} not found", id))
            }
            VoteError::ChoiceMismatch {
                choice_id,
                question_id,
            } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "choice {} does not belong to question {}",
                    choice_id, question_id
                ),
            ),
            VoteError::Database(msg) => (
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
