//! Question listing, detail, results and creation endpoints
//!
//! The listing shows `page_size` questions per page (newest first) and pager
//! metadata for a bounded group of page links. A page beyond the last is
//! reported as 404, mirroring how a browser URL with a stale page number
//! should behave; it is never silently clamped.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use ballot_common::db::models::{Choice, Question};
use ballot_common::db::settings::{get_page_group_size, get_page_size};
use ballot_common::paging::{page_window, PagingError};

use crate::db::polls;
use crate::AppState;

/// Query parameters for the question listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// Question listing response with pager metadata
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub questions: Vec<Question>,
    pub page: u32,
    pub total_questions: u64,
    pub total_pages: u32,
    /// Page numbers of the current pager group, ascending
    pub page_range: Vec<u32>,
    /// Last page of the previous group, when one exists
    pub previous_group_page: Option<u32>,
    /// First page of the next group, when one exists
    pub next_group_page: Option<u32>,
}

/// One choice with its running tally
#[derive(Debug, Serialize)]
pub struct ChoiceVotes {
    pub id: i64,
    pub choice_text: String,
    pub votes: i64,
}

impl From<Choice> for ChoiceVotes {
    fn from(choice: Choice) -> Self {
        Self {
            id: choice.id,
            choice_text: choice.choice_text,
            votes: choice.votes,
        }
    }
}

/// Question with its choices, served by detail, results and vote
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    pub id: i64,
    pub question_text: String,
    pub pub_date: String,
    pub choices: Vec<ChoiceVotes>,
}

/// Creation request: the question text plus its choices
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub choices: Vec<String>,
}

/// GET /api/questions?page=N
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, QuestionsError> {
    let page_size = get_page_size(&state.db).await?;
    let group_size = get_page_group_size(&state.db).await?;
    let total = polls::count_questions(&state.db).await?;

    let window = page_window(total, page_size, group_size, query.page).map_err(|e| match e {
        PagingError::PageOutOfRange {
            requested,
            total_pages,
        } => QuestionsError::PageOutOfRange {
            requested,
            total_pages,
        },
        overflow @ PagingError::TooManyPages { .. } => {
            QuestionsError::Database(overflow.to_string())
        }
    })?;

    let questions = polls::list_questions_page(&state.db, window.offset, window.limit).await?;

    Ok(Json(ListResponse {
        questions,
        page: window.page,
        total_questions: window.total_items,
        total_pages: window.total_pages,
        page_range: window.page_range,
        previous_group_page: window.previous_group_page,
        next_group_page: window.next_group_page,
    }))
}

/// GET /api/questions/:id
///
/// The vote-form payload: question text plus its choices.
pub async fn question_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuestionDetail>, QuestionsError> {
    let detail = load_question_detail(&state.db, id)
        .await?
        .ok_or(QuestionsError::QuestionNotFound(id))?;

    Ok(Json(detail))
}

/// GET /api/questions/:id/results
///
/// Same payload as the detail endpoint; the choices carry the tallies.
pub async fn question_results(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuestionDetail>, QuestionsError> {
    question_detail(State(state), Path(id)).await
}

/// POST /api/questions/create
///
/// Requires a session. Inserts the question and its choices in one
/// transaction; blank choice entries are dropped before counting.
pub async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionDetail>), QuestionsError> {
    let question_text = req.question_text.trim();
    if question_text.is_empty() {
        return Err(QuestionsError::Validation(
            "question text must not be empty".to_string(),
        ));
    }

    let choices: Vec<String> = req
        .choices
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if choices.len() < 2 {
        return Err(QuestionsError::Validation(
            "a question needs at least 2 choices".to_string(),
        ));
    }

    let question = polls::create_question(&state.db, question_text, &choices).await?;
    let detail = load_question_detail(&state.db, question.id)
        .await?
        .ok_or(QuestionsError::QuestionNotFound(question.id))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Fetch a question and its choices as one payload
pub(crate) async fn load_question_detail(
    db: &sqlx::SqlitePool,
    id: i64,
) -> Result<Option<QuestionDetail>, ballot_common::Error> {
    let Some(question) = polls::get_question(db, id).await? else {
        return Ok(None);
    };
    let choices = polls::list_choices(db, id).await?;

    Ok(Some(QuestionDetail {
        id: question.id,
        question_text: question.question_text,
        pub_date: question.pub_date,
        choices: choices.into_iter().map(ChoiceVotes::from).collect(),
    }))
}

/// Question endpoint error types for HTTP responses
#[derive(Debug)]
pub enum QuestionsError {
    PageOutOfRange { requested: u32, total_pages: u32 },
    QuestionNotFound(i64),
    Validation(String),
    Database(String),
}

impl From<ballot_common::Error> for QuestionsError {
    fn from(err: ballot_common::Error) -> Self {
        QuestionsError::Database(err.to_string())
    }
}

impl IntoResponse for QuestionsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            QuestionsError::PageOutOfRange {
                requested,
                total_pages,
            } => (
                StatusCode::NOT_FOUND,
                format!(
                    "page {} out of range (valid pages 1..={})",
                    requested, total_pages
                ),
            ),
            QuestionsError::QuestionNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("question {} not found", id))
            }
            QuestionsError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            QuestionsError::Database(msg) => (
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
