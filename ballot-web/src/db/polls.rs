//! Poll question and choice queries

use ballot_common::db::models::{Choice, Question};
use ballot_common::{Error, Result};
use sqlx::SqlitePool;

/// Total number of questions
pub async fn count_questions(db: &SqlitePool) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(db)
        .await?;

    Ok(count as u64)
}

/// One listing page of questions, newest first
pub async fn list_questions_page(
    db: &SqlitePool,
    offset: u64,
    limit: u32,
) -> Result<Vec<Question>> {
    let rows = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, question_text, pub_date FROM questions ORDER BY id DESC LIMIT ? OFFSET ?",
    )
    .bind(limit as i64)
    .bind(offset as i64)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, question_text, pub_date)| Question {
            id,
            question_text,
            pub_date,
        })
        .collect())
}

/// Look up a question by id
pub async fn get_question(db: &SqlitePool, id: i64) -> Result<Option<Question>> {
    let row = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, question_text, pub_date FROM questions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|(id, question_text, pub_date)| Question {
        id,
        question_text,
        pub_date,
    }))
}

/// All choices of a question, in insertion order
pub async fn list_choices(db: &SqlitePool, question_id: i64) -> Result<Vec<Choice>> {
    let rows = sqlx::query_as::<_, (i64, i64, String, i64)>(
        "SELECT id, question_id, choice_text, votes FROM choices WHERE question_id = ? ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, question_id, choice_text, votes)| Choice {
            id,
            question_id,
            choice_text,
            votes,
        })
        .collect())
}

/// Look up a single choice by id
pub async fn get_choice(db: &SqlitePool, choice_id: i64) -> Result<Option<Choice>> {
    let row = sqlx::query_as::<_, (i64, i64, String, i64)>(
        "SELECT id, question_id, choice_text, votes FROM choices WHERE id = ?",
    )
    .bind(choice_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|(id, question_id, choice_text, votes)| Choice {
        id,
        question_id,
        choice_text,
        votes,
    }))
}

/// Insert a question together with its choices in one transaction
pub async fn create_question(
    db: &SqlitePool,
    question_text: &str,
    choice_texts: &[String],
) -> Result<Question> {
    let mut tx = db.begin().await?;

    let result = sqlx::query("INSERT INTO questions (question_text) VALUES (?)")
        .bind(question_text)
        .execute(&mut *tx)
        .await?;
    let question_id = result.last_insert_rowid();

    for choice_text in choice_texts {
        sqlx::query("INSERT INTO choices (question_id, choice_text) VALUES (?, ?)")
            .bind(question_id)
            .bind(choice_text)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    // Re-read for the database-assigned pub_date
    get_question(db, question_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("question {} missing after insert", question_id)))
}

/// Count one vote for a choice
///
/// A single atomic UPDATE; concurrent votes for the same choice serialize in
/// the database, never losing an increment. Returns false when the choice id
/// is unknown.
pub async fn increment_vote(db: &SqlitePool, choice_id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = ?")
        .bind(choice_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
