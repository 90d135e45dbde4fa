//! Login session queries
//!
//! Sessions are opaque UUID tokens with an absolute expiry in epoch seconds.
//! Expired rows are deleted lazily when a lookup encounters them.

use ballot_common::db::models::Session;
use ballot_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Create a session for a user, valid for `timeout_seconds` from now
pub async fn create_session(
    db: &SqlitePool,
    user_guid: &str,
    timeout_seconds: i64,
) -> Result<Session> {
    let token = Uuid::new_v4().to_string();
    let expires_at = chrono::Utc::now().timestamp() + timeout_seconds;

    sqlx::query("INSERT INTO sessions (token, user_guid, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_guid)
        .bind(expires_at)
        .execute(db)
        .await?;

    Ok(Session {
        token,
        user_guid: user_guid.to_string(),
        expires_at,
    })
}

/// Look up an unexpired session by token
///
/// An expired row is deleted on sight and reported as absent.
pub async fn find_valid_session(db: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let row = sqlx::query_as::<_, (String, String, i64)>(
        "SELECT token, user_guid, expires_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let Some((token, user_guid, expires_at)) = row else {
        return Ok(None);
    };

    if expires_at <= chrono::Utc::now().timestamp() {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(&token)
            .execute(db)
            .await?;
        return Ok(None);
    }

    Ok(Some(Session {
        token,
        user_guid,
        expires_at,
    }))
}

/// Delete a session by token (logout)
pub async fn delete_session(db: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;

    Ok(())
}

/// Delete every session of a user except the given one
///
/// Used after a password change so other devices must log in again while the
/// session that made the change stays alive.
pub async fn delete_other_sessions(
    db: &SqlitePool,
    user_guid: &str,
    keep_token: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_guid = ? AND token != ?")
        .bind(user_guid)
        .bind(keep_token)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}
