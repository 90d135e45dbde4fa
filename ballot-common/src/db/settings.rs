//! Settings database access
//!
//! Read/write settings from the settings table (key-value store).
//! All settings are global, not per-user.

use crate::error::{Error, Result};
use crate::paging::{DEFAULT_GROUP_SIZE, DEFAULT_PAGE_SIZE};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Seconds a login session stays valid
pub async fn get_session_timeout_seconds(db: &Pool<Sqlite>) -> Result<i64> {
    match get_setting::<i64>(db, "session_timeout_seconds").await? {
        Some(seconds) => Ok(seconds),
        None => {
            let default = 31536000; // 1 year
            set_setting(db, "session_timeout_seconds", default).await?;
            Ok(default)
        }
    }
}

/// Max-Age for the voted-questions cookie
pub async fn get_vote_cookie_max_age_seconds(db: &Pool<Sqlite>) -> Result<i64> {
    match get_setting::<i64>(db, "vote_cookie_max_age_seconds").await? {
        Some(seconds) => Ok(seconds),
        None => {
            let default = 31536000; // 1 year
            set_setting(db, "vote_cookie_max_age_seconds", default).await?;
            Ok(default)
        }
    }
}

/// Questions per listing page
pub async fn get_page_size(db: &Pool<Sqlite>) -> Result<u32> {
    match get_setting::<u32>(db, "page_size").await? {
        Some(size) if size >= 1 => Ok(size),
        _ => {
            set_setting(db, "page_size", DEFAULT_PAGE_SIZE).await?;
            Ok(DEFAULT_PAGE_SIZE)
        }
    }
}

/// Page links per pager group
pub async fn get_page_group_size(db: &Pool<Sqlite>) -> Result<u32> {
    match get_setting::<u32>(db, "page_group_size").await? {
        Some(size) if size >= 1 => Ok(size),
        _ => {
            set_setting(db, "page_group_size", DEFAULT_GROUP_SIZE).await?;
            Ok(DEFAULT_GROUP_SIZE)
        }
    }
}

/// Generic setting getter
///
/// Returns `None` when the key is absent; a present but unparseable value is
/// a config error.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}
