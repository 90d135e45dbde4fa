//! Database models

use serde::{Deserialize, Serialize};

/// Registered account
///
/// `guid` is a UUIDv4 assigned at registration; `username` is the unique
/// login identifier. `name`, `email` and `birthday` are profile fields,
/// `birthday` an optional ISO-8601 date string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub birthday: Option<String>,
}

/// Login session
///
/// `expires_at` is Unix epoch seconds; expired rows are treated as absent
/// and cleaned up lazily on lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_guid: String,
    pub expires_at: i64,
}

/// Poll question
///
/// Integer ids because the voted-questions cookie serializes them as
/// decimal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: String,
}

/// One answer choice of a question, with its running vote tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}
