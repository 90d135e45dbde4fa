//! Database queries for ballot-web

pub mod polls;
pub mod sessions;
pub mod users;
