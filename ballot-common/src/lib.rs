//! # Ballot Common Library
//!
//! Shared code for the ballot services including:
//! - Database bootstrap, models and settings access
//! - Page-group pagination for listing endpoints
//! - The voted-questions client token
//! - Password hashing
//! - Configuration and root folder resolution

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod paging;
pub mod vote_token;

pub use error::{Error, Result};
pub use paging::{PageSource, PageView, PageWindow, PagingError};
pub use vote_token::VotedToken;
