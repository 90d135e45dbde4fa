//! HTTP API handlers for ballot-web

pub mod account;
pub mod buildinfo;
pub mod health;
pub mod questions;
pub mod session;
pub mod vote;

pub use account::{
    change_password, delete_account, get_profile, login, logout, register, update_profile,
};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use questions::{create_question, list_questions, question_detail, question_results};
pub use session::{session_middleware, CurrentUser};
pub use vote::vote;
