// Handlers module

pub mod admin;
pub mod chat;
pub mod history;
pub mod meta;
pub mod search;
pub mod stats;

pub use admin::{clear_handler, reset_handler};
pub use chat::chat_handler;
pub use history::{list_sessions_handler, session_history_handler};
pub use meta::{health_handler, models_handler};
pub use search::search_handler;
pub use stats::stats_handler;

use warp::http::StatusCode;
use warp::Reply;

use crate::models::ErrorResponse;

/// Render a failure envelope with the given status
pub(crate) fn error_reply(status: StatusCode, body: ErrorResponse) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}
