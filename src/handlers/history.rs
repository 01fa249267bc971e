// GET /api/history and /api/history/{session_id} handlers

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;
use crate::models::{ErrorResponse, HistoryResponse, SessionsResponse};
use crate::store::ResearchStore;

pub async fn list_sessions_handler(
    store: Arc<ResearchStore>,
) -> Result<warp::reply::Response, Infallible> {
    match store.get_all_sessions() {
        Ok(sessions) => {
            let body = SessionsResponse {
                sessions,
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch research history");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to fetch research history", e),
            ))
        }
    }
}

/// An unknown session id yields an empty history, not an error
pub async fn session_history_handler(
    session_id: String,
    store: Arc<ResearchStore>,
) -> Result<warp::reply::Response, Infallible> {
    match store.get_session_history(&session_id) {
        Ok(history) => {
            let body = HistoryResponse {
                session_id,
                history,
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e,
                "failed to fetch session history");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to fetch session history", e),
            ))
        }
    }
}
