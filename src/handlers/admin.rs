// POST /api/reset and /api/clear handlers
//
// Both are destructive and guarded by an explicit `confirm` flag: reset
// destroys and recreates the storage file, clear deletes all rows but
// keeps the schema.

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;
use crate::models::{ActionResponse, ConfirmRequest, ErrorResponse};
use crate::store::ResearchStore;

pub async fn reset_handler(
    request: ConfirmRequest,
    store: Arc<ResearchStore>,
) -> Result<warp::reply::Response, Infallible> {
    if !request.confirm {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Confirmation required"),
        ));
    }

    match store.reset() {
        Ok(()) => {
            let body = ActionResponse {
                message: "Database reset successfully".to_string(),
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to reset database");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to reset database", e),
            ))
        }
    }
}

pub async fn clear_handler(
    request: ConfirmRequest,
    store: Arc<ResearchStore>,
) -> Result<warp::reply::Response, Infallible> {
    if !request.confirm {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Confirmation required"),
        ));
    }

    match store.clear_all() {
        Ok(()) => {
            let body = ActionResponse {
                message: "All research data cleared".to_string(),
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to clear research data");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to clear research data", e),
            ))
        }
    }
}
