// GET /api/stats handler

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;
use crate::models::{ErrorResponse, StatsResponse};
use crate::store::ResearchStore;

pub async fn stats_handler(
    store: Arc<ResearchStore>,
) -> Result<warp::reply::Response, Infallible> {
    match store.get_stats() {
        Ok(stats) => {
            let body = StatsResponse {
                stats,
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch database stats");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to fetch database stats", e),
            ))
        }
    }
}
