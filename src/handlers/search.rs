// GET /api/search handler

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;
use crate::models::{ErrorResponse, SearchParams, SearchResponse};
use crate::store::ResearchStore;

const DEFAULT_SEARCH_LIMIT: i64 = 50;

pub async fn search_handler(
    params: SearchParams,
    store: Arc<ResearchStore>,
) -> Result<warp::reply::Response, Infallible> {
    let term = params.q.unwrap_or_default();
    if term.is_empty() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Search term is required"),
        ));
    }

    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    match store.search(&term, limit) {
        Ok(results) => {
            let body = SearchResponse {
                search_term: term,
                results,
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to search research");
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to search research", e),
            ))
        }
    }
}
