// GET /api/health and /api/models handlers

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;
use crate::llm::ChatGateway;
use crate::models::{ErrorResponse, HealthResponse, ModelsResponse};

pub async fn health_handler() -> Result<warp::reply::Response, Infallible> {
    let body = HealthResponse {
        status: "healthy".to_string(),
        service: "reka-research".to_string(),
    };
    Ok(warp::reply::json(&body).into_response())
}

/// Proxy the upstream model listing
pub async fn models_handler(
    gateway: Arc<dyn ChatGateway>,
) -> Result<warp::reply::Response, Infallible> {
    match gateway.list_models().await {
        Ok(models) => {
            let body = ModelsResponse {
                models,
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch models");
            Ok(error_reply(
                StatusCode::BAD_GATEWAY,
                ErrorResponse::with_details("Failed to fetch models", e),
            ))
        }
    }
}
