// Route definitions and shared-state injection

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Filter;

use crate::handlers;
use crate::llm::ChatGateway;
use crate::models::ErrorResponse;
use crate::store::ResearchStore;

fn with_store(
    store: Arc<ResearchStore>,
) -> impl Filter<Extract = (Arc<ResearchStore>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn with_gateway(
    gateway: Arc<dyn ChatGateway>,
) -> impl Filter<Extract = (Arc<dyn ChatGateway>,), Error = Infallible> + Clone {
    warp::any().map(move || gateway.clone())
}

fn with_model(
    model: String,
) -> impl Filter<Extract = (String,), Error = Infallible> + Clone {
    warp::any().map(move || model.clone())
}

pub fn configure_routes(
    store: Arc<ResearchStore>,
    gateway: Arc<dyn ChatGateway>,
    model: String,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api");

    // POST /api/chat
    let chat = api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and(with_gateway(gateway.clone()))
        .and(with_model(model))
        .and_then(handlers::chat_handler);

    // GET /api/health
    let health = api
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health_handler);

    // GET /api/models
    let models = api
        .and(warp::path("models"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_gateway(gateway))
        .and_then(handlers::models_handler);

    // GET /api/history
    let history = api
        .and(warp::path("history"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(handlers::list_sessions_handler);

    // GET /api/history/{session_id}
    let session_history = api
        .and(warp::path("history"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(handlers::session_history_handler);

    // GET /api/search?q=&limit=
    let search = api
        .and(warp::path("search"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query())
        .and(with_store(store.clone()))
        .and_then(handlers::search_handler);

    // GET /api/stats
    let stats = api
        .and(warp::path("stats"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(handlers::stats_handler);

    // POST /api/reset
    let reset = api
        .and(warp::path("reset"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(handlers::reset_handler);

    // POST /api/clear
    let clear = api
        .and(warp::path("clear"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store))
        .and_then(handlers::clear_handler);

    // Combine routes
    chat.or(health)
        .or(models)
        .or(history)
        .or(session_history)
        .or(search)
        .or(stats)
        .or(reset)
        .or(clear)
}

/// Render rejections (unmatched paths, malformed bodies) as the same
/// envelope shape the handlers use
pub async fn handle_rejection(
    rejection: warp::Rejection,
) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        tracing::error!(?rejection, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse::new(message)),
        status,
    ))
}
