use std::sync::Arc;

use warp::Filter;

use reka_research::config::Config;
use reka_research::llm::{ChatGateway, RekaClient};
use reka_research::routes;
use reka_research::store::ResearchStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if config.api_key.is_empty() {
        tracing::warn!("REKA_API_KEY not found in environment variables");
    }

    let store = Arc::new(ResearchStore::new(&config.db_path)?);
    let gateway: Arc<dyn ChatGateway> =
        Arc::new(RekaClient::new(&config.api_key, &config.base_url)?);

    let routes = routes::configure_routes(store, gateway, config.model)
        .recover(routes::handle_rejection);

    tracing::info!(port = config.port, "starting server");
    warp::serve(routes).run(([0, 0, 0, 0], config.port)).await;

    Ok(())
}
