use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod routes;
mod server;

use crate::{
    handlers::{AppState, anthropic_engineering, anthropic_news, index},
    server::spawn_http_server,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,feed_cache=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Select and connect the cache store
    let memo = feed_cache::init().await?;

    let app = Router::new()
        .route("/", get(index))
        .route("/anthropic/news", get(anthropic_news))
        .route("/anthropic/engineering", get(anthropic_engineering))
        .with_state(AppState { memo });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1200);

    spawn_http_server(port, app).await?;
    Ok(())
}
