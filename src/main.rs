//! Medical roster scheduling engine — Axum server.
//!
//! Run with: cargo run
//! Then POST a request to http://localhost:7860/schedule/generate

use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use medschedulr_engine::api;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("medschedulr_engine=info".parse().unwrap()))
        .init();

    let state = Arc::new(api::AppState::new());

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = api::router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], 7860));

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!(%addr, "medschedulr-engine listening");
    axum::serve(listener, app).await.unwrap();
}
