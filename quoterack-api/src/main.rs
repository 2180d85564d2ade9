use std::net::SocketAddr;

use quoterack_api::{app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "quoterack_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = quoterack_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Quoterack API on port {}", config.server.port);

    let catalog = quoterack_store::connect(&config.database)
        .await
        .expect("Failed to connect to catalog store");

    let app = app(AppState { catalog });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
