use std::sync::Arc;

use bookwire_core::{
    AuthClient, BookingClient, HttpClient, ReqwestHttpClient, UpstreamConfig, UpstreamGate,
};
use bookwire_web::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = UpstreamConfig::from_env()?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::from_config(&config)?);
    let gate = UpstreamGate::from_config(&config);

    let state = Arc::new(AppState {
        auth: AuthClient::new(Arc::clone(&http), gate.clone(), &config),
        booking: BookingClient::new(http, gate, &config),
    });

    let addr = std::env::var("BOOKWIRE_LISTEN").unwrap_or_else(|_| String::from("0.0.0.0:8080"));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "bookwire listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
