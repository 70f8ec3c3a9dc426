mod handlers;
pub mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use state::{AddressField, AppState};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::LocatorConfig;
use crate::location::BigDataCloudClient;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/locate", get(handlers::locate))
        .route("/api/state", get(handlers::field_state))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, config: LocatorConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState {
        geocoder: Box::new(BigDataCloudClient::from_config(&config)),
        config,
        field: AddressField::default(),
    });
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    eprintln!("  Afrocarib locator listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
