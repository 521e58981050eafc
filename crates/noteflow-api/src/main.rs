//! noteflow API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use noteflow_acquire::Acquirer;
use noteflow_api::{build_router, AppState};
use noteflow_core::defaults;
use noteflow_inference::OllamaBackend;
use noteflow_store::{InMemoryNoteStore, JsonFileBackend, LearningCache};

/// Parse the CORS allow-list from the environment; defaults to local dev
/// origins.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let raw = std::env::var(defaults::ENV_CORS_ALLOWED_ORIGINS)
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| origin.parse().ok())
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logging: RUST_LOG filter, LOG_FORMAT "json" or "text".
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "noteflow_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let port: u16 = defaults::env_override(defaults::ENV_SERVER_PORT, defaults::SERVER_PORT);
    let cache_file = std::env::var(defaults::ENV_CACHE_FILE)
        .unwrap_or_else(|_| defaults::CACHE_FILE.to_string());

    let cache_backend = Arc::new(JsonFileBackend::new(&cache_file));
    let cache = Arc::new(LearningCache::load(cache_backend).await?);

    let state = AppState {
        notes: Arc::new(InMemoryNoteStore::new()),
        cache,
        backend: Arc::new(OllamaBackend::from_env()),
        acquirer: Arc::new(Acquirer::from_env()),
    };

    let allowed_origins = parse_allowed_origins();
    info!(
        port,
        cache_file = %cache_file,
        origins = allowed_origins.len(),
        "starting noteflow API"
    );

    let app = build_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(defaults::CORS_MAX_AGE_SECS)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES));

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
