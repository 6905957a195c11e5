//! Demo server: loads config from env, provisions entity tables, mounts the
//! common, bound, and dynamic entity routes under /api/v1.

use atelier_api::{
    bound_entity_routes, common_routes_with_ready, ensure_database_exists, ensure_entity_tables,
    entity_routes, AppConfig, AppState, EntityKind, ModelRegistry, PayloadCodec,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("atelier_api=info".parse()?))
        .init();

    let config = AppConfig::from_env();
    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let registry = Arc::new(ModelRegistry::new());
    ensure_entity_tables(&pool, &registry).await?;

    let state = AppState {
        pool,
        registry,
        codec: Arc::new(PayloadCodec::new(config.payload_secret.as_deref())),
    };

    let api = Router::new()
        .nest("/courses", bound_entity_routes(state.clone(), EntityKind::Course))
        .nest("/news", bound_entity_routes(state.clone(), EntityKind::NewsAndBlogs))
        .merge(entity_routes(state.clone()));

    let app = Router::new()
        .merge(common_routes_with_ready(state))
        .nest("/api/v1", api)
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024));

    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
