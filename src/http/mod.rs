//! REST surface over the service context.
//!
//! `create_router` wires every route to its handler; `serve_http` binds the
//! listener and runs until the cancellation token fires.

pub mod errors;
mod extract;
pub mod handlers;
pub mod models;

pub use errors::ApiError;
pub use handlers::AppState;

use crate::service::AppContext;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    let cors_permissive = ctx.settings().server.cors_permissive;

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/models", get(handlers::models))
        // Databases
        .route(
            "/databases",
            get(handlers::list_databases).post(handlers::create_database),
        )
        .route(
            "/databases/{id}",
            get(handlers::get_database)
                .patch(handlers::update_database)
                .delete(handlers::delete_database),
        )
        // Collections
        .route(
            "/collections/{db_id}",
            get(handlers::list_collections).post(handlers::create_collection),
        )
        .route(
            "/collections/{db_id}/{collection_id}",
            get(handlers::get_collection)
                .patch(handlers::update_collection)
                .delete(handlers::delete_collection),
        )
        // Vectors; static segments win over `{collection_id}`
        .route("/collections/{db_id}/vectors", post(handlers::add_vectors))
        .route("/collections/{db_id}/embed", post(handlers::embed))
        .route("/collections/{db_id}/search", post(handlers::search))
        // Documents
        .route(
            "/databases/{db_id}/collections/{collection_id}/documents",
            get(handlers::list_documents).post(handlers::create_document),
        )
        .route(
            "/databases/{db_id}/collections/{collection_id}/documents/{id}",
            get(handlers::get_document)
                .patch(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Serves the API on `bind` until `ct` is cancelled.
///
/// In-flight requests are drained before returning.
pub async fn serve_http(
    ctx: Arc<AppContext>,
    bind: &str,
    ct: CancellationToken,
) -> anyhow::Result<()> {
    let router = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("HTTP server listening on http://{local_addr}");
    tracing::info!("Health check: http://{local_addr}/health");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await?;

    tracing::info!("HTTP server shut down gracefully");
    Ok(())
}

/// Cancels `ct` on Ctrl-C.
pub async fn shutdown_signal(ct: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::warn!("failed to listen for ctrl+c: {e}"),
    }
    ct.cancel();
}
