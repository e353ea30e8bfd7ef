//! # Search proxy
//!
//! A small axum service that keeps the catalog credentials on the server
//! and forwards track searches.
//!
//! | Path | Description |
//! |------|-------------|
//! | `/search?q=<text>` | Simplified track list, at most 12 entries |
//! | `/health` | Liveness probe |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::{CatalogClient, CredentialProvider};

pub const SEARCH_FAILED: &str = "Failed to fetch songs";
pub const MISSING_QUERY: &str = "Missing search query";

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Builds the proxy router around a catalog client.
pub fn router<P>(catalog: Arc<CatalogClient<P>>) -> Router
where
    P: CredentialProvider + 'static,
{
    Router::new()
        .route("/search", get(handle_search::<P>))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

async fn handle_search<P>(
    State(catalog): State<Arc<CatalogClient<P>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    P: CredentialProvider + 'static,
{
    let query = params.q.unwrap_or_default();

    match catalog.search(&query).await {
        Ok(tracks) => Json(tracks).into_response(),
        Err(AppError::InvalidQuery(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": MISSING_QUERY })),
        )
            .into_response(),
        Err(e) => {
            if e.is_upstream() {
                warn!("Catalog rejected search for {:?}: {}", query, e);
            } else {
                error!("Search for {:?} failed: {}", query, e);
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": SEARCH_FAILED })),
            )
                .into_response()
        }
    }
}

/// Binds the proxy on all interfaces and serves until Ctrl-C.
pub async fn run(config: &Config) -> Result<()> {
    if !config.validate_spotify_config() {
        return Err(AppError::Config(format!(
            "missing {}",
            config.get_missing_config().join(", ")
        )));
    }

    let catalog = Arc::new(CatalogClient::from_config(config)?);
    let app = router(catalog);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Backend running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Backend stopped");
    Ok(())
}
