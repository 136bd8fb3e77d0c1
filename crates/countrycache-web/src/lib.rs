//! # Countrycache Web
//!
//! Query API over the country store.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/countries/refresh` | Run one refresh cycle |
//! | `GET` | `/countries` | List, filter by `region`/`currency`, `sort=gdp_desc\|gdp_asc` |
//! | `GET` | `/countries/image` | Last rendered summary image |
//! | `GET` | `/countries/{name}` | One country, case-insensitive |
//! | `DELETE` | `/countries/{name}` | Remove one country |
//! | `GET` | `/status` | Total count and last refresh time |
//! | `GET` | `/regions` | Per-region totals |

mod error;
pub mod handlers;

use std::io;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use countrycache_core::Refresher;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub refresher: Arc<Refresher>,
}

impl AppState {
    pub fn new(refresher: Refresher) -> Self {
        Self {
            refresher: Arc::new(refresher),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/countries", get(handlers::list_countries))
        .route("/countries/refresh", post(handlers::refresh))
        .route("/countries/image", get(handlers::summary_image))
        .route(
            "/countries/:name",
            get(handlers::show_country).delete(handlers::delete_country),
        )
        .route("/status", get(handlers::status))
        .route("/regions", get(handlers::regions))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "query API listening");
    axum::serve(listener, router(state)).await
}
