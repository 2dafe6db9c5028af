use std::sync::Arc;

use ag_core::{Error, Result};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn create_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/generate-article", post(handlers::generate_article))
        .route("/api/translate", post(handlers::translate))
        .route("/api/generate-pdf", post(handlers::generate_pdf))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, bind: &str, cors_origins: &[String]) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("🚀 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state, cors_origins))
        .await
        .map_err(Error::Io)
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState};
    pub use ag_core::{Error, Result};
}
