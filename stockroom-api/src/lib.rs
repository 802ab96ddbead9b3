//! stockroom-api library
//!
//! REST API over the material table plus the photo store.

use axum::{extract::DefaultBodyLimit, middleware, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use stockroom_common::auth::ApiKeyVerifier;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod photos;

pub use crate::error::{ApiError, ApiResult};
pub use crate::photos::PhotoStore;

/// Default request body limit (covers one photo upload)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Uploaded photo storage
    pub photos: PhotoStore,
    /// Shared-secret check for protected routes
    pub api_keys: Arc<dyn ApiKeyVerifier>,
    /// Request body limit in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, photos: PhotoStore, api_keys: Arc<dyn ApiKeyVerifier>) -> Self {
        Self {
            db,
            photos,
            api_keys,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
///
/// Material routes require the API key; photo serving and health do not.
pub fn build_router(state: AppState) -> Router {
    // Protected routes (require API key)
    let protected = api::material_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        api::auth_middleware,
    ));

    // Public routes
    let public = Router::new()
        .nest_service("/uploads", ServeDir::new(state.photos.dir()))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
