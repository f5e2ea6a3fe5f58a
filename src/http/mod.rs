//! HTTP surface: routes under `/api`, the envelope, token authentication and
//! the signed media route of the local backend.

pub mod auth;
pub mod handlers;
pub mod media;
pub mod response;

use crate::adapters::local::FsAdapter;
use crate::application::VideoService;
use crate::error::VideoError;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use response::ApiError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: VideoService,
    /// Set when blobs live on the local filesystem and `/media` serves them
    pub local_media: Option<FsAdapter>,
    pub api_tokens: Arc<Vec<String>>,
    /// Include `data.error` in server error envelopes
    pub expose_errors: bool,
}

impl AppState {
    fn error(&self, error: VideoError, fallback: Option<&str>) -> ApiError {
        ApiError::from_video(error, fallback, self.expose_errors)
    }
}

pub fn router(state: AppState) -> Router {
    let videos = Router::new()
        .route("/upload", post(handlers::upload_video))
        .route("/list", get(handlers::list_videos))
        .route("/trim", post(handlers::trim_video))
        .route("/merge", post(handlers::merge_videos))
        .route("/share", post(handlers::share_video))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_token,
        ));

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .nest("/api/video", videos);

    if state.local_media.is_some() {
        router = router.route("/media/*key", get(media::serve_media));
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
