pub mod access;
pub mod compose;
pub mod fallback;
pub mod models;
pub mod pages;
pub mod review;
pub mod search;


// Re-exports
pub use models::*;

use axum::{
    extract::State,
    handler::HandlerWithoutStateExt,
    middleware,
    routing::get,
    Json, Router,
};
use std::path::Path;
use tower_http::services::ServeDir;

/// Every route of the site, with static files from `static_dir` and the
/// not-found page behind them. A known path with the wrong method is not
/// found either.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let assets = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(fallback::not_found_handler.into_service());

    Router::new()
        .route("/health", get(health_handler))
        .merge(pages::routes())
        .merge(review::routes())
        .merge(search::routes())
        .merge(compose::routes())
        .method_not_allowed_fallback(fallback::not_found_handler)
        .fallback_service(assets)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            fallback::render_error_pages,
        ))
        .with_state(state)
}

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_reviews: state.store.count_reviews().await,
        total_courses: state.store.count_courses().await,
    })
}
