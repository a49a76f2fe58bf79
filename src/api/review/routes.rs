use crate::api::models::AppState;
use crate::api::review::handlers::{list_reviews_handler, show_review_handler};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews_handler))
        .route("/reviews/{id}", get(show_review_handler))
}
