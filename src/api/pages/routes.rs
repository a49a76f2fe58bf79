use crate::api::models::AppState;
use crate::api::pages::handlers::{about_handler, courses_handler, home_handler};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_handler))
        .route("/about", get(about_handler))
        .route("/courses", get(courses_handler))
}
