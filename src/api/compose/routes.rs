use crate::api::compose::handlers::{compose_form_handler, compose_submit_handler};
use crate::api::models::AppState;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/compose", get(compose_form_handler).post(compose_submit_handler))
}
