use crate::api::models::*;
use axum::{extract::State, response::Html};
use serde_json::json;
use tracing::info;

pub async fn home_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.page("home", &json!({ "title": state.site_name.as_ref() }))
}

pub async fn about_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.page("about", &json!({ "title": state.title("About") }))
}

pub async fn courses_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let courses = state.store.list_courses().await;

    info!(count = courses.len(), "Listing courses");

    state.page(
        "courses",
        &json!({
            "title": state.title("Courses"),
            "courses": courses,
        }),
    )
}
