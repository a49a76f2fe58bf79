use crate::api::models::*;
use axum::{
    extract::{Path, State},
    response::Html,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn list_reviews_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let reviews = state.store.list_reviews_newest_first().await;

    info!(count = reviews.len(), "Listing reviews");

    state.page(
        "reviews",
        &json!({
            "title": state.title("Reviews"),
            "reviews": reviews,
        }),
    )
}

/// Review with its course. Unknown and malformed ids are both "not found".
pub async fn show_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;
    let review = state.store.find_review(id).await.ok_or(AppError::NotFound)?;

    let course = state.store.find_course(review.course).await;
    if course.is_none() {
        warn!(review_id = %review.id, course_id = %review.course, "Review has no course");
    }

    state.page(
        "review",
        &json!({
            "title": review.title,
            "review": review,
            "course": course,
        }),
    )
}
