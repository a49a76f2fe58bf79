use crate::api::models::*;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use regex::RegexBuilder;
use serde_json::json;
use tracing::{info, warn};

/// Where an unusable query is sent; no route matches it.
pub const NOT_FOUND_PATH: &str = "/404";

pub async fn search_handler(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let query = form.search_text;

    let pattern = match RegexBuilder::new(&query).case_insensitive(true).build() {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(query = %query, error = %e, "Invalid search pattern");
            return Ok(Redirect::to(NOT_FOUND_PATH).into_response());
        }
    };

    match state.store.find_by_title(&pattern).await {
        Some(review) => {
            info!(query = %query, review_id = %review.id, "Search matched");
            Ok(Redirect::to(&format!("/reviews/{}", review.id)).into_response())
        }
        None => {
            info!(query = %query, "Search found nothing");
            let page = state.page(
                "no-results",
                &json!({
                    "title": state.title("Search"),
                    "query": query,
                }),
            )?;
            Ok(page.into_response())
        }
    }
}
