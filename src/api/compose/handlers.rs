use crate::api::access::ComposeAccess;
use crate::api::models::*;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

pub async fn compose_form_handler(
    _access: ComposeAccess,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    state.page("compose", &json!({ "title": state.title("Compose") }))
}

/// Store the submitted review and course, then go home.
///
/// Failures are logged only; the author is redirected either way.
pub async fn compose_submit_handler(
    _access: ComposeAccess,
    State(state): State<AppState>,
    Form(form): Form<ComposeForm>,
) -> Redirect {
    match form.into_documents(Utc::now()) {
        Ok((review, course)) => {
            match state.store.create_review_with_course(review, course).await {
                Ok((review, course)) => {
                    info!(review_id = %review.id, course_id = %course.id, "Review published");
                }
                Err(e) => {
                    error!(error = %e, "Saving the new review and course failed");
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Rejected compose form");
        }
    }

    Redirect::to("/")
}
