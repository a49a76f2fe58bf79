use crate::api::models::*;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

/// Catch-all for requests that match neither a route nor a static file.
pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}

/// Replace the body of every [`AppError`] response with its rendered page.
///
/// Not-found pages suggest a random review instead.
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().copied() else {
        return response;
    };

    debug!(path = %path, status = %page.status, "Rendering error page");

    match error_page(&state, page.status).await {
        Ok(html) => (page.status, html).into_response(),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to render error page");
            response
        }
    }
}

async fn error_page(state: &AppState, status: StatusCode) -> Result<Html<String>, AppError> {
    if status == StatusCode::NOT_FOUND {
        let review = state.store.random_review().await;
        return state.page(
            "404",
            &json!({
                "title": state.title("Error"),
                "review": review,
            }),
        );
    }

    state.page(
        "error",
        &json!({
            "title": state.title("Error"),
            "message": status.canonical_reason().unwrap_or("Unexpected error"),
        }),
    )
}
