use crate::api::access::AccessPolicy;
use crate::storage::{NewCourse, NewReview, Rating, ReviewStore};
use crate::views::Views;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use handlebars::RenderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub views: Arc<Views>,
    pub access: AccessPolicy,
    pub site_name: Arc<str>,
}

impl AppState {
    /// `"<page> | <site name>"`
    pub fn title(&self, page: &str) -> String {
        format!("{page} | {}", self.site_name)
    }

    /// Render a view, mapping template failures to [`AppError::Render`].
    pub fn page<T: Serialize>(&self, view: &str, data: &T) -> Result<Html<String>, AppError> {
        self.views
            .render(view, data)
            .map(Html)
            .map_err(|source| AppError::Render {
                view: view.to_string(),
                source,
            })
    }
}

/// `POST /search` form
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(rename = "searchText", default)]
    pub search_text: String,
}

/// `POST /compose` form. Field names follow the HTML form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComposeForm {
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub rating: String,
    #[serde(rename = "courseName")]
    pub course_name: String,
    pub location: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl ComposeForm {
    /// Convert into the documents to store. An empty date means `now`.
    pub fn into_documents(self, now: DateTime<Utc>) -> Result<(NewReview, NewCourse), String> {
        let date = parse_date(&self.date, now)?;
        let overall = parse_score(&self.rating)?;

        let review = NewReview {
            title: self.title,
            content: self.content,
            date,
            image_location: self.image_url,
            rating: Rating {
                overall,
                ..Rating::default()
            },
        };

        let course = NewCourse {
            name: self.course_name,
            location: self.location,
            url: self.url,
        };

        Ok((review, course))
    }
}

fn parse_date(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(now);
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| format!("Invalid date {raw:?}: {e}"))
}

fn parse_score(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(score) if score.is_finite() => Ok(Some(score)),
        _ => Err(format!("Invalid rating {raw:?}")),
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
    pub total_courses: usize,
}

/// Marks a response produced by [`AppError`] so the error-page layer can
/// replace its body with the rendered page.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage {
    pub status: StatusCode,
}

const FALLBACK_ERROR_HTML: &str = "<!DOCTYPE html><html><head><title>Error</title></head>\
<body><h1>Something went wrong</h1><p><a href=\"/\">Home</a></p></body></html>";

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("page not found")]
    NotFound,

    #[error("failed to render {view}: {source}")]
    Render { view: String, source: RenderError },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Internal error: {}", self);
        }

        let mut response = (status, Html(FALLBACK_ERROR_HTML)).into_response();
        response.extensions_mut().insert(ErrorPage { status });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form() -> ComposeForm {
        ComposeForm {
            title: "Brat at the Turn".to_string(),
            content: "Charred just right.".to_string(),
            date: "2021-06-12".to_string(),
            image_url: "/images/brat.jpg".to_string(),
            rating: "8.5".to_string(),
            course_name: "Theodore Wirth".to_string(),
            location: "Minneapolis, MN".to_string(),
            url: "https://example.com/wirth".to_string(),
        }
    }

    #[test]
    fn complete_form_converts() {
        let now = Utc::now();
        let (review, course) = form().into_documents(now).unwrap();

        assert_eq!(review.title, "Brat at the Turn");
        assert_eq!(review.image_location, "/images/brat.jpg");
        assert_eq!(review.date, Utc.with_ymd_and_hms(2021, 6, 12, 0, 0, 0).unwrap());
        assert_eq!(review.rating.overall, Some(8.5));
        assert_eq!(review.rating.taste, None);
        assert_eq!(course.name, "Theodore Wirth");
        assert_eq!(course.url, "https://example.com/wirth");
    }

    #[test]
    fn blank_date_and_rating_are_allowed() {
        let now = Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5).unwrap();
        let (review, _) = ComposeForm {
            date: String::new(),
            rating: " ".to_string(),
            ..form()
        }
        .into_documents(now)
        .unwrap();

        assert_eq!(review.date, now);
        assert_eq!(review.rating.overall, None);
    }

    #[test]
    fn rfc3339_dates_are_accepted() {
        let (review, _) = ComposeForm {
            date: "2021-06-12T15:30:00-05:00".to_string(),
            ..form()
        }
        .into_documents(Utc::now())
        .unwrap();

        assert_eq!(review.date, Utc.with_ymd_and_hms(2021, 6, 12, 20, 30, 0).unwrap());
    }

    #[test]
    fn bad_date_or_rating_is_rejected() {
        let bad_date = ComposeForm {
            date: "last tuesday".to_string(),
            ..form()
        };
        assert!(bad_date.into_documents(Utc::now()).is_err());

        let bad_rating = ComposeForm {
            rating: "ten".to_string(),
            ..form()
        };
        assert!(bad_rating.into_documents(Utc::now()).is_err());

        let infinite = ComposeForm {
            rating: "inf".to_string(),
            ..form()
        };
        assert!(infinite.into_documents(Utc::now()).is_err());
    }

    #[test]
    fn render_failures_are_server_errors() {
        let views =
            Views::load(&std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")).unwrap();
        let source = views.render("no-such-view", &()).unwrap_err();
        let err = AppError::Render {
            view: "no-such-view".to_string(),
            source,
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ErrorPage>().is_some());
    }

    #[test]
    fn error_responses_are_tagged_for_the_page_layer() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let page = response.extensions().get::<ErrorPage>().unwrap();
        assert_eq!(page.status, StatusCode::NOT_FOUND);
    }
}
