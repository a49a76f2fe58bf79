use chrono::{DateTime, Utc};
use handlebars::{Handlebars, RenderError, TemplateError, handlebars_helper};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Page templates, registered by view name from the templates directory.
pub const VIEWS: &[&str] = &[
    "header",
    "footer",
    "home",
    "about",
    "courses",
    "reviews",
    "review",
    "no-results",
    "compose",
    "404",
    "error",
];

pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    /// Load every view in [`VIEWS`] from `<dir>/<name>.hbs`.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();

        for name in VIEWS {
            registry.register_template_file(name, dir.join(format!("{name}.hbs")))?;
        }

        handlebars_helper!(format_date: |date: str| display_date(date));
        registry.register_helper("format_date", Box::new(format_date));

        handlebars_helper!(score: |value: Json| match value.as_f64() {
            Some(v) => format!("{v}"),
            None => "-".to_string(),
        });
        registry.register_helper("score", Box::new(score));

        info!(dir = %dir.display(), views = VIEWS.len(), "Templates loaded");

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, view: &str, data: &T) -> Result<String, RenderError> {
        self.registry.render(view, data)
    }
}

/// `2021-06-12T00:00:00Z` -> `June 12, 2021`. Unparseable input is shown as is.
fn display_date(raw: &str) -> String {
    match raw.parse::<DateTime<Utc>>() {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn views() -> Views {
        Views::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")).unwrap()
    }

    #[test]
    fn dates_render_long_form() {
        assert_eq!(display_date("2021-06-12T00:00:00Z"), "June 12, 2021");
        assert_eq!(display_date("whenever"), "whenever");
    }

    #[test]
    fn every_view_is_registered() {
        let views = views();
        for name in VIEWS {
            assert!(views.registry.has_template(name), "missing view {name}");
        }
    }

    #[test]
    fn no_results_view_echoes_query() {
        let html = views()
            .render("no-results", &json!({ "title": "Search", "query": "bratwurst" }))
            .unwrap();
        assert!(html.contains("bratwurst"));
    }

    #[test]
    fn review_view_shows_missing_scores_as_dash() {
        let html = views()
            .render(
                "review",
                &json!({
                    "title": "Dog",
                    "review": {
                        "id": "00000000-0000-0000-0000-000000000000",
                        "title": "Dog",
                        "content": "Snappy casing",
                        "date": "2021-06-12T00:00:00Z",
                        "image_location": "/images/dog.jpg",
                        "rating": { "overall": 4.5, "taste": null },
                        "course": "00000000-0000-0000-0000-000000000000"
                    },
                    "course": null
                }),
            )
            .unwrap();
        assert!(html.contains("Snappy casing"));
        assert!(html.contains("June 12, 2021"));
        assert!(html.contains("4.5"));
    }
}
