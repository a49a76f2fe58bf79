use crate::api::models::AppState;
use crate::config::AdminConfig;
use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};
use tracing::warn;

/// Capabilities granted by configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    compose: bool,
}

impl AccessPolicy {
    /// Composing is allowed when an admin secret is configured.
    pub fn from_config(admin: &AdminConfig) -> Self {
        Self {
            compose: admin.has_compose_secret(),
        }
    }

    pub fn can_compose(&self) -> bool {
        self.compose
    }
}

/// Proof that the current request may use the compose routes.
///
/// Rejects with a redirect to the home page.
#[derive(Debug)]
pub struct ComposeAccess;

impl FromRequestParts<AppState> for ComposeAccess {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.access.can_compose() {
            Ok(ComposeAccess)
        } else {
            warn!(path = %parts.uri.path(), "Compose is disabled, redirecting home");
            Err(Redirect::to("/"))
        }
    }
}
