//! Administrative HTTP surface.
//!
//! - `GET /status`: non-secret summary of the current configuration.
//! - `GET /publickey`: the signing public key as PEM.
//! - `POST /admin/reload`: reload `config.json`; requires the `x-admin-api-key` header.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::configuration::{Configuration, ConfigurationProvider};

/// Header carrying the admin API key.
pub const ADMIN_API_KEY_HEADER: &str = "x-admin-api-key";

#[derive(Clone)]
pub struct AdminState {
    /// Source of the current configuration.
    provider: Arc<ConfigurationProvider>,
    /// Key required to trigger a reload.
    admin_api_key: Arc<str>,
}

impl AdminState {
    #[must_use]
    pub fn new(provider: Arc<ConfigurationProvider>, admin_api_key: &str) -> Self {
        Self {
            provider,
            admin_api_key: Arc::from(admin_api_key),
        }
    }

    /// Compares `presented` with the admin key in constant time.
    fn is_admin_key(&self, presented: &str) -> bool {
        let expected = self.admin_api_key.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }

        expected.ct_eq(presented.as_bytes()).into()
    }
}

/// Non-secret view of a configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub server_name: String,
    pub human_readable_name: String,
    pub https_enabled: bool,
    pub jwt_algorithm: String,
}

impl From<&Configuration> for StatusResponse {
    fn from(configuration: &Configuration) -> Self {
        let settings = configuration.settings();
        Self {
            server_name: settings.server_name().to_string(),
            human_readable_name: settings.human_readable_name().to_string(),
            https_enabled: settings.is_https_enabled(),
            jwt_algorithm: format!("{:?}", configuration.jwt_algorithm()),
        }
    }
}

#[must_use]
pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/publickey", get(public_key))
        .route("/admin/reload", post(reload))
        .with_state(state)
}

async fn status(State(state): State<AdminState>) -> Json<StatusResponse> {
    let configuration = state.provider.get_instance();
    Json(StatusResponse::from(configuration.as_ref()))
}

async fn public_key(State(state): State<AdminState>) -> Response {
    let configuration = state.provider.get_instance();
    let pem = configuration
        .signing_public_key()
        .map_err(|e| e.to_string())
        .and_then(|key| key.to_pem().map_err(|e| e.to_string()));

    match pem {
        Ok(pem) => ([(header::CONTENT_TYPE, "application/x-pem-file")], pem).into_response(),
        Err(message) => {
            tracing::error!("Signing public key unavailable: {message}");
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}

async fn reload(
    State(state): State<AdminState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, StatusCode> {
    let authorized = headers
        .get(ADMIN_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|presented| state.is_admin_key(presented));
    if !authorized {
        tracing::warn!("Rejected configuration reload with missing or wrong admin key");
        return Err(StatusCode::UNAUTHORIZED);
    }

    // Reading config.json is blocking file I/O.
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
    let provider = Arc::clone(&state.provider);
    let configuration = tokio::task::spawn_blocking(move || provider.load())
        .await
        .map_err(|e| {
            tracing::error!("Configuration reload task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(StatusResponse::from(configuration.as_ref())))
}
