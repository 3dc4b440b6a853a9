//! HTTP build endpoint.
//!
//! `POST /generate_scorm` takes `{"markdown": "..."}` and answers with the
//! package as a ZIP attachment, or a JSON `{"error": "..."}` body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::export::{PACKAGE_FILE_NAME, PackageConfig, ScormExporter};

/// Environment variable overriding the bind address.
pub const BIND_ENV: &str = "SLIDEPACK_BIND";

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub package: PackageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            package: PackageConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, with the bind address taken from [`BIND_ENV`] when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(BIND_ENV) {
            match value.parse() {
                Ok(bind) => config.bind = bind,
                Err(e) => tracing::warn!(%value, error = %e, "ignoring invalid {BIND_ENV}"),
            }
        }
        config
    }
}

#[derive(Clone)]
struct AppState {
    exporter: Arc<ScormExporter>,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    markdown: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Build the application router.
pub fn router(config: PackageConfig) -> Router {
    let state = AppState {
        exporter: Arc::new(ScormExporter::new().with_config(config)),
    };

    Router::new()
        .route("/generate_scorm", post(generate_scorm))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /generate_scorm
async fn generate_scorm(State(state): State<AppState>, body: Bytes) -> Response {
    let markdown = match serde_json::from_slice::<GenerateRequest>(&body) {
        Ok(GenerateRequest {
            markdown: Some(markdown),
        }) => markdown,
        Ok(_) | Err(_) => {
            tracing::info!("rejected package request without markdown");
            return error_response(StatusCode::BAD_REQUEST, Error::MissingInput.to_string());
        }
    };

    let exporter = Arc::clone(&state.exporter);
    let result = tokio::task::spawn_blocking(move || exporter.export_to_vec(&markdown)).await;

    match result {
        Ok(Ok(archive)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{PACKAGE_FILE_NAME}\""),
                ),
            ],
            archive,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "packaging failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "packaging task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Serve the build endpoint until the process is stopped.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "listening");
    axum::serve(listener, router(config.package)).await
}
