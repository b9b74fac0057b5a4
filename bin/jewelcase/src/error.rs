//! Per-request error boundary.
//!
//! Every route returns `Result<_, SiteError>`. Failures become a short,
//! generic HTML error page; the details go to the log only.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use jewelcase_cms::CmsError;
use jewelcase_render::RenderError;
use thiserror::Error;

/// Errors that end a request.
#[derive(Debug, Error)]
pub enum SiteError {
    /// A content fetch failed.
    #[error("content fetch failed: {0}")]
    Cms(#[from] CmsError),

    /// The view could not be rendered.
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    /// The requested page does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The route did not finish before its deadline.
    #[error("route {0} timed out")]
    Timeout(String),
}

impl SiteError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Cms(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Cms(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let message = match status {
            StatusCode::NOT_FOUND => "Page not found",
            StatusCode::GATEWAY_TIMEOUT => "The page took too long to load",
            _ => "Something went wrong",
        };

        let body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{code} {message}</title></head>
<body><main class="error"><h1>{message}</h1><a href="/">Back home</a></main></body>
</html>"#,
            code = status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}
