use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub type AppResult<T> = Result<T, Error>;

/// one error per pipeline stage, every variant maps to exactly one status and
/// one user facing message
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// malformed, missing or oversized input
    #[error("{0}")]
    BadRequest(String),

    /// blocked user agent
    #[error("{0}")]
    Forbidden(String),

    /// client burned through its request window
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: u64 },

    /// url failed the platform pattern or the private-host guard
    #[error("{0}")]
    InvalidUrl(String),

    /// every upstream strategy was exhausted, carries the last underlying
    /// error for the logs
    #[error("{0}")]
    ExtractionFailed(String),

    /// the media proxy got something that isn't media (expired link html page)
    #[error("{0}")]
    InvalidSource(String),

    /// one upstream call failed, normally recovered by advancing to the next
    /// strategy. surface_status is only set when the proxy should hand the
    /// upstream status straight back instead of a 500
    #[error("{message}")]
    UpstreamUnavailable {
        surface_status: Option<StatusCode>,
        message: String,
    },

    #[error("internal server error")]
    InternalServerError,

    #[error("{0}")]
    InternalServerErrorWithContext(String),
}

const GENERIC_FAILURE_MESSAGE: &str = "Service temporarily unavailable. Please try again.";

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::InvalidUrl(_) | Error::InvalidSource(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::UpstreamUnavailable {
                surface_status: Some(status),
                ..
            } => *status,
            Error::ExtractionFailed(_)
            | Error::UpstreamUnavailable { .. }
            | Error::InternalServerError
            | Error::InternalServerErrorWithContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// internal detail only leaves the process in development, production gets
    /// the generic line and the real error stays in the logs
    fn user_message(&self) -> String {
        match self {
            Error::ExtractionFailed(_)
            | Error::InternalServerError
            | Error::InternalServerErrorWithContext(_)
            | Error::UpstreamUnavailable {
                surface_status: None,
                ..
            } => {
                if crate::server::is_production() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.user_message(),
        }));

        let mut response = (status, body).into_response();

        if let Error::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, retry_after.into());
        }

        response
    }
}
