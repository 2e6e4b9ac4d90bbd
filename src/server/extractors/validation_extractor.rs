use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::server::error::Error;

/// json body extractor that rejects malformed payloads and runs the dto's
/// validation rules before the handler ever sees the value
pub struct ValidationExtractor<T>(pub T);

impl<T, S> FromRequest<S> for ValidationExtractor<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            debug!("rejecting malformed request body: {}", e);
            Error::BadRequest("Invalid JSON payload".to_string())
        })?;

        if let Err(errors) = value.validate() {
            let message = first_validation_message(&errors)
                .unwrap_or_else(|| "Invalid request body".to_string());
            debug!("rejecting invalid request body: {}", message);
            return Err(Error::BadRequest(message));
        }

        Ok(ValidationExtractor(value))
    }
}

/// the frontend renders a single error line, so only the first rule message
/// makes it out
fn first_validation_message(errors: &validator::ValidationErrors) -> Option<String> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(_, field_errors)| field_errors.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
}
