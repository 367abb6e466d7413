use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Per-request failure kinds. The handler layer dispatches on the variant,
/// not on error source chains, so download, decode and inference problems
/// stay distinguishable in the response body.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model not loaded on server.")]
    ModelUnavailable,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Error downloading image: {0}")]
    Download(String),

    #[error("Failed to preprocess image: {0}")]
    Decode(String),

    #[error("Error during prediction: {0}")]
    Inference(String),
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
