use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("malformed input in the request body")]
    AxumJsonRejection(#[from] JsonRejection),

    #[error("request body does not meet requirments")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("User not found")]
    NotFound,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP has expired")]
    ExpiredOtp,

    #[error("Internal server error")]
    Anyhow(#[from] anyhow::Error),
}

/// Body of every response, successful or not.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::ValidationError(ref e) => {
                tracing::info!("Invalid request input");

                // Every field shares the handler's message, pick any.
                e.field_errors()
                    .values()
                    .flat_map(|errors| errors.iter())
                    .find_map(|error| error.message.clone())
                    .map(|message| message.into_owned())
                    .unwrap_or_else(|| self.to_string())
            }

            Self::Anyhow(ref e) => {
                tracing::error!("Internal server error: {:?}", e);
                self.to_string()
            }

            _ => self.to_string(),
        };

        (self.status_code(), Json(MessageResponse { message })).into_response()
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AxumJsonRejection(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidOtp => StatusCode::BAD_REQUEST,
            Self::ExpiredOtp => StatusCode::BAD_REQUEST,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
