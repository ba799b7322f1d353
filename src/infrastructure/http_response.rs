// HTTP response utilities for JSON payloads and service errors
use crate::application::error::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Wraps a service error so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_) | ServiceError::UnknownDevice(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0 {
            ServiceError::Internal(e) => {
                // Store details stay in the log
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            ServiceError::UnknownDevice(_) => {
                "Device not found. Please provide a valid device ID.".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(ServiceError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(ServiceError::reading_not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(ServiceError::Upstream {
                status: 401,
                message: "Invalid API key".to_string()
            })
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(ServiceError::Upstream {
                status: 42,
                message: String::new()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
