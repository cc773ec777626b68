use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::protocol::ErrorResponse;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request rejected before the storage service is called
    #[error("{0}")]
    BadRequest(String),

    /// The storage service call failed
    #[error("Failed to call {op}")]
    Backend {
        op: &'static str,
        #[source]
        source: tonic::Status,
    },
}

impl GatewayError {
    pub fn backend(op: &'static str, source: tonic::Status) -> Self {
        GatewayError::Backend { op, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            GatewayError::BadRequest(reason) => {
                tracing::warn!("Rejected request: {}", reason);
            }
            GatewayError::Backend { op, source } => {
                tracing::error!("Error calling {}: {}", op, source);
            }
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_message() {
        let err = GatewayError::backend("GetValue", tonic::Status::unavailable("down"));
        assert_eq!(err.to_string(), "Failed to call GetValue");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_status() {
        let err = GatewayError::BadRequest("missing field `key`".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
