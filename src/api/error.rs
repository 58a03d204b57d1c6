use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::DomainError;

/// Maps domain failures onto HTTP: caller mistakes are 4xx, provider and
/// infrastructure failures are 5xx. The body is always `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) | DomainError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::ExternalService(_)
            | DomainError::Internal(_)
            | DomainError::Ingestion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            tracing::warn!(error = %self.0, "request rejected");
        } else {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(status_of(DomainError::validation("empty")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::malformed("no id")), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_errors_are_server_errors() {
        assert_eq!(
            status_of(DomainError::external("openai down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::internal("poisoned")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(DomainError::timeout("slow")), StatusCode::GATEWAY_TIMEOUT);
    }
}
