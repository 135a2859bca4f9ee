use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Request-level error for the scoring endpoint.
///
/// Unknown machines, unknown parts and unparseable readings are not errors;
/// they are folded into the scores. Only a body that does not have the
/// `{"machines": {...}}` shape is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    #[error("Invalid input format")]
    InvalidInput,
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        let status = match self {
            HealthError::InvalidInput => StatusCode::BAD_REQUEST,
        };
        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        assert_eq!(HealthError::InvalidInput.to_string(), "Invalid input format");
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let response = HealthError::InvalidInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
