use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookwire_core::CallError;

/// Wrapper translating taxonomy failures into HTTP responses.
///
/// Every variant maps to its documented status equivalent and a
/// `{code, message}` body; nothing internal leaks past this point.
#[derive(Debug)]
pub struct ApiFailure(pub CallError);

impl From<CallError> for ApiFailure {
    fn from(error: CallError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "code": self.0.code_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
