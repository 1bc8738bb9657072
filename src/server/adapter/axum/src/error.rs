/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tandem_server::tandem_core::TandemError;

/// Newtype so `TandemError` can become an axum response (orphan rule).
#[derive(Debug)]
pub struct AxumError(pub TandemError);

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.0;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({
      "ok": false,
      "error": {
        "code": err.code(),
        "message": err.to_string(),
      }
    });
    (status, axum::Json(body)).into_response()
  }
}

impl From<TandemError> for AxumError {
  fn from(err: TandemError) -> Self {
    Self(err)
  }
}
