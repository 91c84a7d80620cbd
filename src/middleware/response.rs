use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope: the payload's fields are merged next to `"ok": true`.
/// A unit payload yields just `{ "ok": true }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response, always 200
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl ApiResponse<()> {
    /// `{ "ok": true }`
    pub fn ok() -> Self {
        Self::success(())
    }
}

/// Build the envelope body for a payload
pub fn envelope<T: Serialize>(data: &T) -> Result<Value, serde_json::Error> {
    let mut envelope = json!({ "ok": true });
    match serde_json::to_value(data)? {
        Value::Object(fields) => {
            if let Value::Object(map) = &mut envelope {
                for (k, v) in fields {
                    if k != "ok" {
                        map.insert(k, v);
                    }
                }
            }
        }
        Value::Null => {}
        other => envelope["data"] = other,
    }
    Ok(envelope)
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match envelope(&self.data) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "ok": false,
                        "error": "Failed to serialize response data"
                    }))
                ).into_response()
            }
        }
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
