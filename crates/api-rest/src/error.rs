//! Mapping from [`KeeperError`] to HTTP responses.
//!
//! Every error body has the shape
//! `{"error": {"code": <int>, "message": <catalogue message>, "details": ...}}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keeper_core::{ErrorCatalog, ErrorCode, KeeperError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
    /// A string, or an object mapping field names to `"required"`.
    #[schema(value_type = Object)]
    pub details: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// A rendered API error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// Render `err` using the messages in `catalog`.
    pub fn from_keeper(catalog: &ErrorCatalog, err: KeeperError) -> Self {
        let code = err.code();
        let details = match err.missing_fields() {
            Some(fields) => Value::Object(
                fields
                    .iter()
                    .map(|f| (f.clone(), Value::String("required".into())))
                    .collect::<Map<String, Value>>(),
            ),
            None => Value::String(err.to_string()),
        };

        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", err);
        } else {
            tracing::debug!("request rejected: {}", err);
        }

        Self {
            status,
            body: ErrorResponse {
                error: ErrorBody {
                    code: code.as_i32(),
                    message: catalog.message(code).to_owned(),
                    details,
                },
            },
        }
    }

    /// Render a request body that could not be read as JSON.
    pub fn from_rejection(catalog: &ErrorCatalog, rejection: JsonRejection) -> Self {
        let code = ErrorCode::BodyRequired;
        Self {
            status: status_for(code),
            body: ErrorResponse {
                error: ErrorBody {
                    code: code.as_i32(),
                    message: catalog.message(code).to_owned(),
                    details: Value::String(rejection.body_text()),
                },
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Exists => StatusCode::CONFLICT,
        ErrorCode::NotValid
        | ErrorCode::RequiredField
        | ErrorCode::BodyRequired
        | ErrorCode::InvalidPath => StatusCode::BAD_REQUEST,
        ErrorCode::Database | ErrorCode::Marshal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::Exists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::RequiredField), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorCode::Database),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_required_fields_become_detail_map() {
        let err = ApiError::from_keeper(
            &ErrorCatalog::standard(),
            KeeperError::RequiredField(vec!["name".into()]),
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error.code, 9);
        assert_eq!(err.body.error.message, "required field is missing");
        assert_eq!(err.body.error.details, serde_json::json!({"name": "required"}));
    }

    #[test]
    fn test_catalog_message_is_used() {
        let catalog = ErrorCatalog::standard().with_message(ErrorCode::NotFound, "nothing here");
        let err = ApiError::from_keeper(&catalog, KeeperError::NotFound("file f1".into()));
        assert_eq!(err.body.error.message, "nothing here");
        assert_eq!(err.body.error.details, Value::String("file f1 not found".into()));
    }
}
