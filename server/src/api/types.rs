//! Shared API types
//!
//! Error responses and the mapping from domain errors to HTTP statuses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CompletionError, HabitError};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error category (e.g. `not_found`)
    pub error: String,
    /// Machine-readable code (e.g. `ALREADY_COMPLETED`)
    pub code: String,
    pub message: String,
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Forbidden { code: String, message: String },
    Conflict { code: String, message: String },
    Unprocessable { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unprocessable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unprocessable {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_data(e: crate::data::DataError) -> Self {
        tracing::error!(error = %e, backend = e.backend(), "Data error");
        Self::Internal {
            message: "Database operation failed".to_string(),
        }
    }
}

impl From<HabitError> for ApiError {
    fn from(e: HabitError) -> Self {
        match e {
            HabitError::NotFound(_) => Self::not_found("HABIT_NOT_FOUND", "Habit not found"),
            HabitError::Forbidden { .. } => Self::forbidden("NOT_OWNER", e.to_string()),
            HabitError::NothingToUpdate => Self::bad_request("NO_CHANGES", e.to_string()),
            HabitError::Completion(ref inner) => match inner {
                CompletionError::DuplicateCompletion { .. } => {
                    Self::conflict("ALREADY_COMPLETED", e.to_string())
                }
                CompletionError::MalformedDate { .. } => {
                    tracing::warn!(error = %e, "Malformed completion date");
                    Self::unprocessable("MALFORMED_DATE", e.to_string())
                }
            },
            HabitError::Data(data) => Self::from_data(data),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, "forbidden", code, message)
            }
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::Unprocessable { code, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable_entity",
                code,
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(ErrorBody {
                error: error_type.to_string(),
                code,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use crate::domain::HabitAction;
    use axum::body::to_bytes;
    use bson::oid::ObjectId;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_completion_is_conflict() {
        let err: ApiError = HabitError::Completion(CompletionError::DuplicateCompletion {
            date: "2024-03-10".to_string(),
        })
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_COMPLETED");
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_malformed_date_is_unprocessable() {
        let err: ApiError = HabitError::Completion(CompletionError::MalformedDate {
            value: "2024-3-1".to_string(),
        })
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "MALFORMED_DATE");
    }

    #[tokio::test]
    async fn test_not_found_and_forbidden() {
        let (status, body) = render(HabitError::NotFound(ObjectId::new()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Habit not found");

        let (status, body) = render(
            HabitError::Forbidden {
                action: HabitAction::Delete,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You can only delete your own habit");
    }

    #[tokio::test]
    async fn test_data_error_hides_details() {
        let err: ApiError =
            HabitError::Data(DataError::backend_unavailable("mongo", "socket closed")).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL");
        assert!(!body["message"].as_str().unwrap().contains("socket"));
    }
}
