use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::Day;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("time slot already occupied for this class")]
    ClassSlotConflict {
        class_id: String,
        day: Day,
        period: u8,
    },

    #[error("teacher already assigned elsewhere in this slot")]
    TeacherSlotConflict {
        teacher_id: String,
        day: Day,
        period: u8,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Registry error: {0}")]
    Registry(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Stable machine-readable discriminant, also sent over HTTP.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::ClassSlotConflict { .. } => "class_slot_conflict",
            AppError::TeacherSlotConflict { .. } => "teacher_slot_conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Storage(_) => "storage_failure",
            AppError::Registry(_) => "registry_failure",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ClassSlotTaken {
                class_id,
                day,
                period,
            } => AppError::ClassSlotConflict {
                class_id,
                day,
                period,
            },
            StoreError::TeacherSlotTaken {
                teacher_id,
                day,
                period,
            } => AppError::TeacherSlotConflict {
                teacher_id,
                day,
                period,
            },
            other => AppError::Storage(other),
        }
    }
}

// Malformed bodies and query strings are reported like any other bad field.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("query", rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match &self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::ClassSlotConflict { .. } | AppError::TeacherSlotConflict { .. } => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Storage(e) => {
                error!("storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                )
            }
            AppError::Registry(e) => {
                error!("registry error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Registry unavailable".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            code,
            message: error_message,
        });

        (status, body).into_response()
    }
}
