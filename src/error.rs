use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    response::{ApiResponse, Meta},
    validation::ValidationErrors,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("The given data was invalid.")]
    Validation(ValidationErrors),

    /// A save or delete that failed after validation passed. The message is
    /// shown to the user as-is.
    #[error("{0}")]
    Failed(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Storage error")]
    Storage(#[from] std::io::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Turn a persistence failure into a user-facing message prefixed with
    /// `context`. Missing rows stay `NotFound`.
    pub fn failed(context: &str, err: AppError) -> Self {
        let detail = match &err {
            AppError::NotFound => return AppError::NotFound,
            AppError::Failed(_) => return err,
            AppError::OrmError(e) => e.to_string(),
            AppError::Storage(e) => e.to_string(),
            AppError::Internal(e) => e.to_string(),
            other => other.to_string(),
        };
        tracing::error!(error = %detail, "{context}");
        AppError::Failed(format!("{context}: {detail}"))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorData {
    Message { error: String },
    Fields { errors: ValidationErrors },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::OrmError(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match &self {
            AppError::OrmError(e) => tracing::error!(error = %e, "database error"),
            AppError::Storage(e) => tracing::error!(error = %e, "storage error"),
            AppError::Internal(e) => tracing::error!(error = %e, "internal error"),
            _ => {}
        }

        let message = self.to_string();
        let data = match self {
            AppError::Validation(errors) => ErrorData::Fields { errors },
            other => ErrorData::Message {
                error: other.to_string(),
            },
        };

        let body = ApiResponse {
            message,
            data: Some(data),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
