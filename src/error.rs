use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Maps store failures onto the nearest domain error so driver internals
    /// never reach the client. Anything left over is a genuine 500.
    fn normalize(self) -> Self {
        match self {
            AppError::OrmError(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    AppError::BadRequest(duplicate_message(&detail))
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    AppError::NotFound("Referenced resource not found".into())
                }
                _ => match err {
                    DbErr::RecordNotFound(what) => AppError::NotFound(what),
                    DbErr::RecordNotUpdated => {
                        AppError::NotFound("Resource not found".into())
                    }
                    other => AppError::OrmError(other),
                },
            },
            AppError::DbError(sqlx::Error::RowNotFound) => {
                AppError::NotFound("Resource not found".into())
            }
            AppError::DbError(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                AppError::BadRequest(duplicate_message(db.constraint().unwrap_or_default()))
            }
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Postgres reports the violated constraint (`users_email_key`) or the full
// driver message; either way the column name is in there somewhere.
fn duplicate_message(detail: &str) -> String {
    let field = ["email", "google_id", "name"]
        .into_iter()
        .find(|field| detail.contains(field))
        .unwrap_or("value");
    format!("Duplicate {field} Entered")
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.normalize();
        let status = err.status_code();

        match &err {
            AppError::DbError(source) => tracing::error!(error = %source, "database error"),
            AppError::OrmError(source) => tracing::error!(error = %source, "orm error"),
            AppError::Internal(source) => tracing::error!(error = %source, "internal error"),
            _ => tracing::debug!(status = %status, message = %err, "request rejected"),
        }

        let body = ErrorBody {
            success: false,
            message: err.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound("Resource not found. Invalid: id".into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
