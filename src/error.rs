use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::auth::dto::ErrorBody;
use crate::users::repo::RepoError;

pub const EMAIL_TAKEN: &str = "User with this email already exists";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Error returned by every handler. Rendered as
/// `{ "success": false, "message": ..., "errors": [...]? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", EMAIL_TAKEN)]
    EmailTaken,

    /// Covers both unknown email and wrong password.
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// `context` is what the client sees; `source` only reaches the log.
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::EmailTaken => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal { context, source } = &self {
            error!(error = ?source, "{context}");
        }
        let errors = match &self {
            AppError::Validation(errors) => errors.clone(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Attaches the client-facing message to an unexpected failure.
pub trait InternalContext<T> {
    fn or_internal(self, context: &'static str) -> AppResult<T>;
}

impl<T, E> InternalContext<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_internal(self, context: &'static str) -> AppResult<T> {
        self.map_err(|e| AppError::Internal {
            context,
            source: e.into(),
        })
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail => AppError::EmailTaken,
            RepoError::Other(source) => AppError::Internal {
                context: "Internal server error",
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_field_messages() {
        let (status, json) =
            body_of(AppError::Validation(vec!["Full name is required".into()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(json["errors"][0], "Full name is required");
    }

    #[tokio::test]
    async fn internal_hides_source() {
        let err: AppResult<()> =
            Err(anyhow::anyhow!("connection reset by peer")).or_internal("Internal server error during login");
        let (status, json) = body_of(err.unwrap_err()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal server error during login");
        assert!(!json.to_string().contains("connection reset"));
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn duplicate_maps_to_email_taken() {
        let err = AppError::from(RepoError::DuplicateEmail);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), EMAIL_TAKEN);
    }
}
