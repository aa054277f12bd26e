use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use minitwit_db::DbError;
use minitwit_types::api::{AuthErrorBody, StatusBody, ValidationErrorBody};
use thiserror::Error;
use tracing::error;

pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to use this resource!";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input. The message is shown to the caller.
    #[error("{0}")]
    Validation(&'static str),

    #[error("missing or wrong simulator credentials")]
    Unauthorized,

    #[error("unknown user")]
    NotFound,

    /// A rejected insert or delete. Reported as 403, like an auth failure.
    #[error("write failed: {0}")]
    WriteFailed(#[source] DbError),

    #[error("storage error: {0}")]
    Storage(#[source] DbError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::WriteFailed(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(msg) => (
                status,
                Json(ValidationErrorBody {
                    status: status.as_u16(),
                    error_msg: msg.to_string(),
                }),
            )
                .into_response(),
            Self::Unauthorized => (
                status,
                Json(AuthErrorBody {
                    status: status.as_u16(),
                    error: UNAUTHORIZED_MESSAGE,
                }),
            )
                .into_response(),
            other => {
                if status.is_server_error() || matches!(other, Self::WriteFailed(_)) {
                    error!("{}", other);
                }
                (status, Json(StatusBody { status: status.as_u16() })).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failures_share_the_forbidden_status() {
        let err = ApiError::WriteFailed(DbError::LockPoisoned);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn read_failures_are_server_errors() {
        let err = ApiError::Storage(DbError::LockPoisoned);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Validation("x").status(), StatusCode::BAD_REQUEST);
    }
}
