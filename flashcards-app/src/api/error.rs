use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use flashcards_core::{messages, CoreError};

use crate::api::dto::{ErrorBody, FieldErrorsBody};

/// A `CoreError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        Self(CoreError::BadRequest(messages::MALFORMED_JSON.to_string()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(%rejection, "rejected query string");
        Self(CoreError::BadRequest(messages::MALFORMED_QUERY.to_string()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::BadRequest(_) | CoreError::FieldErrors(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.0 {
            CoreError::FieldErrors(errors) => {
                (status, Json(FieldErrorsBody { errors })).into_response()
            }
            CoreError::Storage(detail) => {
                tracing::error!(%detail, "request failed in storage");
                let body = ErrorBody {
                    error: messages::INTERNAL_ERROR.to_string(),
                };
                (status, Json(body)).into_response()
            }
            CoreError::BadRequest(error) | CoreError::NotFound(error) | CoreError::Conflict(error) => {
                tracing::debug!(status = status.as_u16(), %error, "request rejected");
                (status, Json(ErrorBody { error })).into_response()
            }
        }
    }
}
