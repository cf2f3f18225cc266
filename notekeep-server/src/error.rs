//! HTTP error mapping

use crate::server::{json_response, ResponseBody};
use hyper::header::{HeaderValue, WWW_AUTHENTICATE};
use hyper::{Response, StatusCode};
use notekeep_core::auth::BEARER_SCHEME;
use notekeep_core::NotekeepError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] NotekeepError),

    #[error("Malformed request body: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err {
                NotekeepError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                NotekeepError::Conflict(_) => StatusCode::CONFLICT,
                NotekeepError::Unauthorized | NotekeepError::InvalidCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                NotekeepError::NoteNotFound => StatusCode::NOT_FOUND,
                NotekeepError::Storage(_)
                | NotekeepError::Serialization(_)
                | NotekeepError::Io(_)
                | NotekeepError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Render as a JSON `{"detail": ...}` response.
    ///
    /// Server-side failures are logged in full and reported generically.
    pub fn into_response(self) -> Response<ResponseBody> {
        let status = self.status();

        let body = match &self {
            ApiError::Core(NotekeepError::Validation { field, message }) => {
                json!({ "detail": message, "field": field })
            }
            ApiError::Core(err) if !err.is_client_error() => {
                error!("Request failed: {}", err);
                json!({ "detail": "Internal server error" })
            }
            _ => json!({ "detail": self.to_string() }),
        };

        let mut response = json_response(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BEARER_SCHEME));
        }
        response
    }
}
