use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

use crate::db::StorageError;
use crate::services::fashion_service::FashionError;
use crate::services::image_service::ImageError;
use crate::services::itinerary_generation_service::GenerationError;
use crate::services::search_service::SearchError;
use crate::services::voice_assistant_service::VoiceError;

/// Error returned by route handlers, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    BadGateway(String),
    Internal(String),
    Upstream { status: u16, message: String },
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::Upstream { message, .. } => message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.message() }))
    }
}

/// Body used by the endpoints that report failures as `{"error": ...}`.
pub fn error_body(status: StatusCode, message: impl fmt::Display) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message.to_string() }))
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidPreferences(msg) => ApiError::Unprocessable(msg),
            GenerationError::ModelError(msg) => ApiError::BadGateway(msg),
            GenerationError::StorageError(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound("Itinerary not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotConfigured => ApiError::Internal(err.to_string()),
            SearchError::HttpError(err) => ApiError::BadGateway(err.to_string()),
            SearchError::ResponseError { status, body } => ApiError::Upstream {
                status,
                message: body,
            },
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::NotFound(msg) => ApiError::NotFound(msg),
            ImageError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            ImageError::SearchError(err) => err.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FashionError> for ApiError {
    fn from(err: FashionError) -> Self {
        match err {
            FashionError::Exhausted(msg) => ApiError::BadGateway(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        let message = err.to_string();
        match err {
            VoiceError::SessionNotFound => ApiError::NotFound(message),
            VoiceError::EmptyMessage | VoiceError::EmptyAudio | VoiceError::InvalidAudio(_) => {
                ApiError::BadRequest(message)
            }
            VoiceError::Transcription(_) | VoiceError::Generation(_) => ApiError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_errors_map_to_statuses() {
        let invalid: ApiError = GenerationError::InvalidPreferences("bad".to_string()).into();
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let model: ApiError = GenerationError::ModelError("empty".to_string()).into();
        assert_eq!(model.status_code(), StatusCode::BAD_GATEWAY);

        let storage: ApiError =
            GenerationError::StorageError(StorageError::Database("down".to_string())).into();
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_status_is_passed_through() {
        let err: ApiError = SearchError::ResponseError {
            status: 429,
            body: "quota".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.message(), "quota");
    }

    #[test]
    fn test_voice_errors() {
        let missing: ApiError = VoiceError::SessionNotFound.into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.message(), "Session not found or expired.");

        let empty: ApiError = VoiceError::EmptyMessage.into();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    }
}
