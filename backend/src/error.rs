use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::profile_repository::RepositoryError;
use crate::utils::avatar::AvatarError;
use crate::utils::geocoding::GeocodeError;
use crate::utils::profile_editor::EditorError;
use crate::utils::words_feed::WordsError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Avatar(#[from] AvatarError),
    #[error(transparent)]
    Words(#[from] WordsError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Editor(EditorError::EditInProgress(_))
            | AppError::Editor(EditorError::AvatarReadPending) => StatusCode::CONFLICT,
            AppError::Editor(_) => StatusCode::BAD_REQUEST,
            AppError::Geocode(GeocodeError::NoLocationProvided) => StatusCode::BAD_REQUEST,
            AppError::Geocode(GeocodeError::LocationNotFound) => StatusCode::NOT_FOUND,
            AppError::Geocode(GeocodeError::LookupFailed(_)) => StatusCode::BAD_GATEWAY,
            AppError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Repository(RepositoryError::EmailTaken) => StatusCode::CONFLICT,
            AppError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Avatar(AvatarError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Avatar(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Words(WordsError::EntryNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
