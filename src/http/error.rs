use rouille::{Response, input::post::PostError};

use crate::storage::error::StorageError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TrackNotFound(id) => {
                ApiError::NotFound(format!("track {} not found", id))
            }

            StorageError::TrackExists(id) => {
                ApiError::BadRequest(format!("track {} already exists", id))
            }

            StorageError::InvalidTrackId(id) => {
                ApiError::BadRequest(format!("invalid track id {:?}", id))
            }

            StorageError::Parse { .. } | StorageError::Fs(_) | StorageError::Internal(_) => {
                log::error!("{err}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        ApiError::BadRequest(format!("invalid form: {err}"))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        Response::text(self.to_string()).with_status_code(status)
    }
}
