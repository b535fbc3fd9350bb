use axum::{Json, http::StatusCode};
use shared::{ApiError, RankError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrailError {
    #[error("trail {0} not found")]
    NotFound(u32),
    #[error("reference override needs both lat and lng")]
    PartialReference,
    #[error(transparent)]
    Rank(#[from] RankError),
}

impl TrailError {
    pub fn status(&self) -> StatusCode {
        match self {
            TrailError::NotFound(_) => StatusCode::NOT_FOUND,
            TrailError::PartialReference | TrailError::Rank(_) => StatusCode::BAD_REQUEST,
        }
    }
}

pub fn trail_error_to_api_error(err: TrailError) -> (StatusCode, Json<ApiError>) {
    tracing::warn!("request rejected: {err}");
    (
        err.status(),
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
