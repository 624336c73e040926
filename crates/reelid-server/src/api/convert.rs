use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// Body of a successful conversion.
///
/// `tmdb_ids` lists resolved identifiers only, so it may be shorter than
/// `total_movies`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConversionResponse {
    pub total_movies: usize,
    pub tmdb_ids: Vec<u64>,
}

pub(super) async fn convert_watchlist(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    match state.pipeline.run(&username).await {
        Ok(conversion) => {
            tracing::info!(
                request_id = %req_id.0,
                username = %username,
                total_movies = conversion.movies.len(),
                resolved = conversion.resolved_count,
                "conversion succeeded"
            );
            (
                StatusCode::OK,
                Json(ConversionResponse {
                    total_movies: conversion.movies.len(),
                    tmdb_ids: conversion.catalog_ids(),
                }),
            )
                .into_response()
        }
        Err(failure) => {
            let status = if failure.error.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::warn!(
                request_id = %req_id.0,
                username = %username,
                status = status.as_u16(),
                error = %failure.error,
                "conversion failed"
            );
            ApiError::new(status, failure.error.to_string(), failure.logs).into_response()
        }
    }
}

pub(super) async fn missing_username() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "Username is required.", Vec::new())
}
