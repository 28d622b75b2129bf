//! HTTP handlers for bucket CRUD.

use super::auth_handlers::CurrentUser;
use crate::{
    errors::AppError,
    services::{AppState, bucket_service::BucketUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBucketRequest {
    pub name: String,
    /// Storage limit in bytes; omit for unlimited.
    pub storage_limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBucketRequest {
    pub name: Option<String>,
    pub storage_limit: Option<i64>,
}

/// POST `/api/buckets`
pub async fn create_bucket(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateBucketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let bucket = state
        .buckets
        .create(&user.0, &payload.name, payload.storage_limit)
        .await?;
    Ok((StatusCode::CREATED, Json(bucket)))
}

/// GET `/api/buckets`
pub async fn list_buckets(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let buckets = state.buckets.list(&user.0).await?;
    Ok(Json(buckets))
}

/// GET `/api/buckets/{bucket_id}`
pub async fn get_bucket(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(bucket_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bucket = state.buckets.get(&user.0, bucket_id).await?;
    Ok(Json(bucket))
}

/// PATCH `/api/buckets/{bucket_id}`
pub async fn update_bucket(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(bucket_id): Path<Uuid>,
    Json(payload): Json<UpdateBucketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let update = BucketUpdate {
        name: payload.name,
        storage_limit: payload.storage_limit,
    };
    let bucket = state.buckets.update(&user.0, bucket_id, update).await?;
    Ok(Json(bucket))
}

/// DELETE `/api/buckets/{bucket_id}`
pub async fn delete_bucket(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(bucket_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.buckets.delete(&user.0, bucket_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
