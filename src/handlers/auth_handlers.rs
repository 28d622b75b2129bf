//! Signup endpoint and the authenticated-caller extractor.

use crate::{errors::AppError, models::user::User, services::AppState};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header, request::Parts},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The already-authenticated caller, resolved from the bearer token.
///
/// The core never parses or validates token internals; the opaque token is
/// handed to the credential service, which yields a user or `Unauthorized`.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::new(StatusCode::UNAUTHORIZED, "missing bearer token")
            })?;

        let user = state.credentials.resolve_bearer(token).await?;
        Ok(CurrentUser(user))
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    /// Opaque credential produced by the external credential service.
    pub password_hash: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub api_token: String,
}

/// POST `/api/auth/signup` — register an account and mint its token.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .credentials
        .signup(&payload.email, &payload.password_hash, &payload.display_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            api_token: user.api_token,
        }),
    ))
}
