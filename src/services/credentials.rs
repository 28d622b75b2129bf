//! Credential boundary.
//!
//! Token issuance and password hashing live outside this service; what
//! arrives here is an opaque bearer token (resolved against `api_token`)
//! or, at signup, an already-hashed password credential stored verbatim.

use super::{ServiceError, ServiceResult, is_unique_violation};
use crate::models::user::User;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct Credentials {
    db: Arc<SqlitePool>,
}

impl Credentials {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Resolve a bearer token to its user, or fail `Unauthorized`.
    pub async fn resolve_bearer(&self, token: &str) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, display_name, api_token, created_at
             FROM users WHERE api_token = ?",
        )
        .bind(token)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::Unauthorized)
    }

    /// Register a new account and mint its bearer token.
    pub async fn signup(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> ServiceResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            display_name: display_name.to_string(),
            api_token: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };

        match sqlx::query(
            "INSERT INTO users (id, email, password_hash, display_name, api_token, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.api_token)
        .bind(user.created_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(ServiceError::DuplicateEmail(email.to_string()))
            }
            Err(err) => Err(ServiceError::Sqlx(err)),
        }
    }
}
