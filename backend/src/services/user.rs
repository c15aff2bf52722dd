//! User profile service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::auth::{hash_password, verify_password};

/// User service for profile and password management
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Credentials row used for login
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Input for updating the current user's profile
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

impl UpdateProfileInput {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.location.is_none()
    }
}

/// Input for changing the current user's password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a user's profile
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, email, full_name, location, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))
    }

    /// Update the provided profile fields
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<UserProfile> {
        if input.is_empty() {
            return Err(AppError::BadRequest("No update data provided".to_string()));
        }

        let current = self.get_profile(user_id).await?;

        let email = match input.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                shared::validate_email(&email).map_err(|msg| AppError::validation("email", msg))?;

                if email != current.email {
                    let taken = sqlx::query_scalar::<_, i64>(
                        "SELECT COUNT(*) FROM users WHERE email = $1 AND id <> $2",
                    )
                    .bind(&email)
                    .bind(user_id)
                    .fetch_one(&self.db)
                    .await?;

                    if taken > 0 {
                        return Err(AppError::DuplicateEntry("email".to_string()));
                    }
                }
                email
            }
            None => current.email,
        };

        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET email = $2,
                full_name = COALESCE($3, full_name),
                location = COALESCE($4, location)
            WHERE id = $1
            RETURNING id, email, full_name, location, created_at
            "#,
        )
        .bind(user_id)
        .bind(&email)
        .bind(&input.full_name)
        .bind(&input.location)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// Change the password after checking the old one
    pub async fn change_password(&self, user_id: Uuid, input: ChangePasswordInput) -> AppResult<()> {
        let password_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

        if !verify_password(&input.old_password, &password_hash)? {
            return Err(AppError::BadRequest("Incorrect old password".to_string()));
        }

        shared::validate_password(&input.new_password)
            .map_err(|msg| AppError::validation("new_password", msg))?;

        let new_hash = hash_password(&input.new_password)?;

        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(&new_hash)
            .execute(&self.db)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");

        Ok(())
    }
}
