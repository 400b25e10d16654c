// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Engineer,
    Utility,
    Qac,
    Requester,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Engineer => "engineer",
            Role::Utility => "utility",
            Role::Qac => "qac",
            Role::Requester => "requester",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_status")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

/// A user account joined with its profile. This is also the caller identity
/// handed to every service operation.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "budi.santoso")]
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
    pub full_name: String,
    pub role: Role,
    #[schema(example = "QA")]
    pub division: String,
    pub status: UserStatus,
    pub avatar: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters."))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must have at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(email(message = "Email address is invalid."))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub division: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusPayload {
    #[schema(example = "Inactive")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}
