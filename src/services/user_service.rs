// src/services/user_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{RegisterUserPayload, Role, User, UserStats, UserStatus},
    services::auth::AuthService,
};

pub const DIVISIONS: [&str; 12] = [
    "Halal Representative", "HSSE", "IT", "PD", "DP", "DS",
    "QA", "QC", "EN", "QSC", "RD", "WH",
];

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    auth: AuthService,
}

impl UserService {
    pub fn new(repo: UserRepository, auth: AuthService) -> Self {
        Self { repo, auth }
    }

    pub async fn register(&self, actor: &User, payload: RegisterUserPayload) -> Result<User, AppError> {
        payload.validate()?;

        // Only requesters belong to a division
        let division = match payload.role {
            Role::Requester => payload.division.as_deref().unwrap_or("").trim().to_string(),
            _ => String::new(),
        };

        let id = self
            .auth
            .create_account(
                &payload.username,
                &payload.password,
                payload.email.as_deref().unwrap_or(""),
                &payload.full_name,
                payload.role,
                &division,
            )
            .await?;

        tracing::info!(username = %payload.username, role = payload.role.as_str(), admin = %actor.username, "User registered");

        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("User".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.repo.list().await
    }

    pub async fn stats(&self) -> Result<UserStats, AppError> {
        self.repo.stats().await
    }

    pub async fn update_status(&self, actor: &User, user_id: Uuid, raw_status: &str) -> Result<User, AppError> {
        let status = parse_status(raw_status)?;

        if !self.repo.update_status(user_id, status).await? {
            return Err(AppError::ResourceNotFound("User".to_string()));
        }

        tracing::info!(user = %user_id, status = ?status, admin = %actor.username, "User status changed");

        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("User".to_string()))
    }
}

/// Admins may only toggle between Active and Inactive.
fn parse_status(raw: &str) -> Result<UserStatus, AppError> {
    match raw.trim() {
        "Active" => Ok(UserStatus::Active),
        "Inactive" => Ok(UserStatus::Inactive),
        other => Err(AppError::BadRequest(format!(
            "Invalid status '{}'. Expected 'Active' or 'Inactive'.",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_and_inactive_are_settable() {
        assert_eq!(parse_status("Active").unwrap(), UserStatus::Active);
        assert_eq!(parse_status("Inactive").unwrap(), UserStatus::Inactive);
        assert!(matches!(parse_status("Pending"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_status("active"), Err(AppError::BadRequest(_))));
    }
}
