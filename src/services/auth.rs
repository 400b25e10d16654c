// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Role, TokenResponse, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: Duration,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl_hours: i64, pool: PgPool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
            pool,
        }
    }

    /// Hashes the password off the async runtime, then inserts user and profile atomically.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        email: &str,
        full_name: &str,
        role: Role,
        division: &str,
    ) -> Result<Uuid, AppError> {
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        let mut tx = self.pool.begin().await?;
        let id = self
            .user_repo
            .create_user(&mut *tx, username.trim(), email.trim(), &hashed_password, full_name.trim(), role, division)
            .await?;
        tx.commit().await?;

        Ok(id)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Checked after the password so the status of unknown accounts never leaks
        if !user.is_active() {
            tracing::info!(username = %user.username, "Login refused for non-active account");
            return Err(AppError::InactiveAccount);
        }

        let access = self.create_token(&user)?;
        tracing::info!(username = %user.username, role = user.role.as_str(), "User logged in");

        Ok(TokenResponse {
            access,
            token_type: "Bearer",
            expires_in: self.token_ttl.num_seconds(),
        })
    }

    /// Resolves a bearer token to the current user row. Accounts deactivated
    /// after the token was issued are refused.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active() {
            return Err(AppError::InactiveAccount);
        }
        Ok(user)
    }

    /// Creates the first admin on an empty database so somebody can log in.
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(false);
        }

        self.create_account(username, password, "", "Administrator", Role::Admin, "")
            .await?;
        tracing::info!(username = %username, "Bootstrap admin created");
        Ok(true)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::{models::auth::Role, services::lifecycle::fixtures::user};

    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AuthService::new(UserRepository::new(pool.clone()), secret.to_string(), 24, pool)
    }

    #[tokio::test]
    async fn issued_token_decodes_to_the_same_user() {
        let svc = service("test-secret");
        let engineer = user(Role::Engineer);

        let token = svc.create_token(&engineer).unwrap();
        let claims = svc.decode_token(&token).unwrap();

        assert_eq!(claims.sub, engineer.id);
        assert_eq!(claims.role, Role::Engineer);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let token = service("secret-a").create_token(&user(Role::Admin)).unwrap();
        assert!(matches!(service("secret-b").decode_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service("secret-a").decode_token("garbage"), Err(AppError::InvalidToken)));
    }
}
