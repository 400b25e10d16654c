// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User, UserStats, UserStatus},
};

const USER_SELECT: &str = r#"
    SELECT
        u.id, u.username, u.email, u.password_hash, u.date_joined,
        p.full_name, p.role, p.division, p.status, p.avatar
    FROM users u
    JOIN user_profiles p ON p.user_id = u.id
"#;

// Every interaction with `users` / `user_profiles`
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.date_joined DESC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn stats(&self) -> Result<UserStats, AppError> {
        let (total_users, active_users): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE p.status = 'Active')
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats { total_users, active_users })
    }

    /// Inserts the account and its profile; call inside a transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
        division: &str,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            WITH new_user AS (
                INSERT INTO users (username, email, password_hash)
                VALUES ($1, $2, $3)
                RETURNING id
            )
            INSERT INTO user_profiles (user_id, full_name, role, division)
            SELECT id, $4, $5, $6 FROM new_user
            RETURNING user_id
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .bind(division)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Username already exists."))?;

        Ok(id)
    }

    pub async fn update_status(&self, user_id: Uuid, status: UserStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE user_profiles SET status = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
