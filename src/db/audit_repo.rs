// src/db/audit_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::audit::{AuditEntry, NewAuditEntry},
};

/// Append-only. The table trigger rejects UPDATE and DELETE.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &NewAuditEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_trail (user_id, username, action, model_name, object_id, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(&entry.action)
        .bind(&entry.model_name)
        .bind(&entry.object_id)
        .bind(&entry.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(&self, model: Option<&str>, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
        let rows = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, user_id, username, action, model_name, object_id, description, created_at
            FROM audit_trail
            WHERE ($1::text IS NULL OR model_name = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(model)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
