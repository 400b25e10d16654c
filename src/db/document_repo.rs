// src/db/document_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::document::{CreateDocumentPayload, Department, Document, DocumentCategory},
};

const DOCUMENT_COLUMNS: &str = r#"
    id, file_name, file_url, version, category, department, status,
    description, uploaded_by, uploaded_at
"#;

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, uploaded_by: Uuid, payload: &CreateDocumentPayload) -> Result<Document, AppError> {
        let sql = format!(
            r#"
            INSERT INTO documents (file_name, file_url, version, category, department, status, description, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );
        let doc = sqlx::query_as::<_, Document>(&sql)
            .bind(payload.file_name.trim())
            .bind(&payload.file_url)
            .bind(payload.version.trim())
            .bind(payload.category)
            .bind(payload.department)
            .bind(payload.status)
            .bind(&payload.description)
            .bind(uploaded_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(doc)
    }

    pub async fn list(
        &self,
        category: Option<DocumentCategory>,
        department: Option<Department>,
    ) -> Result<Vec<Document>, AppError> {
        let sql = format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE ($1::document_category IS NULL OR category = $1)
              AND ($2::document_department IS NULL OR department = $2)
            ORDER BY uploaded_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, Document>(&sql)
            .bind(category)
            .bind(department)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1");
        let doc = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
