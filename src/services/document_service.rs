// src/services/document_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::DocumentRepository,
    models::{
        auth::{Role, User},
        document::{CreateDocumentPayload, Document, DocumentQuery},
    },
};

#[derive(Clone)]
pub struct DocumentService {
    repo: DocumentRepository,
}

impl DocumentService {
    pub fn new(repo: DocumentRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, actor: &User, payload: CreateDocumentPayload) -> Result<Document, AppError> {
        payload.validate()?;
        let doc = self.repo.insert(actor.id, &payload).await?;
        tracing::info!(document = %doc.id, file = %doc.file_name, user = %actor.username, "Document registered");
        Ok(doc)
    }

    pub async fn list(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError> {
        self.repo.list(query.category, query.department).await
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let doc = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Document".to_string()))?;

        if !can_delete(actor, &doc) {
            return Err(AppError::Forbidden(
                "Only the uploader or an admin can delete this document.".to_string(),
            ));
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Document".to_string()));
        }

        tracing::info!(document = %id, user = %actor.username, "Document deleted");
        Ok(())
    }
}

fn can_delete(actor: &User, doc: &Document) -> bool {
    actor.role == Role::Admin || doc.uploaded_by == Some(actor.id)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        models::document::{Department, DocumentCategory, DocumentStatus},
        services::lifecycle::fixtures::user,
    };

    fn doc(uploaded_by: Option<Uuid>) -> Document {
        Document {
            id: Uuid::new_v4(),
            file_name: "boiler-sop.pdf".into(),
            file_url: "https://files.plant.local/boiler-sop.pdf".into(),
            version: "v1".into(),
            category: DocumentCategory::Sop,
            department: Department::Engineering,
            status: DocumentStatus::Active,
            description: String::new(),
            uploaded_by,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn uploader_and_admin_may_delete() {
        let engineer = user(Role::Engineer);
        let other = user(Role::Engineer);
        let admin = user(Role::Admin);
        let d = doc(Some(engineer.id));

        assert!(can_delete(&engineer, &d));
        assert!(can_delete(&admin, &d));
        assert!(!can_delete(&other, &d));
        assert!(!can_delete(&other, &doc(None)));
    }
}
