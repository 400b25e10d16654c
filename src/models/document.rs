// src/models/document.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_category")]
pub enum DocumentCategory {
    #[sqlx(rename = "SOP")]
    #[serde(rename = "SOP")]
    Sop,
    Manual,
    Form,
    Specification,
    #[sqlx(rename = "Work Instruction")]
    #[serde(rename = "Work Instruction")]
    WorkInstruction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_department")]
pub enum Department {
    Engineering,
    Quality,
    Utility,
    Safety,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_status")]
pub enum DocumentStatus {
    Draft,
    Active,
    Archived,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    pub file_url: String,
    #[schema(example = "v1.2")]
    pub version: String,
    pub category: DocumentCategory,
    pub department: Department,
    pub status: DocumentStatus,
    pub description: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentPayload {
    #[validate(length(min = 1, max = 255, message = "File name is required."))]
    pub file_name: String,
    #[validate(url(message = "File URL is invalid."))]
    pub file_url: String,
    #[validate(length(min = 1, max = 20, message = "Version is required."))]
    pub version: String,
    pub category: DocumentCategory,
    pub department: Department,
    pub status: DocumentStatus,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DocumentQuery {
    pub category: Option<DocumentCategory>,
    pub department: Option<Department>,
}
