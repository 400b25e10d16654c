// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{DocumentEditors, RequireRole},
    },
    models::document::{CreateDocumentPayload, Document, DocumentQuery},
};

// POST /api/documents
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Document metadata stored", body = Document),
        (status = 403, description = "Admins, QAC and engineers only")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    editor: RequireRole<DocumentEditors>,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let doc = app_state.document_service.create(editor.user(), payload).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

// GET /api/documents
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(DocumentQuery),
    responses((status = 200, description = "Newest first", body = Vec<Document>)),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<DocumentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let docs = app_state.document_service.list(&query).await?;
    Ok(Json(docs))
}

// DELETE /api/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Only the uploader or an admin"),
        (status = 404, description = "Unknown document")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.document_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
