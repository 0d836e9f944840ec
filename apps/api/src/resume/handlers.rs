//! Multipart upload endpoints for resumes and ad-hoc documents.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

use crate::chat::handlers::ChatAnswer;
use crate::chat::service::{self, DEFAULT_SESSION_ID};
use crate::errors::AppError;
use crate::resume::extract::{extract_text, truncate_chars, DocumentKind, MAX_EXTRACTED_CHARS};
use crate::resume::payload::ResumePayload;
use crate::resume::storage::{put_resume, resume_object_key, stored_filename};
use crate::state::AppState;

const UPLOAD_PROMPT: &str = "Here is my Document:";

#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    pub status: &'static str,
    pub filename: String,
    pub plain_text: String,
    pub analysis: ChatAnswer,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub filename: String,
    pub extracted_text: String,
}

struct UploadedFile {
    filename: String,
    kind: DocumentKind,
    bytes: Bytes,
}

/// POST /upload_file
///
/// Stores the resume, extracts its text and runs it through the chat so the
/// candidate gets an immediate response in their session.
pub async fn handle_upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadFileResponse>, AppError> {
    let mut file = None;
    let mut session_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::Validation("Invalid file".to_string()))?;
                file = Some(accept_upload(filename, bytes)?);
            }
            Some("session_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::Validation("Invalid session_id".to_string()))?;
                session_id = Some(value).filter(|s| !s.trim().is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let session_id = session_id.unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

    // Extract before storing so unreadable files never reach the bucket.
    let plain_text = extract_blocking(file.filename.clone(), file.bytes.clone()).await?;

    let key = resume_object_key(&session_id, file.kind);
    put_resume(&state.s3, &state.config.s3_bucket, &key, file.bytes, file.kind)
        .await
        .map_err(|e| {
            error!("Resume upload failed: {e:?}");
            AppError::Storage(e.to_string())
        })?;

    let filename = stored_filename(&key).to_string();
    info!("Resume {} extracted ({} chars)", filename, plain_text.chars().count());

    let payload = ResumePayload::Structured {
        filename: filename.clone(),
        extracted_text: Some(plain_text.clone()),
        base64_content: None,
        file_path: Some(key),
    };
    let answer = service::chat(&state, &session_id, UPLOAD_PROMPT, Some(payload)).await?;

    Ok(Json(UploadFileResponse {
        status: "success",
        filename,
        plain_text,
        analysis: ChatAnswer { answer },
    }))
}

/// POST /upload_document
pub async fn handle_upload_document(
    mut multipart: Multipart,
) -> Result<Json<UploadDocumentResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("document") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::Validation("Invalid file".to_string()))?;
        let file = accept_upload(filename, bytes)?;
        let text = extract_blocking(file.filename.clone(), file.bytes).await?;

        return Ok(Json(UploadDocumentResponse {
            status: "success",
            message: "Document processed",
            filename: file.filename,
            extracted_text: truncate_chars(&text, MAX_EXTRACTED_CHARS),
        }));
    }

    Err(AppError::Validation("No document provided".to_string()))
}

fn accept_upload(filename: String, bytes: Bytes) -> Result<UploadedFile, AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }
    let kind = DocumentKind::from_filename(&filename).ok_or_else(|| {
        AppError::Validation("Invalid file type. Only PDF, DOCX and TXT files are allowed".to_string())
    })?;
    Ok(UploadedFile {
        filename,
        kind,
        bytes,
    })
}

async fn extract_blocking(filename: String, bytes: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_text(&filename, &bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))?
        .map_err(|e| AppError::Extraction(e.to_string()))
}
