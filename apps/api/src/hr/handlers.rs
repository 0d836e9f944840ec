//! Job openings (public + admin) and application review endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::hr::applications::{delete_application, get_job_application, list_applications};
use crate::hr::jobs::{
    add_job_opening, delete_job, get_active_job_openings, get_job, list_all_jobs, update_job, JobUpdate,
    NewJobOpening,
};
use crate::models::application::{ApplicationSummary, JobApplicationRow};
use crate::models::job::JobPosting;
use crate::resume::extract::DocumentKind;
use crate::resume::storage::{get_resume, stored_filename};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobPosting>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationSummary>,
    pub total: usize,
}

/// GET /api/jobs
pub async fn handle_public_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = get_active_job_openings(&state.db).await?;
    Ok(Json(JobListResponse {
        total: jobs.len(),
        jobs,
    }))
}

/// GET /admin/api/jobs
///
/// Includes inactive openings.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = list_all_jobs(&state.db).await?;
    Ok(Json(JobListResponse {
        total: jobs.len(),
        jobs,
    }))
}

/// POST /admin/api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJobOpening>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    if req.title.trim().is_empty() || req.department.trim().is_empty() {
        return Err(AppError::Validation(
            "title and department are required".to_string(),
        ));
    }
    let job = add_job_opening(&state.db, &req).await?;
    info!("Job opening created: {} ({})", job.title, job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /admin/api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    get_job(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// PUT /admin/api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobUpdate>,
) -> Result<Json<JobPosting>, AppError> {
    update_job(&state.db, id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// DELETE /admin/api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !delete_job(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    Ok(Json(json!({ "deleted": id })))
}

/// GET /admin/api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let applications = list_applications(&state.db).await?;
    Ok(Json(ApplicationListResponse {
        total: applications.len(),
        applications,
    }))
}

/// GET /admin/api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobApplicationRow>, AppError> {
    get_job_application(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// DELETE /admin/api/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !delete_application(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }
    Ok(Json(json!({ "deleted": id })))
}

/// GET /admin/api/applications/:id/resume
///
/// Streams the stored resume back as an attachment.
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let application = get_job_application(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    let key = application
        .file_path
        .ok_or_else(|| AppError::NotFound("Resume file not found".to_string()))?;

    let bytes = get_resume(&state.s3, &state.config.s3_bucket, &key)
        .await
        .map_err(|e| {
            error!("Resume download failed: {e:?}");
            AppError::Storage(e.to_string())
        })?;

    let (content_type, disposition) = download_headers(&key);
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn download_headers(key: &str) -> (&'static str, String) {
    let filename = stored_filename(key);
    let content_type = DocumentKind::from_filename(filename)
        .map(|kind| kind.content_type())
        .unwrap_or("application/octet-stream");
    (
        content_type,
        format!("attachment; filename=\"{}\"", filename.replace('"', "")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_headers_follow_extension() {
        let (ct, disposition) = download_headers("resumes/s1_resume.pdf");
        assert_eq!(ct, "application/pdf");
        assert_eq!(disposition, "attachment; filename=\"s1_resume.pdf\"");

        let (ct, _) = download_headers("resumes/legacy.bin");
        assert_eq!(ct, "application/octet-stream");
    }
}
