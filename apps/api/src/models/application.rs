use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A submitted job application, including the extracted resume text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub resume_filename: String,
    pub resume_text: Option<String>,
    /// Object-storage key of the uploaded resume file, if one was stored.
    pub file_path: Option<String>,
    pub application_date: DateTime<Utc>,
    pub status: String,
}

/// Listing view of an application without the resume body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub resume_filename: String,
    pub application_date: DateTime<Utc>,
    pub status: String,
}
