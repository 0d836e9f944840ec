use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::application::{ApplicationSummary, JobApplicationRow};

pub struct NewApplication<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub position: &'a str,
    pub resume_filename: &'a str,
    pub resume_text: Option<&'a str>,
    /// Object-storage key of the uploaded file, if any.
    pub file_path: Option<&'a str>,
}

pub async fn save_job_application(pool: &PgPool, app: NewApplication<'_>) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO job_applications
            (id, name, email, phone, position, resume_filename, resume_text, file_path)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(app.name)
    .bind(app.email)
    .bind(app.phone)
    .bind(app.position)
    .bind(app.resume_filename)
    .bind(app.resume_text)
    .bind(app.file_path)
    .execute(pool)
    .await?;

    info!("Saved application {id} for {} ({})", app.position, app.email);
    Ok(id)
}

pub async fn get_job_application(pool: &PgPool, id: Uuid) -> Result<Option<JobApplicationRow>> {
    Ok(
        sqlx::query_as::<_, JobApplicationRow>("SELECT * FROM job_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Newest first, without resume bodies.
pub async fn list_applications(pool: &PgPool) -> Result<Vec<ApplicationSummary>> {
    Ok(sqlx::query_as::<_, ApplicationSummary>(
        r#"
        SELECT id, name, email, phone, position, resume_filename, application_date, status
        FROM job_applications
        ORDER BY application_date DESC
        "#,
    )
    .fetch_all(pool)
    .await?)
}

pub async fn delete_application(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM job_applications WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes every application. Returns the number deleted.
pub async fn clear_applications(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM job_applications").execute(pool).await?;
    info!("Cleared {} job applications", result.rows_affected());
    Ok(result.rows_affected())
}

pub async fn count_applications(pool: &PgPool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM job_applications")
        .fetch_one(pool)
        .await?)
}
