use anyhow::Result;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::job::JobPosting;

pub const DEFAULT_LOCATION: &str = "Indore";
pub const DEFAULT_EMPLOYMENT_TYPE: &str = "Full-time";

#[derive(Debug, Clone, Deserialize)]
pub struct NewJobOpening {
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
}

impl NewJobOpening {
    fn location(&self) -> &str {
        non_blank(self.location.as_deref()).unwrap_or(DEFAULT_LOCATION)
    }

    fn employment_type(&self) -> &str {
        non_blank(self.employment_type.as_deref()).unwrap_or(DEFAULT_EMPLOYMENT_TYPE)
    }
}

/// Partial update. Blank strings leave the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub is_active: Option<bool>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn add_job_opening(pool: &PgPool, job: &NewJobOpening) -> Result<JobPosting> {
    let row = sqlx::query_as::<_, JobPosting>(
        r#"
        INSERT INTO job_openings
            (id, title, department, description, requirements, location, employment_type)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.title.trim())
    .bind(job.department.trim())
    .bind(&job.description)
    .bind(&job.requirements)
    .bind(job.location())
    .bind(job.employment_type())
    .fetch_one(pool)
    .await?;

    info!("Added job opening {} ({})", row.title, row.id);
    Ok(row)
}

/// Active openings, newest first.
pub async fn get_active_job_openings(pool: &PgPool) -> Result<Vec<JobPosting>> {
    Ok(sqlx::query_as::<_, JobPosting>(
        "SELECT * FROM job_openings WHERE is_active ORDER BY posted_date DESC",
    )
    .fetch_all(pool)
    .await?)
}

/// Every opening including inactive ones, newest first.
pub async fn list_all_jobs(pool: &PgPool) -> Result<Vec<JobPosting>> {
    Ok(
        sqlx::query_as::<_, JobPosting>("SELECT * FROM job_openings ORDER BY posted_date DESC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<JobPosting>> {
    Ok(
        sqlx::query_as::<_, JobPosting>("SELECT * FROM job_openings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Returns `None` when no opening has this id.
pub async fn update_job(pool: &PgPool, id: Uuid, update: &JobUpdate) -> Result<Option<JobPosting>> {
    Ok(sqlx::query_as::<_, JobPosting>(
        r#"
        UPDATE job_openings SET
            title = COALESCE(NULLIF(TRIM($2), ''), title),
            department = COALESCE(NULLIF(TRIM($3), ''), department),
            description = COALESCE(NULLIF(TRIM($4), ''), description),
            requirements = COALESCE(NULLIF(TRIM($5), ''), requirements),
            location = COALESCE(NULLIF(TRIM($6), ''), location),
            employment_type = COALESCE(NULLIF(TRIM($7), ''), employment_type),
            is_active = COALESCE($8, is_active)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.title)
    .bind(&update.department)
    .bind(&update.description)
    .bind(&update.requirements)
    .bind(&update.location)
    .bind(&update.employment_type)
    .bind(update.is_active)
    .fetch_optional(pool)
    .await?)
}

/// True when a row was deleted.
pub async fn delete_job(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM job_openings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_active_jobs(pool: &PgPool) -> Result<i64> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM job_openings WHERE is_active")
            .fetch_one(pool)
            .await?,
    )
}

/// Openings inserted on first start so the assistant has something to match against.
pub fn sample_jobs() -> Vec<NewJobOpening> {
    let job = |title: &str, department: &str, description: &str, requirements: &str| NewJobOpening {
        title: title.to_string(),
        department: department.to_string(),
        description: description.to_string(),
        requirements: requirements.to_string(),
        location: None,
        employment_type: None,
    };
    vec![
        job(
            "Senior Full Stack Developer",
            "Development",
            "We are looking for an experienced Full Stack Developer to join our team and work on cutting-edge web applications.",
            "3+ years experience with React, Node.js, Python, databases. Experience with cloud technologies preferred.",
        ),
        job(
            "UI/UX Designer",
            "Design",
            "Seeking a creative UI/UX Designer to create intuitive and engaging user experiences for our digital products.",
            "2+ years experience in UI/UX design, Figma, Adobe Creative Suite. Portfolio required.",
        ),
        job(
            "AI/ML Engineer",
            "AI/ML",
            "Join our AI team to develop innovative machine learning solutions and AI-powered applications.",
            "Strong background in Python, TensorFlow/PyTorch, machine learning algorithms. Experience with NLP preferred.",
        ),
        job(
            "DevOps Engineer",
            "Operations",
            "Looking for a DevOps Engineer to manage our cloud infrastructure and deployment pipelines.",
            "Experience with AWS/Azure, Docker, Kubernetes, CI/CD pipelines. Strong scripting skills.",
        ),
    ]
}

/// Inserts the sample openings when no active opening exists. Returns how many were added.
pub async fn seed_sample_jobs(pool: &PgPool) -> Result<usize> {
    if count_active_jobs(pool).await? > 0 {
        return Ok(0);
    }
    let samples = sample_jobs();
    for job in &samples {
        add_job_opening(pool, job).await?;
    }
    info!("Seeded {} sample job openings", samples.len());
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_defaults_location_and_type() {
        let job: NewJobOpening = serde_json::from_str(r#"{"title":"QA Engineer","location":"  "}"#).unwrap();
        assert_eq!(job.location(), DEFAULT_LOCATION);
        assert_eq!(job.employment_type(), DEFAULT_EMPLOYMENT_TYPE);
        assert_eq!(job.department, "");
    }

    #[test]
    fn test_new_job_keeps_explicit_values() {
        let job: NewJobOpening = serde_json::from_str(
            r#"{"title":"QA","location":"Remote","employment_type":"Contract"}"#,
        )
        .unwrap();
        assert_eq!(job.location(), "Remote");
        assert_eq!(job.employment_type(), "Contract");
    }

    #[test]
    fn test_sample_jobs_cover_every_role_family() {
        let titles: Vec<String> = sample_jobs().into_iter().map(|j| j.title).collect();
        assert_eq!(
            titles,
            vec![
                "Senior Full Stack Developer",
                "UI/UX Designer",
                "AI/ML Engineer",
                "DevOps Engineer"
            ]
        );
    }
}
