use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job opening as read from the job store. Immutable snapshot for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub employment_type: String,
    pub posted_date: DateTime<Utc>,
    pub is_active: bool,
}

#[cfg(test)]
impl JobPosting {
    pub fn fixture(title: &str, department: &str, requirements: &str) -> Self {
        JobPosting {
            id: Uuid::new_v4(),
            title: title.to_string(),
            department: department.to_string(),
            description: String::new(),
            requirements: requirements.to_string(),
            location: "Indore".to_string(),
            employment_type: "Full-time".to_string(),
            posted_date: Utc::now(),
            is_active: true,
        }
    }
}
