use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A website contact / sales enquiry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
