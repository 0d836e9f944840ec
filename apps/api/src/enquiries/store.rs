use anyhow::Result;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::contact::ContactRow;

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewContact {
    /// Labels of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

/// Partial update. Only non-blank fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone_number,
            &self.subject,
            &self.message,
        ]
        .iter()
        .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

pub async fn add_contact(pool: &PgPool, contact: &NewContact) -> Result<ContactRow> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        INSERT INTO contacts (id, name, email, phone_number, subject, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(contact.name.trim())
    .bind(contact.email.trim())
    .bind(contact.phone_number.trim())
    .bind(&contact.subject)
    .bind(&contact.message)
    .fetch_one(pool)
    .await?;

    info!("Added contact {} from {}", row.id, row.email);
    Ok(row)
}

/// Oldest first.
pub async fn list_contacts(pool: &PgPool) -> Result<Vec<ContactRow>> {
    Ok(
        sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts ORDER BY created_at ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_contact(pool: &PgPool, id: Uuid) -> Result<Option<ContactRow>> {
    Ok(
        sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Applies the non-blank fields of `update`. An empty update changes nothing
/// and returns the current row. `None` when the contact does not exist.
pub async fn update_contact(
    pool: &PgPool,
    id: Uuid,
    update: &ContactUpdate,
) -> Result<Option<ContactRow>> {
    if update.is_empty() {
        return get_contact(pool, id).await;
    }

    Ok(sqlx::query_as::<_, ContactRow>(
        r#"
        UPDATE contacts SET
            name = COALESCE(NULLIF(TRIM($2), ''), name),
            email = COALESCE(NULLIF(TRIM($3), ''), email),
            phone_number = COALESCE(NULLIF(TRIM($4), ''), phone_number),
            subject = COALESCE(NULLIF(TRIM($5), ''), subject),
            message = COALESCE(NULLIF(TRIM($6), ''), message)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.email)
    .bind(&update.phone_number)
    .bind(&update.subject)
    .bind(&update.message)
    .fetch_optional(pool)
    .await?)
}

pub async fn delete_contact(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn clear_contacts(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM contacts").execute(pool).await?;
    info!("Cleared {} contacts", result.rows_affected());
    Ok(result.rows_affected())
}

pub async fn count_contacts(pool: &PgPool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_blank_required_values() {
        let contact: NewContact =
            serde_json::from_str(r#"{"name":"Asha","email":"  ","message":"hi"}"#).unwrap();
        assert_eq!(contact.missing_fields(), vec!["email", "phone_number"]);
    }

    #[test]
    fn test_update_with_only_blanks_is_empty() {
        let update = ContactUpdate {
            subject: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(update.is_empty());
        assert!(ContactUpdate::default().is_empty());
    }

    #[test]
    fn test_update_with_a_value_is_not_empty() {
        let update = ContactUpdate {
            phone_number: Some("+91 90000 00000".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
