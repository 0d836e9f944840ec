use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::enquiries::store::{clear_contacts, count_contacts, list_contacts};
use crate::errors::AppError;
use crate::hr::applications::{clear_applications, count_applications, list_applications};
use crate::hr::jobs::count_active_jobs;
use crate::models::application::ApplicationSummary;
use crate::models::contact::ContactRow;
use crate::state::AppState;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_contacts: i64,
    pub total_applications: i64,
    pub total_job_openings: i64,
    pub recent_contacts: Vec<ContactRow>,
    pub recent_applications: Vec<ApplicationSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyDescriptionRequest {
    pub description: String,
}

/// GET /admin/api/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let (total_contacts, total_applications, total_job_openings, contacts, applications) = tokio::try_join!(
        count_contacts(&state.db),
        count_applications(&state.db),
        count_active_jobs(&state.db),
        list_contacts(&state.db),
        list_applications(&state.db),
    )?;

    Ok(Json(DashboardResponse {
        total_contacts,
        total_applications,
        total_job_openings,
        recent_contacts: last_n(contacts, RECENT_LIMIT),
        recent_applications: applications.into_iter().take(RECENT_LIMIT).collect(),
    }))
}

/// Contacts are listed oldest first, so the most recent ones are at the end.
fn last_n<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(n);
    items.drain(..skip);
    items
}

/// POST /admin/api/database/clear_contacts
pub async fn handle_clear_contacts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let removed = clear_contacts(&state.db).await?;
    info!("Cleared {removed} contacts");
    Ok(Json(json!({ "status": "success", "removed": removed })))
}

/// POST /admin/api/database/clear_applications
pub async fn handle_clear_applications(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let removed = clear_applications(&state.db).await?;
    info!("Cleared {removed} job applications");
    Ok(Json(json!({ "status": "success", "removed": removed })))
}

/// PUT /admin/api/company
///
/// Re-indexes the company description used by the assistant.
pub async fn handle_update_company(
    State(state): State<AppState>,
    Json(req): Json<CompanyDescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("description cannot be empty".to_string()));
    }
    let chunks = state.knowledge.replace_description(&req.description).await?;
    info!("Company description replaced ({chunks} chunks)");
    Ok(Json(json!({ "status": "success", "chunks": chunks })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_n_keeps_tail_in_order() {
        assert_eq!(last_n(vec![1, 2, 3, 4, 5, 6, 7], 5), vec![3, 4, 5, 6, 7]);
        assert_eq!(last_n(vec![1, 2], 5), vec![1, 2]);
    }
}
