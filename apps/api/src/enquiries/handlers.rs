use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::enquiries::store::{
    add_contact, delete_contact, get_contact, list_contacts, update_contact, ContactUpdate,
    NewContact,
};
use crate::errors::AppError;
use crate::models::contact::ContactRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<ContactRow>,
    pub total: usize,
}

fn validate(contact: &NewContact) -> Result<(), AppError> {
    let missing = contact.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// POST /api/contact
///
/// Website contact form.
pub async fn handle_submit_contact(
    State(state): State<AppState>,
    Json(req): Json<NewContact>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate(&req)?;
    let contact = add_contact(&state.db, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Thank you for contacting us! We'll get back to you soon.",
            "id": contact.id,
        })),
    ))
}

/// GET /admin/api/contacts
pub async fn handle_list_contacts(
    State(state): State<AppState>,
) -> Result<Json<ContactListResponse>, AppError> {
    let contacts = list_contacts(&state.db).await?;
    Ok(Json(ContactListResponse {
        total: contacts.len(),
        contacts,
    }))
}

/// POST /admin/api/contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    Json(req): Json<NewContact>,
) -> Result<(StatusCode, Json<ContactRow>), AppError> {
    validate(&req)?;
    let contact = add_contact(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /admin/api/contacts/:id
pub async fn handle_get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactRow>, AppError> {
    get_contact(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Contact {id} not found")))
}

/// PATCH /admin/api/contacts/:id
pub async fn handle_update_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ContactUpdate>,
) -> Result<Json<ContactRow>, AppError> {
    update_contact(&state.db, id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Contact {id} not found")))
}

/// DELETE /admin/api/contacts/:id
pub async fn handle_delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !delete_contact(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Contact {id} not found")));
    }
    Ok(Json(json!({ "deleted": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lists_blank_fields() {
        let contact = NewContact {
            name: "Asha".to_string(),
            email: " ".to_string(),
            phone_number: String::new(),
            subject: None,
            message: None,
        };
        match validate(&contact) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Missing required fields: email, phone_number")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
