use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::utils::validation::is_valid_email;

const MESSAGE_MAX_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub enum ContactType {
    Support,
    #[default]
    Inquiry,
    Feedback,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    name: String,
    email: String,
    #[serde(default, rename = "type")]
    kind: ContactType,
    message: String,
}

// There is no mail backend yet; accepted messages only go to the log.
pub async fn submit_contact(Json(req): Json<ContactRequest>) -> Result<Json<Value>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if !is_valid_email(req.email.trim()) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }
    if message.chars().count() > MESSAGE_MAX_CHARS {
        return Err(AppError::BadRequest(format!(
            "Message must be {} characters or fewer",
            MESSAGE_MAX_CHARS
        )));
    }

    info!(
        kind = ?req.kind,
        email = %req.email.trim(),
        length = message.chars().count(),
        "Contact message received"
    );
    Ok(Json(json!({
        "message": "Message sent successfully!"
    })))
}
