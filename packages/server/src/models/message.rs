use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::entity::message;
use crate::error::AppError;

pub const MAX_BODY_CHARS: usize = 2000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SendMessageRequest {
    pub receiver_id: i32,
    #[schema(example = "Good day, may I ask about my midterm grade?")]
    pub body: String,
}

pub fn validate_send_message(payload: &SendMessageRequest) -> Result<(), AppError> {
    let len = payload.body.trim().chars().count();
    if len == 0 || len > MAX_BODY_CHARS {
        return Err(AppError::Validation(format!(
            "Message must be 1-{MAX_BODY_CHARS} characters"
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<message::Model> for MessageResponse {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            body: m.body,
            is_read: m.is_read,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConversationQuery {
    /// Only messages exchanged with this user.
    pub with: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct MarkReadRequest {
    pub counterpart_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MarkReadResponse {
    /// Number of messages newly marked as read.
    pub updated: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Someone the caller may message.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ContactResponse {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub role: String,
    /// Unread messages from this contact to the caller.
    pub unread: u64,
}
