use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{message, role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::message::*;
use crate::state::AppState;

/// Role on the other side of every conversation the caller may have.
fn counterpart_role(auth_user: &AuthUser) -> &'static str {
    if auth_user.is_admin() {
        role::STUDENT
    } else {
        role::ADMIN
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Messages",
    operation_id = "sendMessage",
    summary = "Send a message",
    description = "Students may message administrators and administrators may message students. Nothing else is allowed.",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Receiver not allowed (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Receiver not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(sender = auth_user.user_id, receiver = payload.receiver_id))]
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("message:send")?;
    validate_send_message(&payload)?;

    let receiver = user::Entity::find_by_id(payload.receiver_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Receiver not found".into()))?;
    if receiver.role != counterpart_role(&auth_user) {
        return Err(AppError::PermissionDenied);
    }

    let model = message::ActiveModel {
        sender_id: Set(auth_user.user_id),
        receiver_id: Set(receiver.id),
        body: Set(payload.body.trim().to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Messages",
    operation_id = "listMessages",
    summary = "List my messages",
    description = "Messages sent or received by the caller, oldest first. `with` narrows the list to one conversation.",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Messages", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    auth_user.require_permission("message:send")?;
    let me = auth_user.user_id;

    let condition = match query.with {
        Some(other) => Condition::any()
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(me))
                    .add(message::Column::ReceiverId.eq(other)),
            )
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(other))
                    .add(message::Column::ReceiverId.eq(me)),
            ),
        None => Condition::any()
            .add(message::Column::SenderId.eq(me))
            .add(message::Column::ReceiverId.eq(me)),
    };

    let messages = message::Entity::find()
        .filter(condition)
        .order_by_asc(message::Column::CreatedAt)
        .order_by_asc(message::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/unread-count",
    tag = "Messages",
    operation_id = "unreadCount",
    summary = "Count unread messages",
    responses(
        (status = 200, description = "Unread messages addressed to the caller", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn unread_count(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    auth_user.require_permission("message:send")?;

    let count = message::Entity::find()
        .filter(message::Column::ReceiverId.eq(auth_user.user_id))
        .filter(message::Column::IsRead.eq(false))
        .count(&state.db)
        .await?;

    Ok(Json(UnreadCountResponse { count }))
}

#[utoipa::path(
    post,
    path = "/read",
    tag = "Messages",
    operation_id = "markRead",
    summary = "Mark a conversation as read",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Messages marked as read", body = MarkReadResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, counterpart = payload.counterpart_id))]
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, AppError> {
    auth_user.require_permission("message:send")?;

    let result = message::Entity::update_many()
        .col_expr(message::Column::IsRead, Expr::value(true))
        .filter(message::Column::SenderId.eq(payload.counterpart_id))
        .filter(message::Column::ReceiverId.eq(auth_user.user_id))
        .filter(message::Column::IsRead.eq(false))
        .exec(&state.db)
        .await?;

    Ok(Json(MarkReadResponse {
        updated: result.rows_affected,
    }))
}

#[utoipa::path(
    get,
    path = "/contacts",
    tag = "Messages",
    operation_id = "listContacts",
    summary = "List people I can message",
    description = "Administrators for a student, students for an administrator, each with the number of unread messages from them.",
    responses(
        (status = 200, description = "Contacts", body = Vec<ContactResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_contacts(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    auth_user.require_permission("message:send")?;

    let contacts = user::Entity::find()
        .filter(user::Column::Role.eq(counterpart_role(&auth_user)))
        .order_by_asc(user::Column::Fullname)
        .all(&state.db)
        .await?;

    let unread_senders: Vec<i32> = message::Entity::find()
        .filter(message::Column::ReceiverId.eq(auth_user.user_id))
        .filter(message::Column::IsRead.eq(false))
        .select_only()
        .column(message::Column::SenderId)
        .into_tuple()
        .all(&state.db)
        .await?;
    let mut unread: HashMap<i32, u64> = HashMap::new();
    for sender in unread_senders {
        *unread.entry(sender).or_default() += 1;
    }

    Ok(Json(
        contacts
            .into_iter()
            .map(|u| ContactResponse {
                unread: unread.get(&u.id).copied().unwrap_or(0),
                id: u.id,
                fullname: u.fullname,
                email: u.email,
                role: u.role,
            })
            .collect(),
    ))
}
