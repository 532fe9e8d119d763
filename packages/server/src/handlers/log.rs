use std::collections::HashSet;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{Duration, NaiveTime};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{role, system_log};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::log::*;
use crate::models::shared::escape_like;
use crate::state::AppState;
use crate::utils::sessions::pair_sessions;

#[utoipa::path(
    get,
    path = "/",
    tag = "Admin",
    operation_id = "listSystemLogs",
    summary = "Student login activity for a day",
    description = "Login and logout events of students on the given UTC day (today by default), with sessions paired from them. Requires `log:view` permission.",
    params(LogQuery),
    responses(
        (status = 200, description = "Events and sessions", body = LogResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_logs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogResponse>, AppError> {
    auth_user.require_permission("log:view")?;

    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1);

    let mut select = system_log::Entity::find()
        .filter(system_log::Column::Action.is_in([system_log::LOGIN, system_log::LOGOUT]))
        .filter(system_log::Column::Role.eq(role::STUDENT))
        .filter(system_log::Column::CreatedAt.gte(start))
        .filter(system_log::Column::CreatedAt.lt(end));

    if let Some(ref email) = query.email {
        let term = escape_like(email.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(system_log::Column::Email)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let events = select
        .order_by_desc(system_log::Column::CreatedAt)
        .order_by_desc(system_log::Column::Id)
        .all(&state.db)
        .await?;

    let sessions = pair_sessions(&events);
    let summary = SessionSummary {
        total_sessions: sessions.len(),
        active_sessions: sessions.iter().filter(|s| s.logout_at.is_none()).count(),
        unique_students: sessions
            .iter()
            .map(|s| s.email.as_str())
            .collect::<HashSet<_>>()
            .len(),
    };

    Ok(Json(LogResponse {
        date,
        events: events.into_iter().map(Into::into).collect(),
        sessions,
        summary,
    }))
}
