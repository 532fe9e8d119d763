use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::subject;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::subject::*;
use crate::state::AppState;
use crate::utils::semester::Term;

#[utoipa::path(
    get,
    path = "/",
    tag = "Subjects",
    operation_id = "listSubjects",
    summary = "List catalog subjects",
    description = "Returns the subject catalog ordered by code, optionally limited to one semester.",
    params(SubjectListQuery),
    responses(
        (status = 200, description = "Catalog subjects", body = Vec<SubjectResponse>),
        (status = 400, description = "Unknown semester (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_subjects(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubjectListQuery>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    let mut select = subject::Entity::find();
    if let Some(label) = query.semester.as_deref().filter(|s| !s.trim().is_empty()) {
        let term = Term::parse(label)
            .ok_or_else(|| AppError::Validation(format!("Unknown semester '{label}'")))?;
        select = select.filter(subject::Column::Semester.eq(term.catalog_name()));
    }

    let subjects = select
        .order_by_asc(subject::Column::Code)
        .all(&state.db)
        .await?;

    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Subjects",
    operation_id = "createSubject",
    summary = "Add a catalog subject",
    description = "Adds a subject to the catalog. Requires `subject:manage` permission.",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Subject code exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(code = %payload.code))]
pub async fn create_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("subject:manage")?;
    validate_create_subject(&payload)?;

    let term = Term::parse(&payload.semester)
        .ok_or_else(|| AppError::Validation("Unknown semester".into()))?;

    let model = subject::ActiveModel {
        code: Set(payload.code.trim().to_uppercase()),
        name: Set(payload.name.trim().to_string()),
        credits: Set(payload.credits),
        semester: Set(term.catalog_name().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Subject code already exists"))?;

    Ok((StatusCode::CREATED, Json(SubjectResponse::from(model))))
}
