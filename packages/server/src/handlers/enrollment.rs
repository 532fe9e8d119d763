use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::grading;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{enrollment, exam_score, score_record, standing_category, subject, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::enrollment::*;
use crate::models::subject::SubjectResponse;
use crate::state::AppState;
use crate::utils::enrollment::{
    delete_enrollment_rows, find_owned_enrollment, find_owned_enrollment_for_update, find_subject,
};
use crate::utils::performance;
use crate::utils::semester::Term;

/// Attach subjects and live snapshots to a list of enrollments.
pub(crate) async fn summarize_enrollments<C: ConnectionTrait>(
    db: &C,
    enrollments: Vec<enrollment::Model>,
) -> Result<Vec<EnrollmentSummary>, AppError> {
    let ids: Vec<i32> = enrollments.iter().map(|e| e.id).collect();
    let subject_ids: Vec<i32> = enrollments.iter().map(|e| e.subject_id).collect();

    let subjects: HashMap<i32, subject::Model> = subject::Entity::find()
        .filter(subject::Column::Id.is_in(subject_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let mut snapshots = performance::snapshots(db, &ids).await?;

    enrollments
        .into_iter()
        .map(|e| {
            let subject = subjects
                .get(&e.subject_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Subject {} missing", e.subject_id)))?;
            let performance = snapshots
                .remove(&e.id)
                .unwrap_or_else(|| grading::compute(&[], &[]));
            Ok(EnrollmentSummary {
                id: e.id,
                subject: subject.into(),
                professor_name: e.professor_name,
                schedule: e.schedule,
                performance,
                created_at: e.created_at,
            })
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Enrollments",
    operation_id = "listEnrollments",
    summary = "List my enrollments",
    description = "Returns the caller's active enrollments, each with a freshly computed performance snapshot. Requires `grades:own` permission.",
    responses(
        (status = 200, description = "Active enrollments", body = Vec<EnrollmentSummary>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_enrollments(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentSummary>>, AppError> {
    auth_user.require_permission("grades:own")?;

    let enrollments = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(enrollment::Column::CreatedAt)
        .order_by_desc(enrollment::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(summarize_enrollments(&state.db, enrollments).await?))
}

#[utoipa::path(
    get,
    path = "/available",
    tag = "Enrollments",
    operation_id = "listAvailableSubjects",
    summary = "List subjects I can still enroll in",
    description = "Returns catalog subjects for the caller's semester that the caller is not actively enrolled in.",
    responses(
        (status = 200, description = "Available subjects", body = Vec<SubjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_available(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    auth_user.require_permission("grades:own")?;

    let student = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let term = student
        .semester
        .as_deref()
        .and_then(Term::parse)
        .unwrap_or(Term::First);

    let enrolled: Vec<i32> = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(auth_user.user_id))
        .select_only()
        .column(enrollment::Column::SubjectId)
        .into_tuple()
        .all(&state.db)
        .await?;

    let subjects = subject::Entity::find()
        .filter(subject::Column::Semester.eq(term.catalog_name()))
        .filter(subject::Column::Id.is_not_in(enrolled))
        .order_by_asc(subject::Column::Code)
        .all(&state.db)
        .await?;

    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Enrollments",
    operation_id = "createEnrollment",
    summary = "Enroll in a subject",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentSummary),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Subject not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already enrolled (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, subject_id = payload.subject_id))]
pub async fn create_enrollment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEnrollmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;
    validate_create_enrollment(&payload)?;

    let subject = find_subject(&state.db, payload.subject_id).await?;

    let now = chrono::Utc::now();
    let model = enrollment::ActiveModel {
        student_id: Set(auth_user.user_id),
        subject_id: Set(subject.id),
        professor_name: Set(payload.professor_name.trim().to_string()),
        schedule: Set(payload
            .schedule
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Already enrolled in this subject"))?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentSummary {
            id: model.id,
            subject: subject.into(),
            professor_name: model.professor_name,
            schedule: model.schedule,
            performance: grading::compute(&[], &[]),
            created_at: model.created_at,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Enrollments",
    operation_id = "getEnrollment",
    summary = "Get an enrollment with all grading data",
    description = "Returns categories, scores, exams, the live snapshot and the remaining class-standing allocation. Another student's enrollment is reported as 404.",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment detail", body = EnrollmentDetail),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_enrollment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EnrollmentDetail>, AppError> {
    auth_user.require_permission("grades:own")?;
    let model = find_owned_enrollment(&state.db, auth_user.user_id, id).await?;
    let subject = find_subject(&state.db, model.subject_id).await?;

    let categories = standing_category::Entity::find()
        .filter(standing_category::Column::EnrollmentId.eq(id))
        .order_by_asc(standing_category::Column::Id)
        .all(&state.db)
        .await?;
    let scores = score_record::Entity::find()
        .filter(score_record::Column::EnrollmentId.eq(id))
        .order_by_asc(score_record::Column::ScoreDate)
        .order_by_asc(score_record::Column::Id)
        .all(&state.db)
        .await?;
    let exams = exam_score::Entity::find()
        .filter(exam_score::Column::EnrollmentId.eq(id))
        .order_by_asc(exam_score::Column::ExamType)
        .all(&state.db)
        .await?;

    let calc_categories: Vec<common::StandingCategory> =
        categories.iter().map(Into::into).collect();
    let mut calc_scores: Vec<common::ScoreRecord> = scores.iter().map(Into::into).collect();
    calc_scores.extend(exams.iter().map(common::ScoreRecord::from));
    let snapshot = grading::compute(&calc_categories, &calc_scores);

    Ok(Json(EnrollmentDetail {
        id: model.id,
        subject: subject.into(),
        professor_name: model.professor_name,
        schedule: model.schedule,
        remaining_allocation: grading::remaining_allocation(&calc_categories),
        categories: categories.into_iter().map(Into::into).collect(),
        scores: scores.into_iter().map(Into::into).collect(),
        exams: exams.into_iter().map(Into::into).collect(),
        performance: snapshot,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Enrollments",
    operation_id = "updateEnrollment",
    summary = "Update professor or schedule",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentRequest,
    responses(
        (status = 200, description = "Enrollment updated", body = EnrollmentSummary),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_enrollment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEnrollmentRequest>,
) -> Result<Json<EnrollmentSummary>, AppError> {
    auth_user.require_permission("grades:own")?;
    validate_update_enrollment(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;

    let mut active: enrollment::ActiveModel = existing.into();
    if let Some(ref name) = payload.professor_name {
        active.professor_name = Set(name.trim().to_string());
    }
    if let Some(schedule) = payload.schedule {
        active.schedule = Set(schedule.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    let mut summaries = summarize_enrollments(&state.db, vec![model]).await?;
    summaries
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal("Enrollment summary missing".into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Enrollments",
    operation_id = "deleteEnrollment",
    summary = "Drop an enrollment",
    description = "Permanently deletes the enrollment with its categories, scores and exams in one transaction.",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_enrollment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    delete_enrollment_rows(&txn, &[id]).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
