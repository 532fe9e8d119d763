use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ScoreType;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    archived_category, archived_performance, archived_score, archived_subject, enrollment,
    exam_score, score_record, standing_category, subject,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::archive::*;
use crate::state::AppState;
use crate::utils::enrollment::{
    delete_archive_rows, delete_enrollment_rows, find_owned_archive,
    find_owned_enrollment_for_update,
};
use crate::utils::performance;

#[utoipa::path(
    post,
    path = "/{id}/archive",
    tag = "Archives",
    operation_id = "archiveEnrollment",
    summary = "Archive an enrollment",
    description = "Moves the enrollment, its categories, scores, exams and the current snapshot into the archive in one transaction.",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 201, description = "Enrollment archived", body = ArchiveResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn archive_enrollment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    let active = find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    let inputs = performance::load(&txn, id).await?;
    let snapshot = inputs.snapshot();
    let now = chrono::Utc::now();

    let archive = archived_subject::ActiveModel {
        student_id: Set(active.student_id),
        subject_id: Set(active.subject_id),
        professor_name: Set(active.professor_name.clone()),
        schedule: Set(active.schedule.clone()),
        enrolled_at: Set(active.created_at),
        archived_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let categories = standing_category::Entity::find()
        .filter(standing_category::Column::EnrollmentId.eq(id))
        .order_by_asc(standing_category::Column::Id)
        .all(&txn)
        .await?;
    let mut category_ids = HashMap::with_capacity(categories.len());
    for category in categories {
        let copy = archived_category::ActiveModel {
            archived_subject_id: Set(archive.id),
            name: Set(category.name),
            weight_percent: Set(category.weight_percent),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        category_ids.insert(category.id, copy.id);
    }

    let scores = score_record::Entity::find()
        .filter(score_record::Column::EnrollmentId.eq(id))
        .order_by_asc(score_record::Column::Id)
        .all(&txn)
        .await?;
    let exams = exam_score::Entity::find()
        .filter(exam_score::Column::EnrollmentId.eq(id))
        .all(&txn)
        .await?;

    let mut copies: Vec<archived_score::ActiveModel> = scores
        .into_iter()
        .map(|s| archived_score::ActiveModel {
            archived_subject_id: Set(archive.id),
            archived_category_id: Set(category_ids.get(&s.category_id).copied()),
            score_type: Set(ScoreType::ClassStanding),
            score_name: Set(s.score_name),
            score_value: Set(s.score_value),
            max_score: Set(s.max_score),
            score_date: Set(s.score_date),
            ..Default::default()
        })
        .collect();
    copies.extend(exams.into_iter().map(|e| archived_score::ActiveModel {
        archived_subject_id: Set(archive.id),
        archived_category_id: Set(None),
        score_type: Set(e.exam_type.score_type()),
        score_name: Set(e.exam_type.display_name().to_string()),
        score_value: Set(e.score_value),
        max_score: Set(e.max_score),
        score_date: Set(e.score_date),
        ..Default::default()
    }));
    if !copies.is_empty() {
        archived_score::Entity::insert_many(copies)
            .exec_without_returning(&txn)
            .await?;
    }

    archived_performance::ActiveModel {
        archived_subject_id: Set(archive.id),
        class_standing_total: Set(snapshot.class_standing_total),
        midterm_contribution: Set(snapshot.midterm_contribution),
        final_contribution: Set(snapshot.final_contribution),
        exam_total: Set(snapshot.exam_total),
        overall_grade: Set(snapshot.overall_grade),
        gpa: Set(snapshot.gpa),
        risk_level: Set(snapshot.risk_level),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    delete_enrollment_rows(&txn, &[id]).await?;
    txn.commit().await?;

    info!(archived_subject_id = archive.id, "Enrollment archived");

    Ok((
        StatusCode::CREATED,
        Json(ArchiveResponse {
            archived_subject_id: archive.id,
            performance: snapshot,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Archives",
    operation_id = "listArchives",
    summary = "List my archived subjects",
    description = "Newest first. Each entry carries the snapshot cached at archive time.",
    responses(
        (status = 200, description = "Archived subjects", body = Vec<ArchivedSubjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_archives(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ArchivedSubjectResponse>>, AppError> {
    auth_user.require_permission("grades:own")?;

    let archives = archived_subject::Entity::find()
        .filter(archived_subject::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(archived_subject::Column::ArchivedAt)
        .order_by_desc(archived_subject::Column::Id)
        .all(&state.db)
        .await?;

    let subject_ids: Vec<i32> = archives.iter().map(|a| a.subject_id).collect();
    let subjects: HashMap<i32, subject::Model> = subject::Entity::find()
        .filter(subject::Column::Id.is_in(subject_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut out = Vec::with_capacity(archives.len());
    for archive in archives {
        let subject = subjects
            .get(&archive.subject_id)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("Subject {} missing", archive.subject_id)))?;
        let performance = performance::archived_snapshot(&state.db, archive.id).await?;
        out.push(ArchivedSubjectResponse {
            id: archive.id,
            subject: subject.into(),
            professor_name: archive.professor_name,
            schedule: archive.schedule,
            performance,
            enrolled_at: archive.enrolled_at,
            archived_at: archive.archived_at,
        });
    }

    Ok(Json(out))
}

#[utoipa::path(
    post,
    path = "/{id}/restore",
    tag = "Archives",
    operation_id = "restoreArchive",
    summary = "Restore an archived subject",
    description = "Recreates the enrollment with its categories, scores and exams, then removes the archive entry. Fails when the subject is already actively enrolled.",
    params(("id" = i32, Path, description = "Archived subject ID")),
    responses(
        (status = 201, description = "Enrollment restored", body = RestoreResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Archived subject not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Subject already enrolled (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn restore_archive(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    let archive = find_owned_archive(&txn, auth_user.user_id, id).await?;

    let already_enrolled = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(auth_user.user_id))
        .filter(enrollment::Column::SubjectId.eq(archive.subject_id))
        .one(&txn)
        .await?
        .is_some();
    if already_enrolled {
        return Err(AppError::Conflict(
            "Subject is already actively enrolled".into(),
        ));
    }

    let now = chrono::Utc::now();
    let restored = enrollment::ActiveModel {
        student_id: Set(archive.student_id),
        subject_id: Set(archive.subject_id),
        professor_name: Set(archive.professor_name.clone()),
        schedule: Set(archive.schedule.clone()),
        created_at: Set(archive.enrolled_at),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Subject is already actively enrolled"))?;

    let categories = archived_category::Entity::find()
        .filter(archived_category::Column::ArchivedSubjectId.eq(id))
        .order_by_asc(archived_category::Column::Id)
        .all(&txn)
        .await?;
    let mut category_ids = HashMap::with_capacity(categories.len());
    for category in categories {
        let copy = standing_category::ActiveModel {
            enrollment_id: Set(restored.id),
            name: Set(category.name),
            weight_percent: Set(category.weight_percent),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        category_ids.insert(category.id, copy.id);
    }

    let scores = archived_score::Entity::find()
        .filter(archived_score::Column::ArchivedSubjectId.eq(id))
        .order_by_asc(archived_score::Column::Id)
        .all(&txn)
        .await?;

    let mut standing = Vec::new();
    let mut exams = Vec::new();
    for score in scores {
        if let Some(exam_type) = common::ExamType::from_score_type(score.score_type) {
            exams.push(exam_score::ActiveModel {
                enrollment_id: Set(restored.id),
                exam_type: Set(exam_type),
                score_value: Set(score.score_value),
                max_score: Set(score.max_score),
                score_date: Set(score.score_date),
                updated_at: Set(now),
                ..Default::default()
            });
            continue;
        }
        // Class-standing scores whose category did not survive are dropped.
        let Some(category_id) = score
            .archived_category_id
            .and_then(|old| category_ids.get(&old).copied())
        else {
            continue;
        };
        standing.push(score_record::ActiveModel {
            enrollment_id: Set(restored.id),
            category_id: Set(category_id),
            score_name: Set(score.score_name),
            score_value: Set(score.score_value),
            max_score: Set(score.max_score),
            score_date: Set(score.score_date),
            created_at: Set(now),
            ..Default::default()
        });
    }
    if !standing.is_empty() {
        score_record::Entity::insert_many(standing)
            .exec_without_returning(&txn)
            .await?;
    }
    if !exams.is_empty() {
        exam_score::Entity::insert_many(exams)
            .exec_without_returning(&txn)
            .await?;
    }

    delete_archive_rows(&txn, &[id]).await?;
    txn.commit().await?;

    info!(enrollment_id = restored.id, "Archived subject restored");

    Ok((
        StatusCode::CREATED,
        Json(RestoreResponse {
            enrollment_id: restored.id,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Archives",
    operation_id = "deleteArchive",
    summary = "Permanently delete an archived subject",
    params(("id" = i32, Path, description = "Archived subject ID")),
    responses(
        (status = 204, description = "Archived subject deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Archived subject not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_archive(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_archive(&txn, auth_user.user_id, id).await?;
    delete_archive_rows(&txn, &[id]).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
