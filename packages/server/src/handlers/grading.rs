use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::advice::{self, ActivityFacts};
use common::grading::{self, EXAM_WEIGHT};
use common::{ExamType, PerformanceSnapshot};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{activity_log, exam_score, score_record, standing_category};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::grading::*;
use crate::state::AppState;
use crate::utils::activity;
use crate::utils::enrollment::{
    find_category, find_owned_enrollment, find_owned_enrollment_for_update, find_score,
    find_subject,
};
use crate::utils::performance;

#[utoipa::path(
    post,
    path = "/{id}/categories",
    tag = "Grading",
    operation_id = "createCategory",
    summary = "Add a class-standing category",
    description = "Adds a weighted category. The weight must be positive and fit in what is left of the 60-point class standing.",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    // Row lock serializes concurrent allocations against the same ceiling.
    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;

    let existing: Vec<common::StandingCategory> = standing_category::Entity::find()
        .filter(standing_category::Column::EnrollmentId.eq(id))
        .all(&txn)
        .await?
        .iter()
        .map(Into::into)
        .collect();
    validate_create_category(&payload, grading::remaining_allocation(&existing))?;

    let model = standing_category::ActiveModel {
        enrollment_id: Set(id),
        name: Set(payload.name.trim().to_string()),
        weight_percent: Set(payload.weight),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    activity::record(&txn, auth_user.user_id, id, activity::ADD_CATEGORY).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(model))))
}

#[utoipa::path(
    delete,
    path = "/{id}/categories/{category_id}",
    tag = "Grading",
    operation_id = "deleteCategory",
    summary = "Delete a category and its scores",
    params(
        ("id" = i32, Path, description = "Enrollment ID"),
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment or category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, category_id))]
pub async fn delete_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, category_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    find_category(&txn, id, category_id).await?;

    score_record::Entity::delete_many()
        .filter(score_record::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    standing_category::Entity::delete_by_id(category_id)
        .exec(&txn)
        .await?;
    activity::record(&txn, auth_user.user_id, id, activity::DELETE_CATEGORY).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/scores",
    tag = "Grading",
    operation_id = "createScore",
    summary = "Record a class-standing score",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = CreateScoreRequest,
    responses(
        (status = 201, description = "Score recorded", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment or category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, category_id = payload.category_id))]
pub async fn create_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;
    validate_create_score(&payload)?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    find_category(&txn, id, payload.category_id).await?;

    let model = score_record::ActiveModel {
        enrollment_id: Set(id),
        category_id: Set(payload.category_id),
        score_name: Set(payload.name.trim().to_string()),
        score_value: Set(payload.value),
        max_score: Set(payload.max_score),
        score_date: Set(payload.date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    activity::record(&txn, auth_user.user_id, id, activity::ADD_SCORE).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(ScoreResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/attendance",
    tag = "Grading",
    operation_id = "recordAttendance",
    summary = "Record attendance for a day",
    description = "Stores a `Present` (1/1) or `Absent` (0/1) record in the given category. One record per category per day.",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = AttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment or category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already recorded for that date (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, date = %payload.date))]
pub async fn record_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    find_category(&txn, id, payload.category_id).await?;

    let duplicate = score_record::Entity::find()
        .filter(score_record::Column::CategoryId.eq(payload.category_id))
        .filter(score_record::Column::ScoreDate.eq(payload.date))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Attendance already recorded for {}",
            payload.date
        )));
    }

    let (name, value) = payload.status.record();
    let model = score_record::ActiveModel {
        enrollment_id: Set(id),
        category_id: Set(payload.category_id),
        score_name: Set(name.to_string()),
        score_value: Set(value),
        max_score: Set(1.0),
        score_date: Set(Some(payload.date)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    activity::record(&txn, auth_user.user_id, id, activity::RECORD_ATTENDANCE).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(ScoreResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}/scores/{score_id}",
    tag = "Grading",
    operation_id = "updateScore",
    summary = "Change a score's value",
    params(
        ("id" = i32, Path, description = "Enrollment ID"),
        ("score_id" = i32, Path, description = "Score ID"),
    ),
    request_body = UpdateScoreRequest,
    responses(
        (status = 200, description = "Score updated", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment or score not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, score_id))]
pub async fn update_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, score_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    let existing = find_score(&txn, id, score_id).await?;
    validate_score_values(payload.value, existing.max_score)?;
    let category = find_category(&txn, id, existing.category_id).await?;
    let attendance = common::StandingCategory::from(&category).is_attendance();

    let mut active: score_record::ActiveModel = existing.into();
    if attendance {
        // Attendance is scored by name, so the name has to follow the value.
        let (name, value) = AttendanceStatus::from_value(payload.value)
            .ok_or_else(|| {
                AppError::Validation(
                    "Attendance records take 1 (present) or 0 (absent)".into(),
                )
            })?
            .record();
        active.score_name = Set(name.to_string());
        active.score_value = Set(value);
    } else {
        active.score_value = Set(payload.value);
    }
    let model = active.update(&txn).await?;
    activity::record(&txn, auth_user.user_id, id, activity::UPDATE_SCORE).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/scores/{score_id}",
    tag = "Grading",
    operation_id = "deleteScore",
    summary = "Delete a score",
    params(
        ("id" = i32, Path, description = "Enrollment ID"),
        ("score_id" = i32, Path, description = "Score ID"),
    ),
    responses(
        (status = 204, description = "Score deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment or score not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, score_id))]
pub async fn delete_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, score_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    find_score(&txn, id, score_id).await?;
    score_record::Entity::delete_by_id(score_id).exec(&txn).await?;
    activity::record(&txn, auth_user.user_id, id, activity::DELETE_SCORE).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/exams/{exam_type}",
    tag = "Grading",
    operation_id = "putExam",
    summary = "Set the midterm or final exam score",
    description = "Creates the exam score or replaces the existing one. Each exam contributes up to 20 points.",
    params(
        ("id" = i32, Path, description = "Enrollment ID"),
        ("exam_type" = ExamType, Path, description = "`midterm` or `final`"),
    ),
    request_body = ExamRequest,
    responses(
        (status = 200, description = "Exam score stored", body = ExamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, exam_type = %exam_type))]
pub async fn put_exam(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, exam_type)): Path<(i32, ExamType)>,
    AppJson(payload): AppJson<ExamRequest>,
) -> Result<Json<ExamResponse>, AppError> {
    auth_user.require_permission("grades:own")?;
    validate_score_values(payload.value, payload.max_score)?;

    find_owned_enrollment(&state.db, auth_user.user_id, id).await?;

    let model = exam_score::ActiveModel {
        enrollment_id: Set(id),
        exam_type: Set(exam_type),
        score_value: Set(payload.value),
        max_score: Set(payload.max_score),
        score_date: Set(payload.date),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let txn = state.db.begin().await?;
    let stored = exam_score::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([exam_score::Column::EnrollmentId, exam_score::Column::ExamType])
                .update_columns([
                    exam_score::Column::ScoreValue,
                    exam_score::Column::MaxScore,
                    exam_score::Column::ScoreDate,
                    exam_score::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(&txn)
        .await?;
    activity::record(&txn, auth_user.user_id, id, activity::SET_EXAM).await?;
    txn.commit().await?;

    Ok(Json(stored.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/exams/{exam_type}",
    tag = "Grading",
    operation_id = "deleteExam",
    summary = "Clear the midterm or final exam score",
    params(
        ("id" = i32, Path, description = "Enrollment ID"),
        ("exam_type" = ExamType, Path, description = "`midterm` or `final`"),
    ),
    responses(
        (status = 204, description = "Exam score deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment or exam not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, exam_type = %exam_type))]
pub async fn delete_exam(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, exam_type)): Path<(i32, ExamType)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;

    let txn = state.db.begin().await?;
    find_owned_enrollment_for_update(&txn, auth_user.user_id, id).await?;
    let result = exam_score::Entity::delete_many()
        .filter(exam_score::Column::EnrollmentId.eq(id))
        .filter(exam_score::Column::ExamType.eq(exam_type))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "No {} score recorded",
            exam_type.display_name()
        )));
    }
    activity::record(&txn, auth_user.user_id, id, activity::DELETE_EXAM).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/performance",
    tag = "Grading",
    operation_id = "getPerformance",
    summary = "Compute the performance snapshot",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Current snapshot", body = PerformanceSnapshot),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_performance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PerformanceSnapshot>, AppError> {
    auth_user.require_permission("grades:own")?;
    find_owned_enrollment(&state.db, auth_user.user_id, id).await?;
    Ok(Json(performance::snapshot(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/advice",
    tag = "Grading",
    operation_id = "getAdvice",
    summary = "Insights, interventions and recommendations",
    description = "Rule-based advice derived from the snapshot, attendance, weak categories and the student's recent activity on this enrollment.",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Advice", body = AdviceResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_advice(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AdviceResponse>, AppError> {
    auth_user.require_permission("grades:own")?;
    let enrollment = find_owned_enrollment(&state.db, auth_user.user_id, id).await?;
    let subject = find_subject(&state.db, enrollment.subject_id).await?;

    let inputs = performance::load(&state.db, id).await?;
    let snapshot = inputs.snapshot();

    let activity_filter = Condition::all()
        .add(activity_log::Column::StudentId.eq(auth_user.user_id))
        .add(activity_log::Column::EnrollmentId.eq(id));
    let activity_count = activity_log::Entity::find()
        .filter(activity_filter.clone())
        .count(&state.db)
        .await?;
    let last_activity = activity_log::Entity::find()
        .filter(activity_filter)
        .order_by_desc(activity_log::Column::CreatedAt)
        .one(&state.db)
        .await?;

    let now = chrono::Utc::now();
    let today = now.date_naive();
    let mut score_dates: Vec<_> = inputs.scores.iter().filter_map(|s| s.score_date).collect();
    score_dates.sort();

    let facts = ActivityFacts {
        activity_count: activity_count as usize,
        score_count: inputs.scores.len(),
        average_percent: inputs.average_percent(),
        days_since_last_activity: last_activity.map(|a| (now - a.created_at).num_days()),
        score_dates,
    };
    let weak = inputs.weak_categories(advice::WEAK_CATEGORY_PERCENT);

    Ok(Json(AdviceResponse {
        risk_level: snapshot.risk_level,
        insights: advice::insights(&facts),
        interventions: advice::interventions(
            snapshot.risk_level,
            &subject.name,
            inputs.attendance(),
        ),
        recommendations: advice::recommendations(
            snapshot.overall_grade,
            &subject.name,
            &weak,
            advice::has_recent_scores(&facts.score_dates, today),
        ),
    }))
}

/// Points of the overall grade not yet backed by any score.
fn remaining_weight(snapshot: &PerformanceSnapshot) -> f64 {
    let empty_categories: f64 = snapshot
        .categories
        .iter()
        .filter(|c| c.record_count == 0)
        .map(|c| c.weight_percent)
        .sum();
    let missing_exams = [snapshot.midterm_recorded, snapshot.final_recorded]
        .iter()
        .filter(|recorded| !**recorded)
        .count() as f64;
    empty_categories + missing_exams * EXAM_WEIGHT
}

#[utoipa::path(
    get,
    path = "/{id}/projection",
    tag = "Grading",
    operation_id = "getProjection",
    summary = "Project the final grade",
    description = "Projects the final grade from the current one and the weight still open, and reports the percentage of that weight needed to reach the target grade.",
    params(("id" = i32, Path, description = "Enrollment ID"), ProjectionQuery),
    responses(
        (status = 200, description = "Projection", body = ProjectionResponse),
        (status = 400, description = "Invalid target (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_projection(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<ProjectionResponse>, AppError> {
    auth_user.require_permission("grades:own")?;
    validate_projection_query(&query)?;
    find_owned_enrollment(&state.db, auth_user.user_id, id).await?;

    let snapshot = performance::snapshot(&state.db, id).await?;
    let remaining = remaining_weight(&snapshot);
    let outlook = query.outlook.unwrap_or_default();
    let target = query.target.unwrap_or(DEFAULT_TARGET_GRADE);
    let projected = advice::project_final_grade(snapshot.overall_grade, remaining, outlook);

    Ok(Json(ProjectionResponse {
        current_grade: snapshot.overall_grade,
        remaining_weight: remaining,
        outlook,
        projected_grade: projected,
        projected_risk: grading::band_for(projected).risk,
        target_grade: target,
        required_percentage: advice::required_performance(
            snapshot.overall_grade,
            remaining,
            target,
        ),
        target_reachable: snapshot.overall_grade + remaining >= target,
    }))
}
