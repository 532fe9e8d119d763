use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, IntoCondition, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    activity_log, archived_subject, enrollment, message, role, system_log, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::enrollment::summarize_enrollments;
use crate::models::admin::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::enrollment::{delete_archive_rows, delete_enrollment_rows};
use crate::utils::hash;

async fn find_student<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Role.eq(role::STUDENT))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}

fn lower_like(column: user::Column, pattern: &str) -> impl IntoCondition {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Admin",
    operation_id = "listStudents",
    summary = "Search students",
    description = "Paginated student list, newest first. `search` matches name, email, student number, course and section case-insensitively. Requires `student:manage` permission.",
    params(StudentListQuery),
    responses(
        (status = 200, description = "Students", body = StudentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<StudentListResponse>, AppError> {
    auth_user.require_permission("student:manage")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = user::Entity::find().filter(user::Column::Role.eq(role::STUDENT));

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(lower_like(user::Column::Fullname, &pattern))
                    .add(lower_like(user::Column::Email, &pattern))
                    .add(lower_like(user::Column::StudentNumber, &pattern))
                    .add(lower_like(user::Column::Course, &pattern))
                    .add(lower_like(user::Column::Section, &pattern)),
            );
        }
    }
    if let Some(ref semester) = query.semester {
        let term = escape_like(semester.trim());
        if !term.is_empty() {
            select = select.filter(lower_like(
                user::Column::Semester,
                &format!("%{}%", term.to_lowercase()),
            ));
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(StudentListResponse {
        data: data.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Admin",
    operation_id = "getStudent",
    summary = "Student profile with live performance",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student detail", body = StudentDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentDetailResponse>, AppError> {
    auth_user.require_permission("student:manage")?;
    let student = find_student(&state.db, id).await?;

    let enrollments = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(id))
        .order_by_desc(enrollment::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(StudentDetailResponse {
        profile: student.into(),
        enrollments: summarize_enrollments(&state.db, enrollments).await?,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Admin",
    operation_id = "deleteStudent",
    summary = "Delete a student and all of their data",
    description = "Removes enrollments, grading data, archives, messages and activity in one transaction. Login history is kept without the user reference.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;

    let txn = state.db.begin().await?;
    find_student(&txn, id).await?;

    let enrollment_ids: Vec<i32> = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(id))
        .select_only()
        .column(enrollment::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;
    delete_enrollment_rows(&txn, &enrollment_ids).await?;

    let archive_ids: Vec<i32> = archived_subject::Entity::find()
        .filter(archived_subject::Column::StudentId.eq(id))
        .select_only()
        .column(archived_subject::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;
    delete_archive_rows(&txn, &archive_ids).await?;

    message::Entity::delete_many()
        .filter(
            Condition::any()
                .add(message::Column::SenderId.eq(id))
                .add(message::Column::ReceiverId.eq(id)),
        )
        .exec(&txn)
        .await?;
    activity_log::Entity::delete_many()
        .filter(activity_log::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    system_log::Entity::update_many()
        .col_expr(system_log::Column::UserId, Expr::value(Option::<i32>::None))
        .filter(system_log::Column::UserId.eq(id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        student_id = id,
        enrollments = enrollment_ids.len(),
        archives = archive_ids.len(),
        "Student deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/reset-password",
    tag = "Admin",
    operation_id = "resetStudentPassword",
    summary = "Reset a student's password",
    description = "Sets the password to the configured default.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Password reset", body = ResetPasswordResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn reset_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ResetPasswordResponse>, AppError> {
    auth_user.require_permission("student:manage")?;
    let student = find_student(&state.db, id).await?;

    let password_hash = hash::hash_password(&state.config.auth.default_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let mut active: user::ActiveModel = student.into();
    active.password = Set(password_hash);
    let student = active.update(&state.db).await?;

    info!(student_id = student.id, "Password reset to default");

    Ok(Json(ResetPasswordResponse {
        message: format!("Password for {} has been reset", student.email),
    }))
}
