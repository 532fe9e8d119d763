use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{role, role_permission, system_log, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    UpdateProfileRequest, validate_login_request, validate_register_request,
    validate_update_profile,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a student account",
    description = "Creates a student account. The email must use the institutional domain.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email or student number taken (EMAIL_TAKEN, CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload, &state.config.auth.email_domain)?;

    let email = payload.email.trim().to_lowercase();
    let student_number = payload.student_number.trim().to_string();

    let email_taken = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if email_taken {
        return Err(AppError::EmailTaken);
    }
    let number_taken = user::Entity::find()
        .filter(user::Column::StudentNumber.eq(&student_number))
        .one(&state.db)
        .await?
        .is_some();
    if number_taken {
        return Err(AppError::Conflict("Student number is already registered".into()));
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        email: Set(email.clone()),
        password: Set(hash),
        fullname: Set(payload.fullname.trim().to_string()),
        role: Set(role::STUDENT.to_string()),
        student_number: Set(Some(student_number)),
        course: Set(Some(payload.course.trim().to_string())),
        section: Set(Some(payload.section.trim().to_string())),
        semester: Set(Some(payload.semester.trim().to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            if detail.contains("email") {
                AppError::EmailTaken
            } else {
                AppError::Conflict("Student number is already registered".into())
            }
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with email and password",
    description = "Returns a bearer token. Every attempt is written to the system log.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim().to_lowercase();

    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
    else {
        write_system_log(&state.db, None, &email, None, system_log::LOGIN_FAILED).await?;
        return Err(AppError::InvalidCredentials);
    };

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        write_system_log(
            &state.db,
            Some(user.id),
            &user.email,
            Some(&user.role),
            system_log::LOGIN_FAILED,
        )
        .await?;
        return Err(AppError::InvalidCredentials);
    }

    let role_perms = role_permission::Entity::find()
        .filter(role_permission::Column::Role.eq(&user.role))
        .all(&state.db)
        .await?;

    let permissions: Vec<String> = role_perms.into_iter().map(|rp| rp.permission).collect();

    let token = jwt::sign(
        user.id,
        &user.email,
        &user.role,
        permissions.clone(),
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    write_system_log(
        &state.db,
        Some(user.id),
        &user.email,
        Some(&user.role),
        system_log::LOGIN,
    )
    .await?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        email: user.email,
        fullname: user.fullname,
        role: user.role,
        permissions,
    }))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Log out",
    description = "Records the logout in the system log. Tokens are stateless; the client discards its token.",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    write_system_log(
        &state.db,
        Some(auth_user.user_id),
        &auth_user.email,
        Some(&auth_user.role),
        system_log::LOGOUT,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AppError> {
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse::new(user, auth_user.permissions)))
}

#[utoipa::path(
    patch,
    path = "/me",
    tag = "Auth",
    operation_id = "updateCurrentUser",
    summary = "Change my semester",
    description = "Moves a student to another semester, which changes the subjects offered by `/enrollments/available`. Requires `grades:own` permission.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, semester = %payload.semester))]
pub async fn update_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<MeResponse>, AppError> {
    auth_user.require_permission("grades:own")?;
    validate_update_profile(&payload)?;

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: user::ActiveModel = user.into();
    active.semester = Set(Some(payload.semester.trim().to_string()));
    let user = active.update(&state.db).await?;

    info!(semester = ?user.semester, "Semester updated");

    Ok(Json(MeResponse::new(user, auth_user.permissions)))
}

async fn write_system_log<C: ConnectionTrait>(
    db: &C,
    user_id: Option<i32>,
    email: &str,
    role: Option<&str>,
    action: &str,
) -> Result<(), DbErr> {
    system_log::ActiveModel {
        user_id: Set(user_id),
        email: Set(email.to_string()),
        role: Set(role.map(str::to_string)),
        action: Set(action.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
