use crate::error::AppError;
use crate::utils::semester;
use serde::{Deserialize, Serialize};

/// Request body for student self-registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Institutional student number.
    #[schema(example = "23-00123")]
    pub student_number: String,
    #[schema(example = "Juan Dela Cruz")]
    pub fullname: String,
    /// Must end with the institutional domain.
    #[schema(example = "delacruz_juan@plpasig.edu.ph")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    #[schema(example = "BSIT")]
    pub course: String,
    #[schema(example = "2A")]
    pub section: String,
    /// `1st` or `2nd`.
    #[schema(example = "1st")]
    pub semester: String,
}

pub fn validate_register_request(
    payload: &RegisterRequest,
    email_domain: &str,
) -> Result<(), AppError> {
    let email = payload.email.trim().to_lowercase();
    let local = email.strip_suffix(&email_domain.to_lowercase()).unwrap_or("");
    if local.is_empty() || local.contains('@') || local.contains(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "Email must be an institutional address ending with {email_domain}"
        )));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    super::shared::validate_text(&payload.student_number, "Student number", 32)?;
    super::shared::validate_text(&payload.fullname, "Full name", 128)?;
    super::shared::validate_text(&payload.course, "Course", 64)?;
    super::shared::validate_text(&payload.section, "Section", 32)?;
    if !semester::is_registration_value(payload.semester.trim()) {
        return Err(AppError::Validation("Semester must be 1st or 2nd".into()));
    }
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "delacruz_juan@plpasig.edu.ph")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "delacruz_juan@plpasig.edu.ph")]
    pub email: String,
    #[schema(example = "Juan Dela Cruz")]
    pub fullname: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            fullname: user.fullname,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub fullname: String,
    #[schema(example = "student")]
    pub role: String,
    #[schema(example = json!(["grades:own", "message:send"]))]
    pub permissions: Vec<String>,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub email: String,
    pub fullname: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub student_number: Option<String>,
    pub course: Option<String>,
    pub section: Option<String>,
    pub semester: Option<String>,
}

impl MeResponse {
    pub fn new(user: crate::entity::user::Model, permissions: Vec<String>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            fullname: user.fullname,
            role: user.role,
            permissions,
            student_number: user.student_number,
            course: user.course,
            section: user.section,
            semester: user.semester,
        }
    }
}

/// Request body for a student's own profile change.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    /// `1st` or `2nd`.
    #[schema(example = "2nd")]
    pub semester: String,
}

pub fn validate_update_profile(payload: &UpdateProfileRequest) -> Result<(), AppError> {
    if !semester::is_registration_value(payload.semester.trim()) {
        return Err(AppError::Validation("Semester must be 1st or 2nd".into()));
    }
    Ok(())
}
