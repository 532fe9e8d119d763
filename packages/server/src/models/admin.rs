use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::entity::user;
use crate::models::enrollment::EnrollmentSummary;
use crate::models::shared::Pagination;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentListQuery {
    /// Case-insensitive match on name, email, student number, course or section.
    pub search: Option<String>,
    /// Substring match on the student's semester.
    pub semester: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Student profile as seen by an administrator.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentProfile {
    pub id: i32,
    pub email: String,
    pub fullname: String,
    pub student_number: Option<String>,
    pub course: Option<String>,
    pub section: Option<String>,
    pub semester: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for StudentProfile {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            fullname: m.fullname,
            student_number: m.student_number,
            course: m.course,
            section: m.section,
            semester: m.semester,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<StudentProfile>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentDetailResponse {
    pub profile: StudentProfile,
    pub enrollments: Vec<EnrollmentSummary>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResetPasswordResponse {
    pub message: String,
}
