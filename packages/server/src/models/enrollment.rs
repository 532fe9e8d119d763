use chrono::{DateTime, Utc};
use common::PerformanceSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::grading::{CategoryResponse, ExamResponse, ScoreResponse};
use crate::models::shared::{double_option, validate_text};
use crate::models::subject::SubjectResponse;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEnrollmentRequest {
    #[schema(example = 3)]
    pub subject_id: i32,
    #[schema(example = "Prof. Maria Santos")]
    pub professor_name: String,
    #[schema(example = "MWF 9:00-10:30")]
    pub schedule: Option<String>,
}

pub fn validate_create_enrollment(payload: &CreateEnrollmentRequest) -> Result<(), AppError> {
    validate_text(&payload.professor_name, "Professor name", 128)?;
    if let Some(schedule) = &payload.schedule {
        validate_schedule(schedule)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateEnrollmentRequest {
    pub professor_name: Option<String>,
    /// Send `null` to clear the schedule.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub schedule: Option<Option<String>>,
}

pub fn validate_update_enrollment(payload: &UpdateEnrollmentRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.professor_name {
        validate_text(name, "Professor name", 128)?;
    }
    if let Some(Some(schedule)) = &payload.schedule {
        validate_schedule(schedule)?;
    }
    Ok(())
}

fn validate_schedule(schedule: &str) -> Result<(), AppError> {
    if schedule.chars().count() > 128 {
        return Err(AppError::Validation(
            "Schedule must be at most 128 characters".into(),
        ));
    }
    Ok(())
}

/// Enrollment with its live performance.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EnrollmentSummary {
    pub id: i32,
    pub subject: SubjectResponse,
    pub professor_name: String,
    pub schedule: Option<String>,
    pub performance: PerformanceSnapshot,
    pub created_at: DateTime<Utc>,
}

/// Full grading state of one enrollment.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EnrollmentDetail {
    pub id: i32,
    pub subject: SubjectResponse,
    pub professor_name: String,
    pub schedule: Option<String>,
    pub categories: Vec<CategoryResponse>,
    /// Class-standing scores, attendance included.
    pub scores: Vec<ScoreResponse>,
    pub exams: Vec<ExamResponse>,
    pub performance: PerformanceSnapshot,
    /// Class-standing weight still available for new categories.
    #[schema(example = 25.0)]
    pub remaining_allocation: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
