use chrono::{DateTime, NaiveDate, Utc};
use common::advice::{Advice, Outlook};
use common::grading::{CLASS_STANDING_CEILING, fits_allocation};
use common::{ExamType, RiskLevel};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::entity::{exam_score, score_record, standing_category};
use crate::error::AppError;
use crate::models::shared::{validate_finite, validate_text};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Quizzes")]
    pub name: String,
    /// Share of the 60-point class standing.
    #[schema(example = 20.0)]
    pub weight: f64,
}

pub fn validate_create_category(
    payload: &CreateCategoryRequest,
    remaining_allocation: f64,
) -> Result<(), AppError> {
    validate_text(&payload.name, "Category name", 64)?;
    validate_finite(payload.weight, "Weight")?;
    if payload.weight <= 0.0 {
        return Err(AppError::Validation("Weight must be greater than 0".into()));
    }
    if !fits_allocation(payload.weight, remaining_allocation) {
        return Err(AppError::Validation(format!(
            "Weight exceeds the remaining allocation of {}% (class standing is capped at {}%)",
            remaining_allocation, CLASS_STANDING_CEILING
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub weight_percent: f64,
    pub created_at: DateTime<Utc>,
}

impl From<standing_category::Model> for CategoryResponse {
    fn from(m: standing_category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            weight_percent: m.weight_percent,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateScoreRequest {
    pub category_id: i32,
    #[schema(example = "Quiz 1")]
    pub name: String,
    #[schema(example = 18.0)]
    pub value: f64,
    #[schema(example = 20.0)]
    pub max_score: f64,
    pub date: Option<NaiveDate>,
}

pub fn validate_create_score(payload: &CreateScoreRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "Score name", 128)?;
    validate_score_values(payload.value, payload.max_score)
}

/// `0 <= value <= max` and `max > 0`.
pub fn validate_score_values(value: f64, max_score: f64) -> Result<(), AppError> {
    validate_finite(value, "Score")?;
    validate_finite(max_score, "Max score")?;
    if max_score <= 0.0 {
        return Err(AppError::Validation("Max score must be greater than 0".into()));
    }
    if value < 0.0 {
        return Err(AppError::Validation("Score must not be negative".into()));
    }
    if value > max_score {
        return Err(AppError::Validation(
            "Score must not exceed the max score".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateScoreRequest {
    #[schema(example = 19.0)]
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Stored score name and value.
    pub fn record(&self) -> (&'static str, f64) {
        match self {
            Self::Present => (common::grading::PRESENT, 1.0),
            Self::Absent => (common::grading::ABSENT, 0.0),
        }
    }

    /// Status for an edited attendance value; only 1 and 0 are meaningful.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 1.0 {
            Some(Self::Present)
        } else if value == 0.0 {
            Some(Self::Absent)
        } else {
            None
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AttendanceRequest {
    pub category_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub value: f64,
    pub max_score: f64,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<score_record::Model> for ScoreResponse {
    fn from(m: score_record::Model) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            name: m.score_name,
            value: m.score_value,
            max_score: m.max_score,
            date: m.score_date,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ExamRequest {
    #[schema(example = 45.0)]
    pub value: f64,
    #[schema(example = 50.0)]
    pub max_score: f64,
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExamResponse {
    pub id: i32,
    pub exam_type: ExamType,
    pub value: f64,
    pub max_score: f64,
    pub date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<exam_score::Model> for ExamResponse {
    fn from(m: exam_score::Model) -> Self {
        Self {
            id: m.id,
            exam_type: m.exam_type,
            value: m.score_value,
            max_score: m.max_score,
            date: m.score_date,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdviceResponse {
    pub risk_level: RiskLevel,
    pub insights: Vec<Advice>,
    pub interventions: Vec<Advice>,
    pub recommendations: Vec<Advice>,
}

/// Grade the projection aims for when no target is given.
pub const DEFAULT_TARGET_GRADE: f64 = 89.0;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectionQuery {
    /// Target overall grade (0-100). Defaults to 89, the lowest low-risk grade.
    pub target: Option<f64>,
    /// `improve`, `maintain` (default) or `decline`.
    pub outlook: Option<Outlook>,
}

pub fn validate_projection_query(query: &ProjectionQuery) -> Result<(), AppError> {
    if let Some(target) = query.target
        && !(0.0..=100.0).contains(&target)
    {
        return Err(AppError::Validation("Target must be between 0 and 100".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectionResponse {
    pub current_grade: f64,
    /// Points not yet backed by any score: empty categories and missing exams.
    pub remaining_weight: f64,
    pub outlook: Outlook,
    pub projected_grade: f64,
    pub projected_risk: RiskLevel,
    pub target_grade: f64,
    /// Percentage of the remaining weight needed to hit the target.
    pub required_percentage: f64,
    /// Whether the target is reachable even with perfect remaining scores.
    pub target_reachable: bool,
}
