use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::error::AppError;
use crate::models::shared::validate_text;
use crate::utils::semester::Term;

/// Catalog subject.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct SubjectResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "IT 102")]
    pub code: String,
    #[schema(example = "Quantitative Methods")]
    pub name: String,
    #[schema(example = 3)]
    pub credits: i32,
    #[schema(example = "First Semester")]
    pub semester: String,
}

impl From<crate::entity::subject::Model> for SubjectResponse {
    fn from(m: crate::entity::subject::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            name: m.name,
            credits: m.credits,
            semester: m.semester,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubjectListQuery {
    /// Semester filter; accepts `1st`, `1st Semester` or `First Semester` (and 2nd).
    pub semester: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "IT 401")]
    pub code: String,
    #[schema(example = "Capstone Project I")]
    pub name: String,
    #[schema(example = 3)]
    pub credits: i32,
    #[schema(example = "First Semester")]
    pub semester: String,
}

pub fn validate_create_subject(payload: &CreateSubjectRequest) -> Result<(), AppError> {
    validate_text(&payload.code, "Subject code", 32)?;
    validate_text(&payload.name, "Subject name", 256)?;
    if !(1..=10).contains(&payload.credits) {
        return Err(AppError::Validation("Credits must be 1-10".into()));
    }
    if Term::parse(&payload.semester).is_none() {
        return Err(AppError::Validation(
            "Semester must be First Semester or Second Semester".into(),
        ));
    }
    Ok(())
}
