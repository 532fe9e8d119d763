use common::ExamType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Midterm or final exam score. At most one of each per enrollment.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exam_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "enrollment_exam")]
    pub enrollment_id: i32,
    #[sea_orm(belongs_to, from = "enrollment_id", to = "id")]
    pub enrollment: HasOne<super::enrollment::Entity>,

    #[sea_orm(unique_key = "enrollment_exam")]
    pub exam_type: ExamType,

    pub score_value: f64,
    pub max_score: f64,
    pub score_date: Option<Date>,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for common::ScoreRecord {
    fn from(model: &Model) -> Self {
        let record = common::ScoreRecord::exam(model.exam_type, model.score_value, model.max_score);
        match model.score_date {
            Some(date) => record.with_date(date),
            None => record,
        }
    }
}
