use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A class-standing score. Exams live in `exam_score`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "score_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub enrollment_id: i32,
    #[sea_orm(belongs_to, from = "enrollment_id", to = "id")]
    pub enrollment: HasOne<super::enrollment::Entity>,

    #[sea_orm(indexed)]
    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::standing_category::Entity>,

    /// Attendance records are named `Present` or `Absent`.
    pub score_name: String,
    pub score_value: f64,
    pub max_score: f64,
    pub score_date: Option<Date>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for common::ScoreRecord {
    fn from(model: &Model) -> Self {
        common::ScoreRecord {
            category_id: Some(model.category_id),
            score_type: common::ScoreType::ClassStanding,
            score_name: model.score_name.clone(),
            score_value: model.score_value,
            max_score: model.max_score,
            score_date: model.score_date,
        }
    }
}
