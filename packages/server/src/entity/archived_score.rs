use common::ScoreType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Class-standing and exam scores share one archive table, told apart by `score_type`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archived_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub archived_subject_id: i32,
    #[sea_orm(belongs_to, from = "archived_subject_id", to = "id")]
    pub archived_subject: HasOne<super::archived_subject::Entity>,

    /// NULL for exams.
    pub archived_category_id: Option<i32>,
    #[sea_orm(belongs_to, from = "archived_category_id", to = "id")]
    pub archived_category: HasOne<super::archived_category::Entity>,

    pub score_type: ScoreType,
    pub score_name: String,
    pub score_value: f64,
    pub max_score: f64,
    pub score_date: Option<Date>,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for common::ScoreRecord {
    fn from(model: &Model) -> Self {
        common::ScoreRecord {
            category_id: model.archived_category_id,
            score_type: model.score_type,
            score_name: model.score_name.clone(),
            score_value: model.score_value,
            max_score: model.max_score,
            score_date: model.score_date,
        }
    }
}
