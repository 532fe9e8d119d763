use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's active enrollment in a catalog subject.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "student_subject")]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::user::Entity>,

    #[sea_orm(unique_key = "student_subject")]
    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id")]
    pub subject: HasOne<super::subject::Entity>,

    pub professor_name: String,
    pub schedule: Option<String>,

    #[sea_orm(has_many)]
    pub categories: HasMany<super::standing_category::Entity>,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::score_record::Entity>,

    #[sea_orm(has_many)]
    pub exams: HasMany<super::exam_score::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
