use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An enrollment moved out of the active set. Restorable.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archived_subject")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::user::Entity>,

    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id")]
    pub subject: HasOne<super::subject::Entity>,

    pub professor_name: String,
    pub schedule: Option<String>,

    #[sea_orm(has_many)]
    pub categories: HasMany<super::archived_category::Entity>,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::archived_score::Entity>,

    #[sea_orm(has_one)]
    pub performance: HasOne<super::archived_performance::Entity>,

    /// When the original enrollment was created.
    pub enrolled_at: DateTimeUtc,
    pub archived_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
