use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog entry shared by every student.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subject")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub credits: i32,
    /// `First Semester` or `Second Semester`.
    #[sea_orm(indexed)]
    pub semester: String,

    #[sea_orm(has_many)]
    pub enrollments: HasMany<super::enrollment::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
