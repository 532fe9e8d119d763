use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "standing_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub enrollment_id: i32,
    #[sea_orm(belongs_to, from = "enrollment_id", to = "id")]
    pub enrollment: HasOne<super::enrollment::Entity>,

    pub name: String,
    /// Share of the 60-point class standing. Fixed at creation.
    pub weight_percent: f64,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::score_record::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for common::StandingCategory {
    fn from(model: &Model) -> Self {
        common::StandingCategory::new(model.id, model.name.clone(), model.weight_percent)
    }
}
