use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archived_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub archived_subject_id: i32,
    #[sea_orm(belongs_to, from = "archived_subject_id", to = "id")]
    pub archived_subject: HasOne<super::archived_subject::Entity>,

    pub name: String,
    pub weight_percent: f64,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::archived_score::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for common::StandingCategory {
    fn from(model: &Model) -> Self {
        common::StandingCategory::new(model.id, model.name.clone(), model.weight_percent)
    }
}
