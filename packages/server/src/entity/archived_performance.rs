use common::RiskLevel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot cached at archive time.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archived_performance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub archived_subject_id: i32,
    #[sea_orm(belongs_to, from = "archived_subject_id", to = "id")]
    pub archived_subject: HasOne<super::archived_subject::Entity>,

    pub class_standing_total: f64,
    pub midterm_contribution: f64,
    pub final_contribution: f64,
    pub exam_total: f64,
    pub overall_grade: f64,
    pub gpa: f64,
    pub risk_level: RiskLevel,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
