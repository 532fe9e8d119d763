use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One grade mutation by a student. Feeds the behavioral insights.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub student_id: i32,
    /// Not a foreign key; the log outlives archived enrollments.
    pub enrollment_id: i32,
    pub action: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
