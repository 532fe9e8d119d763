use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub fullname: String,

    #[sea_orm(indexed)]
    pub role: String,
    #[sea_orm(belongs_to, from = "role", to = "name")]
    pub role_ref: HasOne<super::role::Entity>,

    /// Student-only profile fields; admins leave them empty.
    #[sea_orm(unique)]
    pub student_number: Option<String>,
    pub course: Option<String>,
    pub section: Option<String>,
    pub semester: Option<String>,

    #[sea_orm(has_many)]
    pub enrollments: HasMany<super::enrollment::Entity>,

    #[sea_orm(has_many)]
    pub archived_subjects: HasMany<super::archived_subject::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
