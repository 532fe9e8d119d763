use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Record and read one's own grades.
pub const GRADES_OWN: &str = "grades:own";
pub const MESSAGE_SEND: &str = "message:send";
pub const STUDENT_MANAGE: &str = "student:manage";
pub const REPORT_VIEW: &str = "report:view";
pub const LOG_VIEW: &str = "log:view";
pub const SUBJECT_MANAGE: &str = "subject:manage";

/// Grants a permission to every account of a role. Tokens carry the list at login.

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role_permission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub role: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub permission: String,
    #[sea_orm(belongs_to, from = "role", to = "name")]
    pub role_ref: HasOne<super::role::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
