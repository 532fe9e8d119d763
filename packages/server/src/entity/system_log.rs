use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";
pub const LOGIN_FAILED: &str = "login_failed";

/// Authentication audit trail.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// NULL when a login attempt names an unknown email.
    pub user_id: Option<i32>,
    pub email: String,
    pub role: Option<String>,
    /// One of `login`, `logout`, `login_failed`.
    #[sea_orm(indexed)]
    pub action: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
