use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::entity::system_log;
use crate::utils::sessions::Session;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    /// Day to show (UTC). Defaults to today.
    pub date: Option<NaiveDate>,
    /// Substring match on the email.
    pub email: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LogEntry {
    pub id: i32,
    pub user_id: Option<i32>,
    pub email: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl From<system_log::Model> for LogEntry {
    fn from(m: system_log::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            email: m.email,
            action: m.action,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionSummary {
    pub total_sessions: usize,
    /// Sessions without a logout yet.
    pub active_sessions: usize,
    pub unique_students: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LogResponse {
    pub date: NaiveDate,
    pub events: Vec<LogEntry>,
    pub sessions: Vec<Session>,
    pub summary: SessionSummary,
}
