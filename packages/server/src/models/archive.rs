use chrono::{DateTime, Utc};
use common::PerformanceSnapshot;
use serde::Serialize;

use crate::models::subject::SubjectResponse;

/// Archived subject with its cached performance.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ArchivedSubjectResponse {
    pub id: i32,
    pub subject: SubjectResponse,
    pub professor_name: String,
    pub schedule: Option<String>,
    pub performance: PerformanceSnapshot,
    pub enrolled_at: DateTime<Utc>,
    pub archived_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ArchiveResponse {
    /// ID of the new archive entry.
    pub archived_subject_id: i32,
    pub performance: PerformanceSnapshot,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RestoreResponse {
    /// ID of the recreated enrollment.
    pub enrollment_id: i32,
}
