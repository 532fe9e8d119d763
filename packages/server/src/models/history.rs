use chrono::{DateTime, Utc};
use common::RiskLevel;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::models::shared::round2;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Semester filter; accepts the same aliases as the catalog.
    pub semester: Option<String>,
}

/// One archived subject in the semester history.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct HistoryRow {
    pub archived_subject_id: i32,
    pub subject_code: String,
    pub subject_name: String,
    pub professor_name: String,
    pub credits: i32,
    pub semester: String,
    /// 0 when nothing was recorded.
    pub overall_grade: f64,
    pub gpa: f64,
    pub risk_level: RiskLevel,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Serialize, utoipa::ToSchema)]
pub struct HistorySummary {
    pub total_subjects: usize,
    /// Subjects with an overall grade above 0.
    pub graded_subjects: usize,
    pub graded_credits: i32,
    /// Credit-weighted GPA of graded subjects, rounded to 2 decimals.
    pub weighted_gpa: Option<f64>,
    /// Credit-weighted overall grade of graded subjects, rounded to 2 decimals.
    pub average_grade: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HistoryResponse {
    pub rows: Vec<HistoryRow>,
    pub summary: HistorySummary,
}

pub fn summarize(rows: &[HistoryRow]) -> HistorySummary {
    let graded: Vec<&HistoryRow> = rows.iter().filter(|r| r.overall_grade > 0.0).collect();
    let graded_credits: i32 = graded.iter().map(|r| r.credits).sum();
    HistorySummary {
        total_subjects: rows.len(),
        graded_subjects: graded.len(),
        graded_credits,
        weighted_gpa: credit_weighted(&graded, graded_credits, |r| r.gpa),
        average_grade: credit_weighted(&graded, graded_credits, |r| r.overall_grade),
    }
}

fn credit_weighted(
    rows: &[&HistoryRow],
    credits: i32,
    value: impl Fn(&HistoryRow) -> f64,
) -> Option<f64> {
    (credits > 0).then(|| {
        let total: f64 = rows.iter().map(|&r| value(r) * r.credits as f64).sum();
        round2(total / credits as f64)
    })
}
