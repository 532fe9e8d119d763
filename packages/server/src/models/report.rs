use chrono::{DateTime, Utc};
use common::{PerformanceSnapshot, RiskLevel};
use serde::Serialize;

use crate::models::shared::round2;
use crate::models::subject::SubjectResponse;

/// Enrollment counts per risk level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RiskDistribution {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub no_data: u64,
}

impl RiskDistribution {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::NoData => self.no_data += 1,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct OverviewResponse {
    pub total_students: u64,
    pub total_subjects: u64,
    /// Students with at least one active enrollment.
    pub active_students: u64,
    pub total_enrollments: u64,
    pub risk_distribution: RiskDistribution,
    /// Students registered in the last 7 days.
    pub new_registrations: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceLevel {
    pub fn for_average(average: f64) -> Self {
        if average >= 90.0 {
            Self::Excellent
        } else if average >= 80.0 {
            Self::Good
        } else if average >= 75.0 {
            Self::Average
        } else {
            Self::NeedsImprovement
        }
    }
}

/// Averages over a student's graded enrollments (overall grade above 0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StudentAggregate {
    pub average_grade: f64,
    pub graded_subjects: u64,
    pub high_risk_subjects: u64,
}

impl StudentAggregate {
    /// `None` when no enrollment has a grade yet.
    pub fn from_snapshots<'a>(
        snapshots: impl IntoIterator<Item = &'a PerformanceSnapshot>,
    ) -> Option<Self> {
        let mut total = 0.0;
        let mut graded = 0u64;
        let mut high = 0u64;
        for snapshot in snapshots {
            if snapshot.overall_grade > 0.0 {
                total += snapshot.overall_grade;
                graded += 1;
                if snapshot.risk_level == RiskLevel::High {
                    high += 1;
                }
            }
        }
        (graded > 0).then(|| Self {
            average_grade: round2(total / graded as f64),
            graded_subjects: graded,
            high_risk_subjects: high,
        })
    }

    /// Points: +3 under 75, +2 under 80, +1 under 85, plus one per high-risk subject.
    pub fn risk_score(&self) -> u64 {
        let base = if self.average_grade < 75.0 {
            3
        } else if self.average_grade < 80.0 {
            2
        } else if self.average_grade < 85.0 {
            1
        } else {
            0
        };
        base + self.high_risk_subjects
    }

    pub fn overall_risk(&self) -> RiskLevel {
        match self.risk_score() {
            s if s >= 4 => RiskLevel::High,
            s if s >= 2 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentPerformanceRow {
    pub student_id: i32,
    pub fullname: String,
    pub student_number: Option<String>,
    pub average_grade: f64,
    pub graded_subjects: u64,
    pub high_risk_subjects: u64,
    pub performance_level: PerformanceLevel,
}

#[derive(Default, Serialize, utoipa::ToSchema)]
pub struct PerformanceSummary {
    pub excellent: u64,
    pub good: u64,
    pub average: u64,
    pub needs_improvement: u64,
}

impl PerformanceSummary {
    pub fn add(&mut self, level: PerformanceLevel) {
        match level {
            PerformanceLevel::Excellent => self.excellent += 1,
            PerformanceLevel::Good => self.good += 1,
            PerformanceLevel::Average => self.average += 1,
            PerformanceLevel::NeedsImprovement => self.needs_improvement += 1,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentPerformanceReport {
    pub students: Vec<StudentPerformanceRow>,
    pub summary: PerformanceSummary,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectAnalysisRow {
    pub subject: SubjectResponse,
    pub enrolled: u64,
    pub graded: u64,
    pub average_grade: Option<f64>,
    /// Share of graded enrollments at high risk, in percent.
    pub high_risk_percentage: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RiskAssessmentRow {
    pub student_id: i32,
    pub fullname: String,
    pub student_number: Option<String>,
    pub average_grade: f64,
    pub high_risk_subjects: u64,
    pub risk_score: u64,
    pub overall_risk: RiskLevel,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RiskAssessmentReport {
    pub students: Vec<RiskAssessmentRow>,
    pub summary: RiskDistribution,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecentStudent {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub student_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Students counted by the risk of their worst subject.
#[derive(Default, Serialize, utoipa::ToSchema)]
pub struct SemesterRisk {
    pub total_students: u64,
    pub risk: RiskDistribution,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub total_students: u64,
    pub total_subjects: u64,
    pub total_enrollments: u64,
    pub recent_students: Vec<RecentStudent>,
    pub first_semester: SemesterRisk,
    pub second_semester: SemesterRisk,
    pub overall: SemesterRisk,
}

/// The worst risk across a student's subjects; `NoData` when none has data.
pub fn worst_risk<'a>(snapshots: impl IntoIterator<Item = &'a PerformanceSnapshot>) -> RiskLevel {
    snapshots
        .into_iter()
        .map(|s| s.risk_level)
        .max_by_key(RiskLevel::severity)
        .unwrap_or_default()
}
