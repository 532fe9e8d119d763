use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use common::{PerformanceSnapshot, RiskLevel};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{enrollment, role, subject, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::report::*;
use crate::models::shared::round2;
use crate::state::AppState;
use crate::utils::performance;
use crate::utils::semester::Term;

/// Every student with the live snapshots of their active enrollments.
struct Roster {
    students: Vec<user::Model>,
    enrollments: Vec<enrollment::Model>,
    snapshots: HashMap<i32, PerformanceSnapshot>,
}

impl Roster {
    async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        let students = user::Entity::find()
            .filter(user::Column::Role.eq(role::STUDENT))
            .order_by_asc(user::Column::Fullname)
            .all(db)
            .await?;
        let enrollments = enrollment::Entity::find().all(db).await?;
        let ids: Vec<i32> = enrollments.iter().map(|e| e.id).collect();
        let snapshots = performance::snapshots(db, &ids).await?;
        Ok(Self {
            students,
            enrollments,
            snapshots,
        })
    }

    /// Snapshots grouped by student id.
    fn by_student(&self) -> HashMap<i32, Vec<&PerformanceSnapshot>> {
        let mut out: HashMap<i32, Vec<&PerformanceSnapshot>> = HashMap::new();
        for e in &self.enrollments {
            if let Some(snapshot) = self.snapshots.get(&e.id) {
                out.entry(e.student_id).or_default().push(snapshot);
            }
        }
        out
    }

    /// Students with at least one graded enrollment, with their aggregate.
    fn aggregates(&self) -> Vec<(&user::Model, StudentAggregate)> {
        let by_student = self.by_student();
        self.students
            .iter()
            .filter_map(|student| {
                let snapshots = by_student.get(&student.id)?;
                StudentAggregate::from_snapshots(snapshots.iter().copied())
                    .map(|agg| (student, agg))
            })
            .collect()
    }
}

#[utoipa::path(
    get,
    path = "/overview",
    tag = "Reports",
    operation_id = "reportOverview",
    summary = "System overview",
    description = "Totals, risk distribution across all active enrollments and registrations in the last 7 days. Requires `report:view` permission.",
    responses(
        (status = 200, description = "Overview", body = OverviewResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn overview(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, AppError> {
    auth_user.require_permission("report:view")?;

    let roster = Roster::load(&state.db).await?;
    let total_subjects = subject::Entity::find().count(&state.db).await?;
    let week_ago = chrono::Utc::now() - chrono::Duration::days(7);

    let mut risk_distribution = RiskDistribution::default();
    for snapshot in roster.snapshots.values() {
        risk_distribution.add(snapshot.risk_level);
    }

    Ok(Json(OverviewResponse {
        total_students: roster.students.len() as u64,
        total_subjects,
        active_students: roster.by_student().len() as u64,
        total_enrollments: roster.enrollments.len() as u64,
        risk_distribution,
        new_registrations: roster
            .students
            .iter()
            .filter(|s| s.created_at >= week_ago)
            .count() as u64,
    }))
}

#[utoipa::path(
    get,
    path = "/student-performance",
    tag = "Reports",
    operation_id = "reportStudentPerformance",
    summary = "Per-student performance",
    description = "Average of graded enrollments per student with a performance level. Students without any grade are omitted.",
    responses(
        (status = 200, description = "Student performance", body = StudentPerformanceReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn student_performance(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StudentPerformanceReport>, AppError> {
    auth_user.require_permission("report:view")?;

    let roster = Roster::load(&state.db).await?;
    let mut summary = PerformanceSummary::default();
    let mut students: Vec<StudentPerformanceRow> = roster
        .aggregates()
        .into_iter()
        .map(|(student, agg)| {
            let level = PerformanceLevel::for_average(agg.average_grade);
            summary.add(level);
            StudentPerformanceRow {
                student_id: student.id,
                fullname: student.fullname.clone(),
                student_number: student.student_number.clone(),
                average_grade: agg.average_grade,
                graded_subjects: agg.graded_subjects,
                high_risk_subjects: agg.high_risk_subjects,
                performance_level: level,
            }
        })
        .collect();
    students.sort_by(|a, b| b.average_grade.total_cmp(&a.average_grade));

    Ok(Json(StudentPerformanceReport { students, summary }))
}

#[utoipa::path(
    get,
    path = "/subject-analysis",
    tag = "Reports",
    operation_id = "reportSubjectAnalysis",
    summary = "Per-subject analysis",
    responses(
        (status = 200, description = "Subject analysis", body = Vec<SubjectAnalysisRow>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn subject_analysis(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectAnalysisRow>>, AppError> {
    auth_user.require_permission("report:view")?;

    let roster = Roster::load(&state.db).await?;
    let subjects = subject::Entity::find()
        .order_by_asc(subject::Column::Code)
        .all(&state.db)
        .await?;

    let mut by_subject: HashMap<i32, Vec<&PerformanceSnapshot>> = HashMap::new();
    for e in &roster.enrollments {
        if let Some(snapshot) = roster.snapshots.get(&e.id) {
            by_subject.entry(e.subject_id).or_default().push(snapshot);
        }
    }

    let rows = subjects
        .into_iter()
        .map(|subject| {
            let snapshots = by_subject.remove(&subject.id).unwrap_or_default();
            let graded: Vec<_> = snapshots.iter().filter(|s| s.overall_grade > 0.0).collect();
            let high = graded
                .iter()
                .filter(|s| s.risk_level == RiskLevel::High)
                .count();
            let (average_grade, high_risk_percentage) = if graded.is_empty() {
                (None, None)
            } else {
                let n = graded.len() as f64;
                let total: f64 = graded.iter().map(|s| s.overall_grade).sum();
                (
                    Some(round2(total / n)),
                    Some(round2(high as f64 / n * 100.0)),
                )
            };
            SubjectAnalysisRow {
                enrolled: snapshots.len() as u64,
                graded: graded.len() as u64,
                average_grade,
                high_risk_percentage,
                subject: subject.into(),
            }
        })
        .collect();

    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/risk-assessment",
    tag = "Reports",
    operation_id = "reportRiskAssessment",
    summary = "Per-student risk assessment",
    description = "Scores each graded student on average grade and number of high-risk subjects. Highest risk first.",
    responses(
        (status = 200, description = "Risk assessment", body = RiskAssessmentReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn risk_assessment(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RiskAssessmentReport>, AppError> {
    auth_user.require_permission("report:view")?;

    let roster = Roster::load(&state.db).await?;
    let mut summary = RiskDistribution::default();
    let mut students: Vec<RiskAssessmentRow> = roster
        .aggregates()
        .into_iter()
        .map(|(student, agg)| {
            let overall_risk = agg.overall_risk();
            summary.add(overall_risk);
            RiskAssessmentRow {
                student_id: student.id,
                fullname: student.fullname.clone(),
                student_number: student.student_number.clone(),
                average_grade: agg.average_grade,
                high_risk_subjects: agg.high_risk_subjects,
                risk_score: agg.risk_score(),
                overall_risk,
            }
        })
        .collect();
    students.sort_by(|a, b| {
        b.risk_score
            .cmp(&a.risk_score)
            .then_with(|| a.average_grade.total_cmp(&b.average_grade))
    });

    Ok(Json(RiskAssessmentReport { students, summary }))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Reports",
    operation_id = "adminDashboard",
    summary = "Administrator dashboard",
    description = "Totals, the three newest students and, per semester, student counts by their worst subject risk.",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn dashboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    auth_user.require_permission("report:view")?;

    let roster = Roster::load(&state.db).await?;
    let total_subjects = subject::Entity::find().count(&state.db).await?;
    let by_student = roster.by_student();

    let mut first_semester = SemesterRisk::default();
    let mut second_semester = SemesterRisk::default();
    let mut overall = SemesterRisk::default();
    for student in &roster.students {
        let risk = by_student
            .get(&student.id)
            .map(|snapshots| worst_risk(snapshots.iter().copied()))
            .unwrap_or_default();
        let bucket = match student.semester.as_deref().and_then(Term::parse) {
            Some(Term::First) => Some(&mut first_semester),
            Some(Term::Second) => Some(&mut second_semester),
            None => None,
        };
        if let Some(bucket) = bucket {
            bucket.total_students += 1;
            bucket.risk.add(risk);
        }
        overall.total_students += 1;
        overall.risk.add(risk);
    }

    let mut recent: Vec<&user::Model> = roster.students.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let recent_students = recent
        .into_iter()
        .take(3)
        .map(|s| RecentStudent {
            id: s.id,
            fullname: s.fullname.clone(),
            email: s.email.clone(),
            student_number: s.student_number.clone(),
            created_at: s.created_at,
        })
        .collect();

    Ok(Json(DashboardResponse {
        total_students: roster.students.len() as u64,
        total_subjects,
        total_enrollments: roster.enrollments.len() as u64,
        recent_students,
        first_semester,
        second_semester,
        overall,
    }))
}
