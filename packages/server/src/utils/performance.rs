//! Loads grading inputs from storage and runs the calculator.
//!
//! Every snapshot the API returns, whether for a single enrollment, a report or
//! an archive, is produced here so the numbers always agree.

use std::collections::HashMap;

use common::grading::{self, AttendanceSummary};
use common::{PerformanceSnapshot, ScoreRecord, StandingCategory};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::{
    archived_category, archived_performance, archived_score, exam_score, score_record,
    standing_category,
};

/// Categories and scores of one enrollment, in calculator form.
#[derive(Clone, Debug, Default)]
pub struct GradingInputs {
    pub categories: Vec<StandingCategory>,
    pub scores: Vec<ScoreRecord>,
}

impl GradingInputs {
    pub fn snapshot(&self) -> PerformanceSnapshot {
        grading::compute(&self.categories, &self.scores)
    }

    pub fn attendance(&self) -> Option<AttendanceSummary> {
        grading::attendance_summary(&self.categories, &self.scores)
    }

    /// Names of categories whose raw average is under `threshold` percent.
    pub fn weak_categories(&self, threshold: f64) -> Vec<String> {
        self.snapshot()
            .categories
            .into_iter()
            .filter(|c| c.record_count > 0 && c.max_possible > 0.0)
            .filter(|c| c.percentage_score < threshold)
            .map(|c| c.name)
            .collect()
    }

    /// Raw average over every record (class standing and exams), `None` without scores.
    pub fn average_percent(&self) -> Option<f64> {
        let (total, max) = self
            .scores
            .iter()
            .fold((0.0, 0.0), |(t, m), s| (t + s.score_value, m + s.max_score));
        (max > 0.0).then(|| total / max * 100.0)
    }
}

/// Load the grading inputs of many enrollments in three queries.
pub async fn load_many<C: ConnectionTrait>(
    db: &C,
    enrollment_ids: &[i32],
) -> Result<HashMap<i32, GradingInputs>, DbErr> {
    let mut inputs: HashMap<i32, GradingInputs> = enrollment_ids
        .iter()
        .map(|id| (*id, GradingInputs::default()))
        .collect();
    if enrollment_ids.is_empty() {
        return Ok(inputs);
    }

    let categories = standing_category::Entity::find()
        .filter(standing_category::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .order_by_asc(standing_category::Column::Id)
        .all(db)
        .await?;
    for category in &categories {
        if let Some(entry) = inputs.get_mut(&category.enrollment_id) {
            entry.categories.push(category.into());
        }
    }

    let scores = score_record::Entity::find()
        .filter(score_record::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .order_by_asc(score_record::Column::Id)
        .all(db)
        .await?;
    for score in &scores {
        if let Some(entry) = inputs.get_mut(&score.enrollment_id) {
            entry.scores.push(score.into());
        }
    }

    let exams = exam_score::Entity::find()
        .filter(exam_score::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .all(db)
        .await?;
    for exam in &exams {
        if let Some(entry) = inputs.get_mut(&exam.enrollment_id) {
            entry.scores.push(exam.into());
        }
    }

    Ok(inputs)
}

pub async fn load<C: ConnectionTrait>(db: &C, enrollment_id: i32) -> Result<GradingInputs, DbErr> {
    Ok(load_many(db, &[enrollment_id])
        .await?
        .remove(&enrollment_id)
        .unwrap_or_default())
}

/// Live snapshots for many enrollments, keyed by enrollment id.
pub async fn snapshots<C: ConnectionTrait>(
    db: &C,
    enrollment_ids: &[i32],
) -> Result<HashMap<i32, PerformanceSnapshot>, DbErr> {
    Ok(load_many(db, enrollment_ids)
        .await?
        .into_iter()
        .map(|(id, inputs)| (id, inputs.snapshot()))
        .collect())
}

pub async fn snapshot<C: ConnectionTrait>(
    db: &C,
    enrollment_id: i32,
) -> Result<PerformanceSnapshot, DbErr> {
    Ok(load(db, enrollment_id).await?.snapshot())
}

/// Grading inputs of an archived subject, keyed by archived category ids.
pub async fn load_archived<C: ConnectionTrait>(
    db: &C,
    archived_subject_id: i32,
) -> Result<GradingInputs, DbErr> {
    let categories = archived_category::Entity::find()
        .filter(archived_category::Column::ArchivedSubjectId.eq(archived_subject_id))
        .order_by_asc(archived_category::Column::Id)
        .all(db)
        .await?;
    let scores = archived_score::Entity::find()
        .filter(archived_score::Column::ArchivedSubjectId.eq(archived_subject_id))
        .order_by_asc(archived_score::Column::Id)
        .all(db)
        .await?;
    Ok(GradingInputs {
        categories: categories.iter().map(Into::into).collect(),
        scores: scores.iter().map(Into::into).collect(),
    })
}

/// Snapshot of an archived subject: the cached row when present, else recomputed.
///
/// The cached row does not carry the category breakdown, so it is always
/// recomputed from the archived categories and scores.
pub async fn archived_snapshot<C: ConnectionTrait>(
    db: &C,
    archived_subject_id: i32,
) -> Result<PerformanceSnapshot, DbErr> {
    let inputs = load_archived(db, archived_subject_id).await?;
    let mut snapshot = inputs.snapshot();

    let cached = archived_performance::Entity::find()
        .filter(archived_performance::Column::ArchivedSubjectId.eq(archived_subject_id))
        .one(db)
        .await?;
    if let Some(cached) = cached {
        snapshot.class_standing_total = cached.class_standing_total;
        snapshot.midterm_contribution = cached.midterm_contribution;
        snapshot.final_contribution = cached.final_contribution;
        snapshot.exam_total = cached.exam_total;
        snapshot.overall_grade = cached.overall_grade;
        snapshot.gpa = cached.gpa;
        snapshot.risk_level = cached.risk_level;
    }
    Ok(snapshot)
}
