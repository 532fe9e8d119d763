//! Grade & risk calculator.
//!
//! Class standing is worth at most 60 points, split across the categories a
//! student defines. Midterm and final exams are worth 20 points each. The sum
//! (capped at 100) is mapped through a band table to a GPA and a risk level.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;
use crate::score::{ScoreRecord, ScoreType, StandingCategory};

/// Maximum points class standing can contribute.
pub const CLASS_STANDING_CEILING: f64 = 60.0;
/// Points each exam contributes at 100%.
pub const EXAM_WEIGHT: f64 = 20.0;
/// Maximum overall grade.
pub const OVERALL_CEILING: f64 = 100.0;
/// Category name (case-insensitive) scored as a presence ratio.
pub const ATTENDANCE_CATEGORY: &str = "attendance";
/// `score_name` of an attendance record that counts as present.
pub const PRESENT: &str = "Present";
/// `score_name` of an attendance record that counts as absent.
pub const ABSENT: &str = "Absent";

/// One row of the GPA band table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradeBand {
    /// Inclusive lower bound on the overall grade.
    pub min_grade: f64,
    pub gpa: f64,
    pub risk: RiskLevel,
}

/// Band table on a 1.00-3.00 scale where lower is better. Checked top-down.
pub const GRADE_BANDS: &[GradeBand] = &[
    GradeBand {
        min_grade: 89.0,
        gpa: 1.00,
        risk: RiskLevel::Low,
    },
    GradeBand {
        min_grade: 82.0,
        gpa: 2.00,
        risk: RiskLevel::Medium,
    },
    GradeBand {
        min_grade: 79.0,
        gpa: 2.75,
        risk: RiskLevel::Medium,
    },
    GradeBand {
        min_grade: f64::NEG_INFINITY,
        gpa: 3.00,
        risk: RiskLevel::High,
    },
];

/// Look up the band for an overall grade. Thresholds are exact; 88.99 is not 89.
pub fn band_for(overall_grade: f64) -> GradeBand {
    GRADE_BANDS
        .iter()
        .copied()
        .find(|band| overall_grade >= band.min_grade)
        .unwrap_or(GRADE_BANDS[GRADE_BANDS.len() - 1])
}

/// Per-category aggregation, in the order the categories were given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryBreakdown {
    pub category_id: i32,
    pub name: String,
    /// Share of the 60-point class standing.
    pub weight_percent: f64,
    pub total_score: f64,
    pub max_possible: f64,
    /// `total_score / max_possible * 100`, or 0 when nothing is recorded.
    pub percentage_score: f64,
    /// `percentage_score * weight_percent / 100`.
    pub weighted_score: f64,
    pub record_count: usize,
}

/// Derived performance of one enrollment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PerformanceSnapshot {
    /// 0-60.
    pub class_standing_total: f64,
    /// 0-20.
    pub midterm_contribution: f64,
    /// 0-20.
    pub final_contribution: f64,
    /// 0-40.
    pub exam_total: f64,
    /// 0-100.
    pub overall_grade: f64,
    /// 0 when there is no data.
    pub gpa: f64,
    pub risk_level: RiskLevel,
    pub midterm_recorded: bool,
    pub final_recorded: bool,
    pub categories: Vec<CategoryBreakdown>,
}

impl PerformanceSnapshot {
    /// The sentinel returned when nothing has been recorded.
    pub fn no_data(categories: Vec<CategoryBreakdown>) -> Self {
        Self {
            class_standing_total: 0.0,
            midterm_contribution: 0.0,
            final_contribution: 0.0,
            exam_total: 0.0,
            overall_grade: 0.0,
            gpa: 0.0,
            risk_level: RiskLevel::NoData,
            midterm_recorded: false,
            final_recorded: false,
            categories,
        }
    }

    pub fn has_data(&self) -> bool {
        self.risk_level != RiskLevel::NoData
    }
}

/// Compute the performance snapshot of one enrollment.
///
/// Pure: the same inputs always yield the same snapshot.
pub fn compute(categories: &[StandingCategory], scores: &[ScoreRecord]) -> PerformanceSnapshot {
    let mut standing = Vec::new();
    let mut midterm = None;
    let mut final_exam = None;
    for record in scores {
        match record.score_type {
            ScoreType::ClassStanding => standing.push(record),
            ScoreType::MidtermExam => {
                midterm.get_or_insert(record);
            }
            ScoreType::FinalExam => {
                final_exam.get_or_insert(record);
            }
        }
    }

    let breakdown = aggregate_categories(categories, &standing);

    if standing.is_empty() && midterm.is_none() && final_exam.is_none() {
        return PerformanceSnapshot::no_data(breakdown);
    }

    let class_standing_total = breakdown
        .iter()
        .map(|c| c.weighted_score)
        .sum::<f64>()
        .min(CLASS_STANDING_CEILING);

    let midterm_contribution = midterm.map_or(0.0, exam_contribution);
    let final_contribution = final_exam.map_or(0.0, exam_contribution);
    let exam_total = midterm_contribution + final_contribution;

    let overall_grade = (class_standing_total + exam_total).min(OVERALL_CEILING);
    let band = band_for(overall_grade);

    PerformanceSnapshot {
        class_standing_total,
        midterm_contribution,
        final_contribution,
        exam_total,
        overall_grade,
        gpa: band.gpa,
        risk_level: band.risk,
        midterm_recorded: midterm.is_some(),
        final_recorded: final_exam.is_some(),
        categories: breakdown,
    }
}

fn aggregate_categories(
    categories: &[StandingCategory],
    standing: &[&ScoreRecord],
) -> Vec<CategoryBreakdown> {
    let mut by_category: HashMap<i32, Vec<&ScoreRecord>> = HashMap::new();
    for record in standing {
        if let Some(category_id) = record.category_id {
            by_category.entry(category_id).or_default().push(record);
        }
    }

    categories
        .iter()
        .map(|category| {
            let records = by_category
                .get(&category.id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let (total_score, max_possible) = if category.is_attendance() {
                let present = records.iter().filter(|r| r.score_name == PRESENT).count();
                (present as f64, records.len() as f64)
            } else {
                records.iter().fold((0.0, 0.0), |(total, max), r| {
                    (total + r.score_value, max + r.max_score)
                })
            };

            let (percentage_score, weighted_score) = if max_possible > 0.0 {
                let percentage = total_score / max_possible * 100.0;
                (percentage, percentage * category.weight_percent / 100.0)
            } else {
                (0.0, 0.0)
            };

            CategoryBreakdown {
                category_id: category.id,
                name: category.name.clone(),
                weight_percent: category.weight_percent,
                total_score,
                max_possible,
                percentage_score,
                weighted_score,
                record_count: records.len(),
            }
        })
        .collect()
}

/// Scale an exam's percentage to its 20-point weight. A zero maximum contributes nothing.
fn exam_contribution(record: &ScoreRecord) -> f64 {
    if record.max_score > 0.0 {
        let percentage = record.score_value / record.max_score * 100.0;
        percentage * EXAM_WEIGHT / 100.0
    } else {
        0.0
    }
}

/// Sum of category weights; the rest of the 60 points is still unallocated.
pub fn allocated_weight(categories: &[StandingCategory]) -> f64 {
    categories.iter().map(|c| c.weight_percent).sum()
}

/// Slack allowed when a new weight is checked against the remaining allocation.
pub const ALLOCATION_TOLERANCE: f64 = 1e-9;

/// Weight still available for new categories, rounded to hundredths and never negative.
pub fn remaining_allocation(categories: &[StandingCategory]) -> f64 {
    let remaining = CLASS_STANDING_CEILING - allocated_weight(categories);
    ((remaining * 100.0).round() / 100.0).max(0.0)
}

/// Whether a category of `weight` still fits under the class standing ceiling.
pub fn fits_allocation(weight: f64, remaining: f64) -> bool {
    weight <= remaining + ALLOCATION_TOLERANCE
}

/// Presence counts for the attendance category, if the enrollment has one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AttendanceSummary {
    pub total_classes: usize,
    pub absences: usize,
}

impl AttendanceSummary {
    /// Percentage of recorded classes missed, or `None` before any class is recorded.
    pub fn absence_rate(&self) -> Option<f64> {
        (self.total_classes > 0).then(|| self.absences as f64 / self.total_classes as f64 * 100.0)
    }
}

pub fn attendance_summary(
    categories: &[StandingCategory],
    scores: &[ScoreRecord],
) -> Option<AttendanceSummary> {
    let category = categories.iter().find(|c| c.is_attendance())?;
    let records: Vec<_> = scores
        .iter()
        .filter(|s| s.category_id == Some(category.id))
        .collect();
    Some(AttendanceSummary {
        total_classes: records.len(),
        absences: records
            .iter()
            .filter(|s| s.score_name.eq_ignore_ascii_case(ABSENT))
            .count(),
    })
}
