//! Advice engine: insights, interventions, recommendations and grade projection.
//!
//! Everything here is derived from a [`PerformanceSnapshot`](crate::grading::PerformanceSnapshot)
//! and a few activity facts the caller gathers from storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::grading::{AttendanceSummary, OVERALL_CEILING};
use crate::risk::{Priority, RiskLevel};

/// Absence rate (percent) above which attendance becomes an intervention.
pub const ABSENCE_WARNING_RATE: f64 = 20.0;
/// Raw percentage under which a category is flagged as weak.
pub const WEAK_CATEGORY_PERCENT: f64 = 70.0;
/// Scores older than this many days do not count as recent.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Advice {
    pub message: String,
    pub priority: Priority,
}

impl Advice {
    pub fn new(message: impl Into<String>, priority: Priority) -> Self {
        Self {
            message: message.into(),
            priority,
        }
    }

    fn low(message: impl Into<String>) -> Self {
        Self::new(message, Priority::Low)
    }

    fn medium(message: impl Into<String>) -> Self {
        Self::new(message, Priority::Medium)
    }

    fn high(message: impl Into<String>) -> Self {
        Self::new(message, Priority::High)
    }
}

/// Activity facts about one enrollment, gathered from the activity log and score dates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityFacts {
    /// Number of grade mutations logged for the enrollment.
    pub activity_count: usize,
    /// Dates of every dated score record.
    pub score_dates: Vec<NaiveDate>,
    /// Number of score records, dated or not.
    pub score_count: usize,
    /// Raw average over every score record, `None` without scores.
    pub average_percent: Option<f64>,
    /// Whole days since the most recent logged activity.
    pub days_since_last_activity: Option<i64>,
}

/// Behavioral insights from how often and how well the student records scores.
pub fn insights(facts: &ActivityFacts) -> Vec<Advice> {
    let mut out = Vec::new();

    if facts.score_count > 0 {
        if facts.activity_count > 10 {
            out.push(Advice::low("Consistent engagement with regular score updates."));
        } else if facts.activity_count > 0 {
            out.push(Advice::medium("Increase engagement frequency for better tracking."));
        }

        let first = facts.score_dates.iter().min();
        let last = facts.score_dates.iter().max();
        if let (Some(first), Some(last)) = (first, last) {
            let spread = (*last - *first).num_days();
            if spread > 30 && facts.score_count < 5 {
                out.push(Advice::medium("Long gaps between submissions detected."));
            }
            if facts.average_percent.is_some_and(|avg| avg < 70.0) {
                out.push(Advice::high(
                    "Low average score detected. Focus on core concepts.",
                ));
            }
        }
    }

    if let Some(days) = facts.days_since_last_activity.filter(|d| *d > 7) {
        out.push(Advice::medium(format!(
            "It's been {days} days since your last activity. Stay engaged."
        )));
    }

    if out.is_empty() {
        out.push(Advice::low(
            "Continue tracking your scores regularly to generate personalized insights.",
        ));
    }
    out
}

/// Interventions keyed on the risk level, plus an attendance warning.
pub fn interventions(
    risk: RiskLevel,
    subject_name: &str,
    attendance: Option<AttendanceSummary>,
) -> Vec<Advice> {
    let mut out = match risk {
        RiskLevel::High => vec![
            Advice::high(format!("Immediate advising recommended for {subject_name}.")),
            Advice::high("Form a study group or seek tutoring support."),
            Advice::medium("Focus on foundational concepts before advanced topics."),
        ],
        RiskLevel::Medium => vec![
            Advice::medium(format!("Schedule review sessions for {subject_name}.")),
            Advice::medium("Identify areas of difficulty and seek clarification."),
            Advice::low("Increase practice with problem sets."),
        ],
        RiskLevel::Low => vec![
            Advice::low("Maintain current study habits."),
            Advice::low("Challenge yourself with advanced topics."),
        ],
        RiskLevel::NoData => vec![Advice::low("Keep tracking your progress.")],
    };

    if let Some(rate) = attendance
        .and_then(|a| a.absence_rate())
        .filter(|rate| *rate > ABSENCE_WARNING_RATE)
    {
        out.push(Advice::high(format!(
            "High absence rate ({}%). Regular attendance is crucial.",
            rate.round()
        )));
    }
    out
}

/// Study recommendations from the overall grade, weak categories and recency of scores.
pub fn recommendations(
    overall_grade: f64,
    subject_name: &str,
    weak_categories: &[String],
    has_recent_scores: bool,
) -> Vec<Advice> {
    let mut out = vec![if overall_grade >= 90.0 {
        Advice::low(format!("Excellent work in {subject_name}!"))
    } else if overall_grade >= 80.0 {
        Advice::low("Strong performance. Maintain consistency.")
    } else if overall_grade >= 70.0 {
        Advice::medium("Solid base. Improve specific weak areas.")
    } else {
        Advice::high("Focus on core concepts and seek help.")
    }];

    if !weak_categories.is_empty() {
        out.push(Advice::high(format!(
            "Focus improvement on: {}.",
            weak_categories.join(", ")
        )));
    }

    if !has_recent_scores {
        out.push(Advice::medium("No recent score updates. Stay consistent!"));
    }
    out
}

/// Whether any score date falls within the recent window ending at `today`.
pub fn has_recent_scores(score_dates: &[NaiveDate], today: NaiveDate) -> bool {
    score_dates
        .iter()
        .any(|d| (today - *d).num_days() <= RECENT_WINDOW_DAYS)
}

/// Expected trend over the remaining graded work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    Improve,
    #[default]
    Maintain,
    Decline,
}

impl Outlook {
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Improve => 1.1,
            Self::Maintain => 1.0,
            Self::Decline => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improve => "improve",
            Self::Maintain => "maintain",
            Self::Decline => "decline",
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outlook {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "improve" => Ok(Self::Improve),
            "maintain" => Ok(Self::Maintain),
            "decline" => Ok(Self::Decline),
            _ => Err(ParseEnumError::new("outlook", s, "improve, maintain, decline")),
        }
    }
}

/// Projected final grade if the remaining weight is earned at the outlook's rate.
pub fn project_final_grade(current: f64, remaining_weight: f64, outlook: Outlook) -> f64 {
    (current + remaining_weight * outlook.multiplier()).min(OVERALL_CEILING)
}

/// Percentage of the remaining weight needed to reach `target`, capped at 100.
pub fn required_performance(current: f64, remaining_weight: f64, target: f64) -> f64 {
    if remaining_weight <= 0.0 {
        return 0.0;
    }
    let needed = (target - current).max(0.0);
    (needed / remaining_weight * 100.0).min(100.0)
}
