#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Which bucket a score record is aggregated into.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    /// Quizzes, projects, recitation, attendance.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "class_standing"))]
    ClassStanding,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "midterm_exam"))]
    MidtermExam,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "final_exam"))]
    FinalExam,
}

impl ScoreType {
    pub const ALL: &'static [ScoreType] = &[Self::ClassStanding, Self::MidtermExam, Self::FinalExam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassStanding => "class_standing",
            Self::MidtermExam => "midterm_exam",
            Self::FinalExam => "final_exam",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class_standing" => Ok(Self::ClassStanding),
            "midterm_exam" => Ok(Self::MidtermExam),
            "final_exam" => Ok(Self::FinalExam),
            _ => Err(ParseEnumError::new("score type", s, "class_standing, midterm_exam, final_exam")),
        }
    }
}

/// The two exams of a term. Each enrollment holds at most one of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "midterm"))]
    Midterm,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "final"))]
    Final,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Midterm => "midterm",
            Self::Final => "final",
        }
    }

    /// Display name stored as the record's `score_name`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Midterm => "Midterm Exam",
            Self::Final => "Final Exam",
        }
    }

    pub fn score_type(&self) -> ScoreType {
        match self {
            Self::Midterm => ScoreType::MidtermExam,
            Self::Final => ScoreType::FinalExam,
        }
    }

    pub fn from_score_type(score_type: ScoreType) -> Option<Self> {
        match score_type {
            ScoreType::MidtermExam => Some(Self::Midterm),
            ScoreType::FinalExam => Some(Self::Final),
            ScoreType::ClassStanding => None,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "midterm" => Ok(Self::Midterm),
            "final" => Ok(Self::Final),
            _ => Err(ParseEnumError::new("exam type", s, "midterm, final")),
        }
    }
}

/// A class-standing category with its share of the 60-point class standing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingCategory {
    pub id: i32,
    pub name: String,
    pub weight_percent: f64,
}

impl StandingCategory {
    pub fn new(id: i32, name: impl Into<String>, weight_percent: f64) -> Self {
        Self {
            id,
            name: name.into(),
            weight_percent,
        }
    }

    /// Attendance is scored by presence instead of points.
    pub fn is_attendance(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(crate::grading::ATTENDANCE_CATEGORY)
    }
}

/// One recorded score, as read from storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub category_id: Option<i32>,
    pub score_type: ScoreType,
    pub score_name: String,
    pub score_value: f64,
    pub max_score: f64,
    pub score_date: Option<NaiveDate>,
}

impl ScoreRecord {
    pub fn class_standing(category_id: i32, name: impl Into<String>, value: f64, max: f64) -> Self {
        Self {
            category_id: Some(category_id),
            score_type: ScoreType::ClassStanding,
            score_name: name.into(),
            score_value: value,
            max_score: max,
            score_date: None,
        }
    }

    pub fn exam(exam: ExamType, value: f64, max: f64) -> Self {
        Self {
            category_id: None,
            score_type: exam.score_type(),
            score_name: exam.display_name().to_string(),
            score_value: value,
            max_score: max,
            score_date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.score_date = Some(date);
        self
    }
}
