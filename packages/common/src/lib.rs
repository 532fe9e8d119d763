pub mod advice;
pub mod error;
pub mod grading;
pub mod risk;
pub mod score;

pub use grading::{CategoryBreakdown, PerformanceSnapshot};
pub use risk::{Priority, RiskLevel};
pub use score::{ExamType, ScoreRecord, ScoreType, StandingCategory};
