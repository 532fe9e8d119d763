use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};

use crate::entity::activity_log;

pub const ADD_CATEGORY: &str = "add_category";
pub const DELETE_CATEGORY: &str = "delete_category";
pub const ADD_SCORE: &str = "add_score";
pub const UPDATE_SCORE: &str = "update_score";
pub const DELETE_SCORE: &str = "delete_score";
pub const RECORD_ATTENDANCE: &str = "record_attendance";
pub const SET_EXAM: &str = "set_exam";
pub const DELETE_EXAM: &str = "delete_exam";

/// Append a grade mutation to the activity log.
pub async fn record<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    enrollment_id: i32,
    action: &str,
) -> Result<(), DbErr> {
    activity_log::ActiveModel {
        student_id: Set(student_id),
        enrollment_id: Set(enrollment_id),
        action: Set(action.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
