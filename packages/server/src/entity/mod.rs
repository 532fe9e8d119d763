pub mod activity_log;
pub mod archived_category;
pub mod archived_performance;
pub mod archived_score;
pub mod archived_subject;
pub mod enrollment;
pub mod exam_score;
pub mod message;
pub mod role;
pub mod role_permission;
pub mod score_record;
pub mod standing_category;
pub mod subject;
pub mod system_log;
pub mod user;
