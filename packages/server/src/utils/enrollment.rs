use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{archived_subject, enrollment, exam_score, score_record, standing_category, subject};
use crate::error::AppError;

/// Look up an enrollment owned by `student_id`.
///
/// Another student's enrollment is reported as missing so ids cannot be probed.
pub async fn find_owned_enrollment<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    id: i32,
) -> Result<enrollment::Model, AppError> {
    enrollment::Entity::find_by_id(id)
        .filter(enrollment::Column::StudentId.eq(student_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".into()))
}

/// Like [`find_owned_enrollment`], but locks the row until the transaction ends.
pub async fn find_owned_enrollment_for_update<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    id: i32,
) -> Result<enrollment::Model, AppError> {
    enrollment::Entity::find_by_id(id)
        .filter(enrollment::Column::StudentId.eq(student_id))
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".into()))
}

/// Look up a category belonging to the given enrollment.
pub async fn find_category<C: ConnectionTrait>(
    db: &C,
    enrollment_id: i32,
    category_id: i32,
) -> Result<standing_category::Model, AppError> {
    standing_category::Entity::find_by_id(category_id)
        .filter(standing_category::Column::EnrollmentId.eq(enrollment_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

/// Look up a class-standing score belonging to the given enrollment.
pub async fn find_score<C: ConnectionTrait>(
    db: &C,
    enrollment_id: i32,
    score_id: i32,
) -> Result<score_record::Model, AppError> {
    score_record::Entity::find_by_id(score_id)
        .filter(score_record::Column::EnrollmentId.eq(enrollment_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Score not found".into()))
}

pub async fn find_subject<C: ConnectionTrait>(db: &C, id: i32) -> Result<subject::Model, AppError> {
    subject::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".into()))
}

/// Look up an archived subject owned by `student_id`.
pub async fn find_owned_archive<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    id: i32,
) -> Result<archived_subject::Model, AppError> {
    archived_subject::Entity::find_by_id(id)
        .filter(archived_subject::Column::StudentId.eq(student_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Archived subject not found".into()))
}

/// Delete an enrollment with its scores, exams and categories.
///
/// Runs on whatever connection it is given; callers pass a transaction.
pub async fn delete_enrollment_rows<C: ConnectionTrait>(
    db: &C,
    enrollment_ids: &[i32],
) -> Result<(), sea_orm::DbErr> {
    if enrollment_ids.is_empty() {
        return Ok(());
    }
    score_record::Entity::delete_many()
        .filter(score_record::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .exec(db)
        .await?;
    exam_score::Entity::delete_many()
        .filter(exam_score::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .exec(db)
        .await?;
    standing_category::Entity::delete_many()
        .filter(standing_category::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .exec(db)
        .await?;
    enrollment::Entity::delete_many()
        .filter(enrollment::Column::Id.is_in(enrollment_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(())
}

/// Delete archived subjects with everything hanging off them.
pub async fn delete_archive_rows<C: ConnectionTrait>(
    db: &C,
    archive_ids: &[i32],
) -> Result<(), sea_orm::DbErr> {
    use crate::entity::{archived_category, archived_performance, archived_score};

    if archive_ids.is_empty() {
        return Ok(());
    }
    archived_score::Entity::delete_many()
        .filter(archived_score::Column::ArchivedSubjectId.is_in(archive_ids.iter().copied()))
        .exec(db)
        .await?;
    archived_category::Entity::delete_many()
        .filter(archived_category::Column::ArchivedSubjectId.is_in(archive_ids.iter().copied()))
        .exec(db)
        .await?;
    archived_performance::Entity::delete_many()
        .filter(
            archived_performance::Column::ArchivedSubjectId.is_in(archive_ids.iter().copied()),
        )
        .exec(db)
        .await?;
    archived_subject::Entity::delete_many()
        .filter(archived_subject::Column::Id.is_in(archive_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(())
}
