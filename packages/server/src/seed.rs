use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapAdminConfig;
use crate::entity::{activity_log, message, role, role_permission, subject, system_log, user};
use crate::utils::hash;

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &[role::STUDENT, role::ADMIN];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    (role::STUDENT, role_permission::GRADES_OWN),
    (role::STUDENT, role_permission::MESSAGE_SEND),
    (role::ADMIN, role_permission::STUDENT_MANAGE),
    (role::ADMIN, role_permission::REPORT_VIEW),
    (role::ADMIN, role_permission::LOG_VIEW),
    (role::ADMIN, role_permission::MESSAGE_SEND),
    (role::ADMIN, role_permission::SUBJECT_MANAGE),
];

/// Department subject catalog: (code, name, credits, semester).
const DEFAULT_SUBJECTS: &[(&str, &str, i32, &str)] = &[
    ("COMP 104", "Data Structures and Algorithms", 3, "First Semester"),
    ("COMP 105", "Information Management", 3, "First Semester"),
    ("IT 102", "Quantitative Methods", 3, "First Semester"),
    ("IT 201", "IT Elective: Platform Technologies", 3, "First Semester"),
    ("IT 202", "IT Elective: Object-Oriented Programming (VB.Net)", 3, "First Semester"),
    ("IT 103", "Advanced Database Systems", 3, "Second Semester"),
    ("IT 104", "Integrative Programming and Technologies I", 3, "Second Semester"),
    ("IT 105", "Networking I", 3, "Second Semester"),
    ("IT 301", "Web Programming", 3, "Second Semester"),
    ("COMP 106", "Applications Development and Emerging Technologies", 3, "Second Semester"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role_name, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role_name.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Seed the subject catalog. Existing codes are left untouched.
pub async fn seed_subjects(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now();
    let mut inserted = 0u32;
    for &(code, name, credits, semester) in DEFAULT_SUBJECTS {
        let model = subject::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            credits: Set(credits),
            semester: Set(semester.to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        let result = subject::Entity::insert(model)
            .on_conflict(OnConflict::column(subject::Column::Code).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} catalog subjects", inserted);
    }

    Ok(())
}

/// Create the configured administrator unless an account with that email exists.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    admin: &BootstrapAdminConfig,
) -> Result<(), DbErr> {
    let email = admin.email.trim().to_lowercase();
    let exists = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }

    let password = hash::hash_password(&admin.password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;

    user::ActiveModel {
        email: Set(email.clone()),
        password: Set(password),
        fullname: Set(admin.fullname.clone()),
        role: Set(role::ADMIN.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created bootstrap administrator {}", email);
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        // Conversation lookups: messages between two users, oldest first.
        Index::create()
            .if_not_exists()
            .name("idx_message_pair_created")
            .table(message::Entity)
            .col(message::Column::SenderId)
            .col(message::Column::ReceiverId)
            .col(message::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Daily log view: SELECT ... WHERE action IN (...) AND created_at BETWEEN ...
        Index::create()
            .if_not_exists()
            .name("idx_system_log_action_created")
            .table(system_log::Entity)
            .col(system_log::Column::Action)
            .col(system_log::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Behavioral insights: activity per enrollment.
        Index::create()
            .if_not_exists()
            .name("idx_activity_student_enrollment")
            .table(activity_log::Entity)
            .col(activity_log::Column::StudentId)
            .col(activity_log::Column::EnrollmentId)
            .to_string(PostgresQueryBuilder),
    ];

    for stmt in indexes {
        if let Err(e) = db.execute_unprepared(&stmt).await {
            tracing::warn!("Failed to create index: {}", e);
        }
    }
    info!("Ensured composite indexes exist");

    Ok(())
}
