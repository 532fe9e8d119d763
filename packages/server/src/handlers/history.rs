use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{archived_subject, subject};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::history::*;
use crate::state::AppState;
use crate::utils::export;
use crate::utils::performance;
use crate::utils::semester::Term;

fn parse_term(query: &HistoryQuery) -> Result<Option<Term>, AppError> {
    match query.semester.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => Term::parse(label)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown semester '{label}'"))),
    }
}

/// History rows for a student, optionally limited to one term, ordered by semester then code.
async fn load_rows<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    term: Option<Term>,
) -> Result<Vec<HistoryRow>, AppError> {
    let archives = archived_subject::Entity::find()
        .filter(archived_subject::Column::StudentId.eq(student_id))
        .all(db)
        .await?;

    let subject_ids: Vec<i32> = archives.iter().map(|a| a.subject_id).collect();
    let mut subjects = subject::Entity::find().filter(subject::Column::Id.is_in(subject_ids));
    if let Some(term) = term {
        subjects = subjects.filter(subject::Column::Semester.eq(term.catalog_name()));
    }
    let subjects: HashMap<i32, subject::Model> = subjects
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut rows = Vec::new();
    for archive in archives {
        let Some(subject) = subjects.get(&archive.subject_id) else {
            continue;
        };
        let snapshot = performance::archived_snapshot(db, archive.id).await?;
        rows.push(HistoryRow {
            archived_subject_id: archive.id,
            subject_code: subject.code.clone(),
            subject_name: subject.name.clone(),
            professor_name: archive.professor_name,
            credits: subject.credits,
            semester: subject.semester.clone(),
            overall_grade: snapshot.overall_grade,
            gpa: snapshot.gpa,
            risk_level: snapshot.risk_level,
            archived_at: archive.archived_at,
        });
    }
    rows.sort_by(|a, b| {
        a.semester
            .cmp(&b.semester)
            .then_with(|| a.subject_code.cmp(&b.subject_code))
    });
    Ok(rows)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "History",
    operation_id = "getHistory",
    summary = "Semester history",
    description = "Archived subjects with their grade, GPA and risk, plus a credit-weighted GPA over graded subjects.",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History", body = HistoryResponse),
        (status = 400, description = "Unknown semester (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    auth_user.require_permission("grades:own")?;
    let term = parse_term(&query)?;

    let rows = load_rows(&state.db, auth_user.user_id, term).await?;
    let summary = summarize(&rows);
    Ok(Json(HistoryResponse { rows, summary }))
}

#[utoipa::path(
    get,
    path = "/export",
    tag = "History",
    operation_id = "exportHistory",
    summary = "Export semester history as CSV",
    params(HistoryQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown semester (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn export_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grades:own")?;
    let term = parse_term(&query)?;

    let rows = load_rows(&state.db, auth_user.user_id, term).await?;
    let filename = export::history_filename(
        term.map(|t| t.catalog_name()),
        chrono::Utc::now().date_naive(),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        export::history_csv(&rows),
    ))
}
