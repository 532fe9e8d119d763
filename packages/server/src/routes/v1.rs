use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/subjects", subject_routes())
        .nest("/enrollments", enrollment_routes())
        .nest("/archives", archive_routes())
        .nest("/history", history_routes())
        .nest("/messages", message_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::logout))
        .routes(routes!(handlers::auth::me, handlers::auth::update_me))
}

fn subject_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::subject::list_subjects,
        handlers::subject::create_subject
    ))
}

fn enrollment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::enrollment::list_enrollments,
            handlers::enrollment::create_enrollment
        ))
        .routes(routes!(handlers::enrollment::list_available))
        .routes(routes!(
            handlers::enrollment::get_enrollment,
            handlers::enrollment::update_enrollment,
            handlers::enrollment::delete_enrollment
        ))
        .routes(routes!(handlers::archive::archive_enrollment))
        .merge(grading_routes())
}

fn grading_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::grading::create_category))
        .routes(routes!(handlers::grading::delete_category))
        .routes(routes!(handlers::grading::create_score))
        .routes(routes!(
            handlers::grading::update_score,
            handlers::grading::delete_score
        ))
        .routes(routes!(handlers::grading::record_attendance))
        .routes(routes!(
            handlers::grading::put_exam,
            handlers::grading::delete_exam
        ))
        .routes(routes!(handlers::grading::get_performance))
        .routes(routes!(handlers::grading::get_advice))
        .routes(routes!(handlers::grading::get_projection))
}

fn archive_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::archive::list_archives))
        .routes(routes!(handlers::archive::restore_archive))
        .routes(routes!(handlers::archive::delete_archive))
}

fn history_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::history::get_history))
        .routes(routes!(handlers::history::export_history))
}

fn message_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::message::list_messages,
            handlers::message::send_message
        ))
        .routes(routes!(handlers::message::unread_count))
        .routes(routes!(handlers::message::mark_read))
        .routes(routes!(handlers::message::list_contacts))
}
