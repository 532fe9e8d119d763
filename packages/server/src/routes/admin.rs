//! Administrator routes. Every handler here checks an admin-only permission.

use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::report::dashboard))
        .nest("/students", student_routes())
        .nest("/reports", report_routes())
        .nest("/logs", OpenApiRouter::new().routes(routes!(handlers::log::list_logs)))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::student::list_students))
        .routes(routes!(
            handlers::student::get_student,
            handlers::student::delete_student
        ))
        .routes(routes!(handlers::student::reset_password))
}

fn report_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::report::overview))
        .routes(routes!(handlers::report::student_performance))
        .routes(routes!(handlers::report::subject_analysis))
        .routes(routes!(handlers::report::risk_assessment))
}
