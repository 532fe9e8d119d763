mod admin;
mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;

/// Student-facing and administrator routes, both under `/v1`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes().nest("/admin", admin::routes()))
}
