pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/resumes", get(resumes::handle_list_resumes))
        .route("/api/resumes/upload", post(resumes::handle_upload_resume))
        .route(
            "/api/resumes/import-url",
            post(resumes::handle_import_resume_url),
        )
        .route("/api/resumes/manual", post(resumes::handle_add_manual_resume))
        .route(
            "/api/resumes/selected",
            get(resumes::handle_get_selected_resume),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get_resume)
                .patch(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/resumes/:id/select",
            post(resumes::handle_select_resume),
        )
        // Job API
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_patch_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/jobs/:id/regenerate",
            post(jobs::handle_regenerate_job),
        )
        .route("/api/jobs/:id/edit", post(jobs::handle_begin_edit))
        .route("/api/jobs/:id/documents", put(jobs::handle_save_edit))
        .with_state(state)
}
