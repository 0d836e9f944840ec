pub mod health;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::admin::{self, auth::require_admin};
use crate::chat;
use crate::enquiries;
use crate::hr;
use crate::resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/dashboard", get(admin::handlers::handle_dashboard))
        .route(
            "/database/clear_contacts",
            post(admin::handlers::handle_clear_contacts),
        )
        .route(
            "/database/clear_applications",
            post(admin::handlers::handle_clear_applications),
        )
        .route("/company", put(admin::handlers::handle_update_company))
        .route(
            "/contacts",
            get(enquiries::handlers::handle_list_contacts)
                .post(enquiries::handlers::handle_create_contact),
        )
        .route(
            "/contacts/:id",
            get(enquiries::handlers::handle_get_contact)
                .patch(enquiries::handlers::handle_update_contact)
                .delete(enquiries::handlers::handle_delete_contact),
        )
        .route(
            "/jobs",
            get(hr::handlers::handle_list_jobs).post(hr::handlers::handle_create_job),
        )
        .route(
            "/jobs/:id",
            get(hr::handlers::handle_get_job)
                .put(hr::handlers::handle_update_job)
                .delete(hr::handlers::handle_delete_job),
        )
        .route("/applications", get(hr::handlers::handle_list_applications))
        .route(
            "/applications/:id",
            get(hr::handlers::handle_get_application)
                .delete(hr::handlers::handle_delete_application),
        )
        .route(
            "/applications/:id/resume",
            get(hr::handlers::handle_download_resume),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health::health_handler))
        // Assistant
        .route("/chat", post(chat::handlers::handle_chat))
        .route("/upload_file", post(resume::handlers::handle_upload_file))
        .route(
            "/upload_document",
            post(resume::handlers::handle_upload_document),
        )
        // Public website forms
        .route("/api/contact", post(enquiries::handlers::handle_submit_contact))
        .route("/api/jobs", get(hr::handlers::handle_public_jobs))
        .nest("/admin/api", admin_routes)
        .with_state(state)
}
