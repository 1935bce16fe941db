use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Defines every route that requires a resolved identity. The auth middleware layered
/// above this module guarantees each handler receives a validated `AuthUser`; the
/// handlers then consult the authorization engine for the per-object decision
/// (visibility-scoped 404s, ownership and admin-only 403s).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // Retrieves the currently authenticated user's identity record.
        .route("/me", get(handlers::get_me))
        // --- Projects ---
        // GET /projects — visibility-scoped, paginated listing.
        // POST /projects — any authenticated user may create; admins publish verified.
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        // GET /projects/my_projects
        // Strict-owner view, independent of verification state. The static segment
        // takes precedence over the {id} capture below.
        .route("/projects/my_projects", get(handlers::get_my_projects))
        // GET/PUT/PATCH/DELETE /projects/{id}
        // Engine-gated single-object operations. PUT and PATCH share the partial
        // update handler: all payload fields are optional.
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .patch(handlers::update_project)
                .delete(handlers::delete_project),
        )
        // POST /projects/{id}/verify
        // Admin-only visibility transition; idempotent on re-verify.
        .route("/projects/{id}/verify", post(handlers::verify_project))
        // --- Tasks (nested under their project) ---
        .route(
            "/projects/{id}/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/projects/{id}/tasks/{task_id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
}
