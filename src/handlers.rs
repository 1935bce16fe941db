use crate::{
    AppState,
    auth::AuthUser,
    authz::{self, Action, Target},
    error::{ApiError, ApiResult},
    models::{
        CreateProjectRequest, CreateTaskRequest, Page, Project, RegisterUserRequest, Task,
        UpdateProjectRequest, UpdateTaskRequest, User, VerifyResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// --- Query Parameter Structs ---

/// PageParams
///
/// Defines the accepted pagination parameters for list endpoints. Page numbers are
/// 1-based; `per_page` defaults to 10 and is capped at 100 regardless of what the
/// caller asks for.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

const DEFAULT_PER_PAGE: u32 = 10;
const MAX_PER_PAGE: u32 = 100;

impl PageParams {
    /// Resolves the effective (page, per_page) pair with defaults and clamping applied.
    pub fn resolve(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }

    /// The SQL LIMIT/OFFSET pair for the resolved page.
    pub fn limit_offset(&self) -> (i64, i64) {
        let (page, per_page) = self.resolve();
        (per_page as i64, ((page - 1) as i64) * per_page as i64)
    }
}

// --- Shared Resolution Helpers ---

/// Resolves a project by ID within the caller's visible scope.
///
/// Objects outside that scope are reported as 404, never 403: a caller who cannot see
/// a project learns nothing about its existence. This is the single place the
/// visibility filter meets per-object resolution, so every nested route inherits it.
async fn resolve_visible_project(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> ApiResult<Project> {
    let project = state
        .repo
        .get_project(id)
        .await?
        .ok_or(ApiError::NotFound("project"))?;
    if !authz::project_visible(user, &project) {
        return Err(ApiError::NotFound("project"));
    }
    Ok(project)
}

// --- Project Handlers ---

/// list_projects
///
/// [Authenticated Route] Paginated project listing, scoped to what the caller may see:
/// admins get everything, members get their own projects plus all verified ones.
#[utoipa::path(
    get,
    path = "/projects",
    params(PageParams),
    responses((status = 200, description = "Visible projects", body = Page<Project>))
)]
pub async fn list_projects(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<Project>>> {
    let (page, per_page) = params.resolve();
    let (limit, offset) = params.limit_offset();

    let (results, count) = if user.is_admin() {
        state.repo.list_projects(limit, offset).await?
    } else {
        state.repo.list_projects_visible(user.id, limit, offset).await?
    };

    Ok(Json(Page {
        count,
        page,
        per_page,
        results,
    }))
}

/// get_my_projects
///
/// [Authenticated Route] Lists all projects owned by the requesting user, including
/// unverified ones. Unauthenticated callers are rejected with 401 by the extractor;
/// this view never degrades to an empty list for anonymous requests.
#[utoipa::path(
    get,
    path = "/projects/my_projects",
    responses((status = 200, description = "My Projects", body = [Project]))
)]
pub async fn get_my_projects(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.repo.my_projects(id).await?;
    Ok(Json(projects))
}

/// create_project
///
/// [Authenticated Route] Submits a new project. Any authenticated identity may create;
/// the owner is always the caller, and the verified flag is true only for admin
/// authors — member submissions start unverified and invisible to others.
#[utoipa::path(
    post,
    path = "/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_project(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    payload.validate()?;
    let project = state
        .repo
        .create_project(payload, user.id, user.is_admin())
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// get_project
///
/// [Authenticated Route] Retrieves a single project's details by ID, 404 when the
/// project is absent or outside the caller's visible scope.
#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn get_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = resolve_visible_project(&state, &user, id).await?;
    Ok(Json(project))
}

/// update_project
///
/// [Authenticated Route] Partial update of a project's mutable fields. Resolution,
/// visibility, and the write authorization all run before the mutation; a visible but
/// non-owned project yields the ownership 403.
#[utoipa::path(
    put,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 403, description = "Not owner"),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn update_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    payload.validate()?;
    let project = resolve_visible_project(&state, &user, id).await?;
    authz::authorize(&user, Action::Write, Target::Project(&project))?;

    let updated = state
        .repo
        .update_project(id, payload)
        .await?
        .ok_or(ApiError::NotFound("project"))?;
    Ok(Json(updated))
}

/// delete_project
///
/// [Authenticated Route] Deletes a project and, with it, every task it owns. Owner or
/// admin only.
#[utoipa::path(
    delete,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner"),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn delete_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = resolve_visible_project(&state, &user, id).await?;
    authz::authorize(&user, Action::Write, Target::Project(&project))?;

    if state.repo.delete_project(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("project"))
    }
}

/// verify_project
///
/// [Authenticated Route] The one-way visibility transition. The admin guard runs
/// before the project is resolved, so a non-admin always receives the admin-only 403.
/// Re-verifying an already-verified project is indistinguishable success: the exact
/// same 200 body comes back.
#[utoipa::path(
    post,
    path = "/projects/{id}/verify",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Verified", body = VerifyResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn verify_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<VerifyResponse>> {
    authz::can_verify(&user)?;

    state
        .repo
        .set_project_verified(id)
        .await?
        .ok_or(ApiError::NotFound("project"))?;

    Ok(Json(VerifyResponse {
        status: "Project verified".to_string(),
    }))
}

// --- Task Handlers (nested under /projects/{id}/tasks) ---

/// list_tasks
///
/// [Authenticated Route] Paginated task listing for one project. Task visibility is
/// the parent's visibility, so resolving the project through the caller's scope is the
/// entire check.
#[utoipa::path(
    get,
    path = "/projects/{id}/tasks",
    params(("id" = Uuid, Path, description = "Project ID"), PageParams),
    responses(
        (status = 200, description = "Tasks", body = Page<Task>),
        (status = 404, description = "Project not found or not visible")
    )
)]
pub async fn list_tasks(
    user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<Task>>> {
    let project = resolve_visible_project(&state, &user, project_id).await?;

    let (page, per_page) = params.resolve();
    let (limit, offset) = params.limit_offset();
    let (results, count) = state.repo.list_tasks(project.id, limit, offset).await?;

    Ok(Json(Page {
        count,
        page,
        per_page,
        results,
    }))
}

/// create_task
///
/// [Authenticated Route] Adds a task under a project. The parent decides: its owner
/// (or an admin) always may, and a verified parent accepts tasks from any
/// authenticated user.
#[utoipa::path(
    post,
    path = "/projects/{id}/tasks",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Created", body = Task),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "No write access to project"),
        (status = 404, description = "Project not found or not visible")
    )
)]
pub async fn create_task(
    user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    payload.validate()?;
    let project = resolve_visible_project(&state, &user, project_id).await?;
    authz::can_create_task(&user, &project)?;

    let task = state.repo.create_task(project.id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// get_task
///
/// [Authenticated Route] Retrieves one task within its parent project.
#[utoipa::path(
    get,
    path = "/projects/{id}/tasks/{task_id}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Found", body = Task),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn get_task(
    user: AuthUser,
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Task>> {
    let project = resolve_visible_project(&state, &user, project_id).await?;
    let task = state
        .repo
        .get_task(project.id, task_id)
        .await?
        .ok_or(ApiError::NotFound("task"))?;
    authz::authorize(&user, Action::Read, Target::Task(&task, &project))?;
    Ok(Json(task))
}

/// update_task
///
/// [Authenticated Route] Partial update of a task. Unlike project writes, a verified
/// parent project grants write access to every authenticated user, not just the owner.
#[utoipa::path(
    put,
    path = "/projects/{id}/tasks/{task_id}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated", body = Task),
        (status = 403, description = "No write access"),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn update_task(
    user: AuthUser,
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    payload.validate()?;
    let project = resolve_visible_project(&state, &user, project_id).await?;
    let task = state
        .repo
        .get_task(project.id, task_id)
        .await?
        .ok_or(ApiError::NotFound("task"))?;
    authz::authorize(&user, Action::Write, Target::Task(&task, &project))?;

    let updated = state
        .repo
        .update_task(project.id, task_id, payload)
        .await?
        .ok_or(ApiError::NotFound("task"))?;
    Ok(Json(updated))
}

/// delete_task
///
/// [Authenticated Route] Deletes one task, under the same write rule as task updates.
#[utoipa::path(
    delete,
    path = "/projects/{id}/tasks/{task_id}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "No write access"),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn delete_task(
    user: AuthUser,
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let project = resolve_visible_project(&state, &user, project_id).await?;
    let task = state
        .repo
        .get_task(project.id, task_id)
        .await?
        .ok_or(ApiError::NotFound("task"))?;
    authz::authorize(&user, Action::Write, Target::Task(&task, &project))?;

    if state.repo.delete_task(project.id, task_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("task"))
    }
}

// --- Identity Handlers ---

/// register_user
///
/// [Public Route] Creates the local identity row the bearer tokens resolve against.
/// Credential handling lives with the external auth provider; this endpoint only
/// mirrors the identity, which is why it is the one route without auth.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    payload.validate()?;

    let user = state
        .repo
        .create_user(User {
            id: Uuid::new_v4(),
            email: payload.email,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// get_me
///
/// [Authenticated Route] Returns the authenticated caller's own identity record.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<User>> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}
