use crate::models::{
    CreateProjectRequest, CreateTaskRequest, Project, Task, UpdateProjectRequest,
    UpdateTaskRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, owner_id, name, description, verified, created_at, updated_at";
const TASK_COLUMNS: &str = "id, project_id, title, description, status, created_at, updated_at";

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the handlers
/// to interact with the data layer without knowing the specific implementation
/// (Postgres, Mock, etc.).
///
/// Every method returns `sqlx::Result`: database failures propagate to the caller and
/// surface as explicit 500s instead of being logged-and-defaulted away.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Project Retrieval ---
    // Admin scope: every project, newest first. Returns the page slice and the total count.
    async fn list_projects(&self, limit: i64, offset: i64) -> sqlx::Result<(Vec<Project>, i64)>;
    // Member scope: owned-or-verified union, duplicates collapse naturally (one row per project).
    async fn list_projects_visible(
        &self,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Project>, i64)>;
    // Strict-owner view, independent of verification state. Unpaginated.
    async fn my_projects(&self, owner_id: Uuid) -> sqlx::Result<Vec<Project>>;
    // Plain retrieval by ID; visibility is the caller's concern (decided per-identity).
    async fn get_project(&self, id: Uuid) -> sqlx::Result<Option<Project>>;

    // --- Project Mutations ---
    async fn create_project(
        &self,
        req: CreateProjectRequest,
        owner_id: Uuid,
        verified: bool,
    ) -> sqlx::Result<Project>;
    // Partial update via COALESCE; authorization happens before this is called.
    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> sqlx::Result<Option<Project>>;
    // One-way transition to verified = true. Idempotent at the SQL level.
    async fn set_project_verified(&self, id: Uuid) -> sqlx::Result<Option<Project>>;
    // Cascading delete: removes the project's tasks and the project in one transaction.
    async fn delete_project(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Tasks (always addressed within their parent project) ---
    async fn list_tasks(
        &self,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Task>, i64)>;
    async fn get_task(&self, project_id: Uuid, task_id: Uuid) -> sqlx::Result<Option<Task>>;
    async fn create_task(&self, project_id: Uuid, req: CreateTaskRequest) -> sqlx::Result<Task>;
    async fn update_task(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        req: UpdateTaskRequest,
    ) -> sqlx::Result<Option<Task>>;
    async fn delete_task(&self, project_id: Uuid, task_id: Uuid) -> sqlx::Result<bool>;

    // --- User/Auth ---
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>>;
    async fn create_user(&self, user: User) -> sqlx::Result<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_projects
    ///
    /// Administrative scope: retrieves all project records with no visibility restriction.
    async fn list_projects(&self, limit: i64, offset: i64) -> sqlx::Result<(Vec<Project>, i64)> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, count))
    }

    /// list_projects_visible
    ///
    /// Member scope: the owned-or-verified union. This WHERE clause is the SQL twin of
    /// the `project_visible` predicate and must stay in lockstep with it.
    async fn list_projects_visible(
        &self,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Project>, i64)> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             WHERE owner_id = $1 OR verified = TRUE \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        ))
        .bind(viewer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE owner_id = $1 OR verified = TRUE")
                .bind(viewer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows, count))
    }

    /// my_projects
    ///
    /// Retrieves all projects owned by the user, including unverified ones.
    async fn my_projects(&self, owner_id: Uuid) -> sqlx::Result<Vec<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    /// get_project
    ///
    /// Simple retrieval of any project by ID. Visibility is decided per-identity by the
    /// calling handler, which has the viewer in hand; the row itself is identity-neutral.
    async fn get_project(&self, id: Uuid) -> sqlx::Result<Option<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_project
    ///
    /// Inserts a new project. The owner and the verified flag are both decided by the
    /// handler from the authenticated identity (admins publish immediately).
    async fn create_project(
        &self,
        req: CreateProjectRequest,
        owner_id: Uuid,
        verified: bool,
    ) -> sqlx::Result<Project> {
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (id, owner_id, name, description, verified, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(req.name)
        .bind(req.description)
        .bind(verified)
        .fetch_one(&self.pool)
        .await
    }

    /// update_project
    ///
    /// Partial update using the PostgreSQL `COALESCE` function to efficiently handle
    /// `Option<T>` fields, only updating a column if the corresponding field is `Some`.
    /// `owner_id` and `verified` are never touched here.
    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> sqlx::Result<Option<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.description)
        .fetch_optional(&self.pool)
        .await
    }

    /// set_project_verified
    ///
    /// Flips the one-way verified flag. Running it against an already-verified project
    /// is a no-op update that still returns the row, which is what makes the verify
    /// endpoint idempotent.
    async fn set_project_verified(&self, id: Uuid) -> sqlx::Result<Option<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET verified = TRUE, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// delete_project
    ///
    /// Deletes the project's tasks and the project row inside a single transaction, so
    /// the cascade holds regardless of what the schema declares.
    async fn delete_project(&self, id: Uuid) -> sqlx::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // --- TASKS ---

    /// list_tasks
    ///
    /// Lists a project's tasks. The caller has already resolved the parent project and
    /// run the visibility check; tasks inherit that decision wholesale.
    async fn list_tasks(
        &self,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Task>, i64)> {
        let rows = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        ))
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, count))
    }

    /// get_task
    ///
    /// Retrieves a task addressed within its parent project. A task ID under the wrong
    /// project yields None, matching the nested route shape.
    async fn get_task(&self, project_id: Uuid, task_id: Uuid) -> sqlx::Result<Option<Task>> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND project_id = $2"
        ))
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_task
    ///
    /// Inserts a new task under the given project, defaulting the status to `todo`.
    async fn create_task(&self, project_id: Uuid, req: CreateTaskRequest) -> sqlx::Result<Task> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, project_id, title, description, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
    }

    /// update_task
    ///
    /// COALESCE partial update, scoped to the parent project. `project_id` is immutable.
    async fn update_task(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        req: UpdateTaskRequest,
    ) -> sqlx::Result<Option<Task>> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks \
             SET title = COALESCE($3, title), \
                 description = COALESCE($4, description), \
                 status = COALESCE($5, status), \
                 updated_at = NOW() \
             WHERE id = $1 AND project_id = $2 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(project_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await
    }

    /// delete_task
    ///
    /// Deletes a single task within its parent project.
    async fn delete_task(&self, project_id: Uuid, task_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND project_id = $2")
            .bind(task_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- USERS ---

    /// get_user
    ///
    /// Retrieves user data (ID, email, role) needed for authentication and authorization.
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// create_user
    ///
    /// Creates the local identity row that bearer tokens resolve against.
    async fn create_user(&self, user: User) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, role) VALUES ($1, $2, $3) RETURNING id, email, role",
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
    }
}
