use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents the user's canonical identity record stored in the `users` table.
/// Credential material lives with the external auth service; this row only carries
/// what authorization decisions need.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // The user's primary identifier.
    pub email: String,
    // The RBAC field: 'member' or 'admin'.
    pub role: String,
}

/// Project
///
/// Represents a project record from the `projects` table. This is the primary data
/// structure for the access-control logic: `owner_id` and `verified` together decide
/// who can see and mutate the project and every task under it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Project {
    pub id: Uuid,
    // FK to users.id. Immutable after creation; always the creating user.
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,

    // Visibility gate: unverified projects are visible to their owner (and admins) only.
    // Set to true at creation for admin authors, otherwise flipped by the verify workflow.
    pub verified: bool,

    // Timestamp handling for database integration and JSON serialization.
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// TaskStatus
///
/// The closed set of workflow states a task moves through. Stored as text in the
/// `tasks` table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[ts(export)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

/// Task
///
/// Represents a task record from the `tasks` table. Tasks carry no access-control
/// state of their own: visibility and mutability derive entirely from the parent
/// project's `owner_id` and `verified` fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Task {
    pub id: Uuid,
    // FK to projects.id. Read-only once set; tasks never move between projects.
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---

/// CreateProjectRequest
///
/// Input payload for submitting a new project (POST /projects). The owner and the
/// verified flag are never accepted from the client; both are derived from the
/// authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: String,
}

/// UpdateProjectRequest
///
/// Partial update payload for modifying an existing project (PUT/PATCH /projects/{id}).
///
/// Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// to efficiently handle partial updates, ensuring only provided fields are included in
/// the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// CreateTaskRequest
///
/// Input payload for adding a task under a project (POST /projects/{id}/tasks).
/// The parent project comes from the path, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: String,
    // Defaults to `todo` when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// UpdateTaskRequest
///
/// Partial update payload for a task (PUT/PATCH /projects/{id}/tasks/{task_id}).
/// `project_id` is deliberately absent: tasks cannot be re-parented.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// Credentials are handled by the external auth provider; this service only mirrors
/// the identity row it will later resolve tokens against.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct RegisterUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = validate_role))]
    pub role: String,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "member" | "admin" => Ok(()),
        _ => {
            let mut err = ValidationError::new("role");
            err.message = Some("role must be one of: member, admin".into());
            Err(err)
        }
    }
}

/// --- Response Envelopes (Output Schemas) ---

/// Page
///
/// Stable pagination envelope for list endpoints: total row count for the scope plus
/// the requested slice.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Page<T: TS> {
    pub count: i64,
    pub page: u32,
    pub per_page: u32,
    pub results: Vec<T>,
}

/// VerifyResponse
///
/// Output schema for the verification endpoint. Re-verifying an already-verified
/// project returns this exact same body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VerifyResponse {
    pub status: String,
}
