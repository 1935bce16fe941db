use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use taskboard::{
    AppState,
    auth::{AuthUser, Claims},
    config::{AppConfig, Env},
    error::ApiError,
    models::{
        CreateProjectRequest, CreateTaskRequest, Project, Task, UpdateProjectRequest,
        UpdateTaskRequest, User,
    },
    repository::Repository,
};
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user(&self, _id: Uuid) -> sqlx::Result<Option<User>> {
        Ok(self.user_to_return.clone())
    }

    // Placeholder implementations for the trait methods the extractor never touches.
    async fn list_projects(&self, _limit: i64, _offset: i64) -> sqlx::Result<(Vec<Project>, i64)> {
        Ok((vec![], 0))
    }
    async fn list_projects_visible(
        &self,
        _viewer_id: Uuid,
        _limit: i64,
        _offset: i64,
    ) -> sqlx::Result<(Vec<Project>, i64)> {
        Ok((vec![], 0))
    }
    async fn my_projects(&self, _owner_id: Uuid) -> sqlx::Result<Vec<Project>> {
        Ok(vec![])
    }
    async fn get_project(&self, _id: Uuid) -> sqlx::Result<Option<Project>> {
        Ok(None)
    }
    async fn create_project(
        &self,
        _req: CreateProjectRequest,
        _owner_id: Uuid,
        _verified: bool,
    ) -> sqlx::Result<Project> {
        Ok(Project::default())
    }
    async fn update_project(
        &self,
        _id: Uuid,
        _req: UpdateProjectRequest,
    ) -> sqlx::Result<Option<Project>> {
        Ok(None)
    }
    async fn set_project_verified(&self, _id: Uuid) -> sqlx::Result<Option<Project>> {
        Ok(None)
    }
    async fn delete_project(&self, _id: Uuid) -> sqlx::Result<bool> {
        Ok(false)
    }
    async fn list_tasks(
        &self,
        _project_id: Uuid,
        _limit: i64,
        _offset: i64,
    ) -> sqlx::Result<(Vec<Task>, i64)> {
        Ok((vec![], 0))
    }
    async fn get_task(&self, _project_id: Uuid, _task_id: Uuid) -> sqlx::Result<Option<Task>> {
        Ok(None)
    }
    async fn create_task(&self, _project_id: Uuid, _req: CreateTaskRequest) -> sqlx::Result<Task> {
        Ok(Task::default())
    }
    async fn update_task(
        &self,
        _project_id: Uuid,
        _task_id: Uuid,
        _req: UpdateTaskRequest,
    ) -> sqlx::Result<Option<Task>> {
        Ok(None)
    }
    async fn delete_task(&self, _project_id: Uuid, _task_id: Uuid) -> sqlx::Result<bool> {
        Ok(false)
    }
    async fn create_user(&self, _user: User) -> sqlx::Result<User> {
        Ok(User::default())
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn create_token(user_id: Uuid, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        // Token expires exp_offset seconds from now (negative = already expired).
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: MockAuthRepo, jwt_secret: String) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = jwt_secret;

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn assert_unauthenticated(result: Result<AuthUser, ApiError>, expected_detail: &str) {
    match result {
        Err(ApiError::AuthenticationRequired(detail)) => assert_eq!(detail, expected_detail),
        other => panic!("expected 401 rejection, got {other:?}"),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, 3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(User {
            id: TEST_USER_ID,
            email: "test@example.com".to_string(),
            role: "member".to_string(),
        }),
    };

    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.expect("valid token should authenticate");
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, "member");
    assert!(!user.is_admin());
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(),
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_unauthenticated(auth_user, "Authentication credentials were not provided.");
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Issued in the past, expired an hour ago.
    let token = create_token(TEST_USER_ID, -3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(User::default()),
    };
    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_unauthenticated(auth_user, "Token has expired.");
}

#[tokio::test]
async fn test_auth_failure_when_token_user_was_deleted() {
    // The token itself is valid, but no user row backs it anymore.
    let token = create_token(TEST_USER_ID, 3600);

    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo {
            user_to_return: None,
        },
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_unauthenticated(auth_user, "User not found.");
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_user_id = Uuid::new_v4();
    let mock_repo = MockAuthRepo {
        user_to_return: Some(User {
            id: mock_user_id,
            email: "local@dev.com".to_string(),
            role: "admin".to_string(),
        }),
    };
    let app_state = create_app_state(Env::Local, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.expect("local bypass should authenticate a known user");
    assert_eq!(user.id, mock_user_id);
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_user_id = Uuid::new_v4();
    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(),
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_unauthenticated(auth_user, "Authentication credentials were not provided.");
}
