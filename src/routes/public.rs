use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines the only endpoints reachable without a bearer token. Every data route in
/// this service requires authentication; the sole exceptions are the liveness probe
/// and the creation of an identity itself.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Creates the local identity row. Credential issuance stays with the external
        // auth provider; this is the mirror-profile step of that flow.
        .route("/register", post(handlers::register_user))
}
