/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. This structure ensures that
/// access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.

/// Routes accessible without a resolved identity: the health probe and the
/// identity-creation endpoint itself.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session; per-object authorization happens inside
/// the handlers through the authorization engine.
pub mod authenticated;
