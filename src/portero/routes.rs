//! Application route table.

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const LOGOUT: &str = "/logout";
pub const DASHBOARD: &str = "/dashboard";
pub const HEALTH: &str = "/health";

/// Routes reachable without a session. `HOME` matches exactly, the rest by
/// prefix (see `GuardConfig`).
#[must_use]
pub fn public_routes() -> Vec<String> {
    vec![HOME.to_string(), LOGIN.to_string(), REGISTER.to_string()]
}

/// Prefixes the guard never inspects: API surface, health, static assets and
/// the logout action, which must stay reachable in every session state.
#[must_use]
pub fn exempt_prefixes() -> Vec<String> {
    vec![
        "/api".to_string(),
        HEALTH.to_string(),
        "/static".to_string(),
        LOGOUT.to_string(),
    ]
}
