//! Path classification shared by the edge guard, the bootstrapper and the
//! interceptor.

use crate::models::Role;

pub const LOGIN_PAGE: &str = "/auth/login";
pub const REGISTER_PAGE: &str = "/auth/register";
pub const VERIFY_EMAIL_PAGE: &str = "/auth/verify-email";
pub const UNAUTHORIZED_PAGE: &str = "/unauthorized";

pub const AUTH_PAGES: [&str; 2] = [LOGIN_PAGE, REGISTER_PAGE];

const PROTECTED_AREAS: [Role; 3] = [Role::Artist, Role::Fan, Role::Admin];

/// `true` when `path` equals `prefix` or continues it with a new segment.
pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.contains(&path)
}

/// Pages that never need the session fetched.
pub fn is_public_page(path: &str) -> bool {
    path == "/" || path == UNAUTHORIZED_PAGE || has_segment_prefix(path, "/auth")
}

/// Role whose area `path` lies in, if any.
pub fn protected_area(path: &str) -> Option<Role> {
    PROTECTED_AREAS
        .into_iter()
        .find(|role| has_segment_prefix(path, role.area_prefix()))
}

pub fn is_onboarding_path(path: &str) -> bool {
    path.contains("/onboarding")
}

/// Paths the edge guard inspects: everything except the API, framework and
/// static assets.
pub fn is_guarded_path(path: &str) -> bool {
    const SKIPPED: [&str; 3] = ["/api", "/static", "/_next"];

    if SKIPPED.iter().any(|prefix| has_segment_prefix(path, prefix)) {
        return false;
    }
    if path == "/favicon.ico" {
        return false;
    }
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    !last_segment.contains('.')
}
