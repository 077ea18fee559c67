//! First-pass routing gate run before any page handler.
//!
//! Decisions come from the `accessToken` claims decoded without signature
//! verification, so they are hints: a forged cookie gets past this layer but
//! not past the API.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::Role;
use crate::services::metrics;
use crate::utils::jwt::decode_jwt_claims;
use crate::utils::paths::{
    is_auth_page, is_guarded_path, protected_area, LOGIN_PAGE, UNAUTHORIZED_PAGE,
};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    PassThrough,
    /// Protected page, access token missing or expired but a refresh token
    /// is present: let the page load and its client refresh the session.
    PassUnauthenticated,
    Redirect(String),
}

impl EdgeDecision {
    pub fn label(&self) -> &'static str {
        match self {
            EdgeDecision::PassThrough => "pass",
            EdgeDecision::PassUnauthenticated => "pass_unauthenticated",
            EdgeDecision::Redirect(_) => "redirect",
        }
    }
}

/// What the edge guard learned about the visitor, attached to the request
/// for page handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAuth {
    Authenticated(Option<Role>),
    RefreshPending,
    Anonymous,
}

impl EdgeAuth {
    pub fn role(&self) -> Option<Role> {
        match self {
            EdgeAuth::Authenticated(role) => *role,
            _ => None,
        }
    }
}

/// Decides what to do with a page request. `now` is unix seconds.
pub fn evaluate(
    path: &str,
    access_token: Option<&str>,
    has_refresh_token: bool,
    now: i64,
) -> EdgeDecision {
    let claims = access_token
        .and_then(|token| decode_jwt_claims(token).ok())
        .filter(|claims| !claims.is_expired(now));

    if let Some(claims) = &claims {
        if path == "/" || is_auth_page(path) {
            if let Some(role) = claims.role {
                return EdgeDecision::Redirect(role.dashboard_path().to_string());
            }
        }
    }

    let Some(area) = protected_area(path) else {
        return EdgeDecision::PassThrough;
    };

    match claims {
        None if has_refresh_token => EdgeDecision::PassUnauthenticated,
        None => EdgeDecision::Redirect(LOGIN_PAGE.to_string()),
        Some(claims) => match claims.role {
            Some(role) if role == area => EdgeDecision::PassThrough,
            Some(role) if area != Role::Admin => {
                EdgeDecision::Redirect(role.dashboard_path().to_string())
            }
            _ => EdgeDecision::Redirect(UNAUTHORIZED_PAGE.to_string()),
        },
    }
}

fn edge_auth(jar: &CookieJar, now: i64) -> EdgeAuth {
    let claims = jar
        .get(ACCESS_TOKEN_COOKIE)
        .and_then(|c| decode_jwt_claims(c.value()).ok())
        .filter(|claims| !claims.is_expired(now));

    match claims {
        Some(claims) => EdgeAuth::Authenticated(claims.role),
        None if jar.get(REFRESH_TOKEN_COOKIE).is_some() => EdgeAuth::RefreshPending,
        None => EdgeAuth::Anonymous,
    }
}

pub async fn edge_guard_middleware(jar: CookieJar, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !is_guarded_path(&path) {
        return next.run(req).await;
    }

    let now = chrono::Utc::now().timestamp();
    let decision = evaluate(
        &path,
        jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value()),
        jar.get(REFRESH_TOKEN_COOKIE).is_some(),
        now,
    );
    metrics::record_edge_decision(decision.label());

    match decision {
        EdgeDecision::Redirect(to) => {
            tracing::info!(path = %path, to = %to, "Edge guard redirect");
            Redirect::temporary(&to).into_response()
        }
        EdgeDecision::PassThrough | EdgeDecision::PassUnauthenticated => {
            req.extensions_mut().insert(edge_auth(&jar, now));
            next.run(req).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::encode_test_token;
    use serde_json::json;

    const NOW: i64 = 1_760_000_000;

    fn token(role: &str) -> String {
        encode_test_token(&json!({ "role": role, "exp": NOW + 900 }))
    }

    fn redirect(to: &str) -> EdgeDecision {
        EdgeDecision::Redirect(to.to_string())
    }

    #[test]
    fn signed_in_visitors_skip_landing_and_auth_pages() {
        let fan = token("Fan");
        assert_eq!(evaluate("/", Some(&fan), true, NOW), redirect("/fans/dashboard"));
        assert_eq!(
            evaluate("/auth/login", Some(&fan), false, NOW),
            redirect("/fans/dashboard")
        );
        assert_eq!(
            evaluate("/auth/verify-email", Some(&fan), false, NOW),
            EdgeDecision::PassThrough
        );
    }

    #[test]
    fn protected_area_without_tokens_goes_to_login() {
        assert_eq!(evaluate("/artist/dashboard", None, false, NOW), redirect("/auth/login"));
    }

    #[test]
    fn refresh_token_alone_passes_unauthenticated() {
        assert_eq!(
            evaluate("/artist/dashboard", None, true, NOW),
            EdgeDecision::PassUnauthenticated
        );

        let expired = encode_test_token(&json!({ "role": "Artist", "exp": NOW - 1 }));
        assert_eq!(
            evaluate("/artist/dashboard", Some(&expired), true, NOW),
            EdgeDecision::PassUnauthenticated
        );
        assert_eq!(
            evaluate("/artist/dashboard", Some(&expired), false, NOW),
            redirect("/auth/login")
        );
    }

    #[test]
    fn wrong_role_goes_home_or_unauthorized() {
        assert_eq!(
            evaluate("/artist/dashboard", Some(&token("Fan")), true, NOW),
            redirect("/fans/dashboard")
        );
        assert_eq!(
            evaluate("/admin/dashboard", Some(&token("Artist")), true, NOW),
            redirect("/unauthorized")
        );
        assert_eq!(
            evaluate("/fans/dashboard", Some(&token("Admin")), true, NOW),
            redirect("/admin/dashboard")
        );

        let roleless = encode_test_token(&json!({ "exp": NOW + 60 }));
        assert_eq!(
            evaluate("/fans/dashboard", Some(&roleless), true, NOW),
            redirect("/unauthorized")
        );
    }

    #[test]
    fn matching_role_and_public_pages_pass() {
        assert_eq!(
            evaluate("/artist/onboarding", Some(&token("Artist")), true, NOW),
            EdgeDecision::PassThrough
        );
        assert_eq!(evaluate("/", None, false, NOW), EdgeDecision::PassThrough);
        assert_eq!(evaluate("/unauthorized", None, false, NOW), EdgeDecision::PassThrough);
    }

    #[test]
    fn garbage_token_counts_as_missing() {
        assert_eq!(
            evaluate("/fans/dashboard", Some("garbage"), false, NOW),
            redirect("/auth/login")
        );
    }
}
