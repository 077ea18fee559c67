use axum::{
    extract::{Query, State},
    response::Html,
    Extension,
};
use serde::Deserialize;
use tropiqk_core::error::AppError;

use super::PageTemplate;
use crate::middleware::EdgeAuth;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn login_page(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Sign in")
        .area("auth")
        .lead("Welcome back. Sign in with your email and password.")
        .link("/auth/register", "New here? Create an account")
        .into_html()
}

pub async fn register_page(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Create an account")
        .area("auth")
        .lead("Join as an artist to share your music, or as a fan to discover it.")
        .link("/auth/login", "Already have an account? Sign in")
        .into_html()
}

pub async fn verify_email_page(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Html<String>, AppError> {
    let lead = match query.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            format!("Enter the code we sent to {}.", email)
        }
        _ => "Enter the code we sent to your email.".to_string(),
    };

    PageTemplate::new(&state, edge, "Verify your email")
        .area("auth")
        .lead(lead)
        .into_html()
}
