use axum::{extract::State, response::Html, Extension};
use tropiqk_core::error::AppError;

use super::PageTemplate;
use crate::middleware::EdgeAuth;
use crate::AppState;

pub async fn index(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Home")
        .heading("Caribbean sound, straight from the artists")
        .lead("Stream new releases and support the artists behind them.")
        .link("/auth/register", "Create an account")
        .link("/auth/login", "Sign in")
        .into_html()
}

pub async fn unauthorized(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Not allowed")
        .heading("You don't have access to this page")
        .lead("Your account can't open this area of Tropiqk.")
        .link("/", "Back to home")
        .into_html()
}

pub async fn health_check() -> &'static str {
    "OK"
}
