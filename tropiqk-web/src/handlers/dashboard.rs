use axum::{extract::State, response::Html, Extension};
use tropiqk_core::error::AppError;

use super::PageTemplate;
use crate::middleware::EdgeAuth;
use crate::AppState;

pub async fn artist_dashboard(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Artist dashboard")
        .area("artist")
        .lead("Your tracks, their review status and your profile completion.")
        .into_html()
}

pub async fn artist_onboarding(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Set up your artist profile")
        .area("artist")
        .lead("Tell fans who you are before your first upload.")
        .into_html()
}

pub async fn fans_dashboard(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Your music")
        .area("fans")
        .lead("New releases from the artists you follow.")
        .into_html()
}

pub async fn fans_onboarding(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Welcome to Tropiqk")
        .area("fans")
        .lead("Pick a few genres so we know what to play you.")
        .into_html()
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    edge: Option<Extension<EdgeAuth>>,
) -> Result<Html<String>, AppError> {
    PageTemplate::new(&state, edge, "Review queue")
        .area("admin")
        .lead("Tracks waiting for approval.")
        .into_html()
}
