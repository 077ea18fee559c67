pub mod app;
pub mod auth;
pub mod dashboard;
pub mod metrics;

use askama::Template;
use axum::{response::Html, Extension};
use tropiqk_core::error::AppError;

use crate::middleware::EdgeAuth;
use crate::models::Role;
use crate::AppState;

/// Shell shared by every page. The client picks up `data-*` attributes to
/// bootstrap the session and run the route guard.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: &'static str,
    pub heading: String,
    pub lead: String,
    pub area: &'static str,
    pub session: &'static str,
    pub role: Option<Role>,
    pub links: Vec<(&'static str, &'static str)>,
    pub api_base_url: String,
}

impl PageTemplate {
    pub fn new(state: &AppState, edge: Option<Extension<EdgeAuth>>, title: &'static str) -> Self {
        let edge = edge.map(|Extension(edge)| edge);
        let session = match edge {
            Some(EdgeAuth::Authenticated(_)) => "authenticated",
            Some(EdgeAuth::RefreshPending) => "refresh_pending",
            Some(EdgeAuth::Anonymous) | None => "anonymous",
        };

        Self {
            title,
            heading: title.to_string(),
            lead: String::new(),
            area: "public",
            session,
            role: edge.and_then(|e| e.role()),
            links: Vec::new(),
            api_base_url: state.settings.api.base_url.clone(),
        }
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = lead.into();
        self
    }

    pub fn area(mut self, area: &'static str) -> Self {
        self.area = area;
        self
    }

    pub fn link(mut self, href: &'static str, label: &'static str) -> Self {
        self.links.push((href, label));
        self
    }

    pub fn into_html(self) -> Result<Html<String>, AppError> {
        let body = self.render().map_err(|e| {
            tracing::error!(error = %e, title = self.title, "Failed to render page");
            AppError::InternalError(e.into())
        })?;
        Ok(Html(body))
    }
}
