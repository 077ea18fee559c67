//! Per-page authorization gate, run once the session is known.

use std::sync::{Mutex, PoisonError};

use crate::models::Role;
use crate::services::navigation::{pathname, Navigator};
use crate::services::session::Session;
use crate::utils::paths::{is_onboarding_path, LOGIN_PAGE, UNAUTHORIZED_PAGE};

#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// `None` admits every signed-in role.
    pub allowed_roles: Option<Vec<Role>>,
    pub requires_onboarding: bool,
    /// Where signed-out visitors are sent.
    pub redirect_to: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            allowed_roles: None,
            requires_onboarding: true,
            redirect_to: LOGIN_PAGE.to_string(),
        }
    }
}

impl GuardConfig {
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: Some(roles.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn without_onboarding(mut self) -> Self {
        self.requires_onboarding = false;
        self
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }
}

/// Everything the guard looks at for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct GuardInput<'a> {
    pub pathname: &'a str,
    pub session: &'a Session,
    pub profile_initialized: bool,
    pub refreshing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Wait,
    Redirect(String),
    Render,
}

pub fn authorize(config: &GuardConfig, input: &GuardInput<'_>) -> GuardDecision {
    let session = input.session;
    if !session.initialized || input.refreshing {
        return GuardDecision::Wait;
    }

    let Some(user) = &session.user else {
        return GuardDecision::Redirect(config.redirect_to.clone());
    };

    if user.is_onboarded_artist() && !input.profile_initialized {
        return GuardDecision::Wait;
    }

    if let Some(allowed) = &config.allowed_roles {
        if !allowed.contains(&user.role) {
            return GuardDecision::Redirect(UNAUTHORIZED_PAGE.to_string());
        }
    }

    let on_onboarding = is_onboarding_path(input.pathname);
    if user.has_onboarded && on_onboarding {
        return GuardDecision::Redirect(user.role.dashboard_path().to_string());
    }
    if config.requires_onboarding && !user.has_onboarded && !on_onboarding {
        if let Some(onboarding) = user.role.onboarding_path() {
            return GuardDecision::Redirect(onboarding.to_string());
        }
    }

    GuardDecision::Render
}

/// What the page shows while the guard runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView {
    Loading,
    Redirecting,
    Children,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Pending,
    /// A redirect already fired for this pathname.
    Redirected { pathname: String },
}

/// Stateful wrapper that fires at most one redirect per pathname.
pub struct RouteGuard {
    config: GuardConfig,
    phase: Mutex<Phase>,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            phase: Mutex::new(Phase::default()),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn check(&self, input: &GuardInput<'_>, navigator: &dyn Navigator) -> GuardView {
        let path = pathname(input.pathname);
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);

        if let Phase::Redirected { pathname } = &*phase {
            if pathname == path {
                return GuardView::Redirecting;
            }
            *phase = Phase::Pending;
        }

        match authorize(&self.config, &GuardInput { pathname: path, ..*input }) {
            GuardDecision::Wait => GuardView::Loading,
            GuardDecision::Render => GuardView::Children,
            GuardDecision::Redirect(to) => {
                tracing::info!(from = %path, to = %to, "Route guard redirect");
                *phase = Phase::Redirected {
                    pathname: path.to_string(),
                };
                navigator.replace(&to);
                GuardView::Redirecting
            }
        }
    }
}
