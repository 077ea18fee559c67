//! Fixtures shared by the unit tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::ClientError;
use crate::models::{Role, User};
use crate::services::transport::{ApiRequest, ApiResponse, Transport};

pub fn user(role: Role, onboarded: bool) -> User {
    User {
        id: format!("{}-1", role.as_str().to_lowercase()),
        username: "nel".into(),
        email: "nel@tropiqk.io".into(),
        role,
        has_onboarded: onboarded,
        profile_pic: None,
    }
}

pub fn json_response(status: StatusCode, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string().into_bytes())
}

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, ClientError> + Send + Sync;

/// Scripted transport. Every call is recorded before the optional delay, so
/// concurrent callers show up in arrival order.
pub struct MockTransport {
    responder: Box<Responder>,
    calls: Mutex<Vec<ApiRequest>>,
    delays: Vec<(String, Duration)>,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<ApiResponse, ClientError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            delays: Vec::new(),
        }
    }

    /// Delays every call whose path equals `path`.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.push((path.to_string(), delay));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some((_, delay)) = self.delays.iter().find(|(p, _)| *p == request.path) {
            tokio::time::sleep(*delay).await;
        }

        (self.responder)(request)
    }
}
