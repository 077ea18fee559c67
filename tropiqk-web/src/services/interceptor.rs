//! 401 handling for every API call: one silent token refresh at a time,
//! queued callers released in order, a single retry per request, and a hard
//! redirect to the login page when the session cannot be recovered.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch};

use crate::error::{codes, ClientError};
use crate::services::metrics;
use crate::services::navigation::{pathname, KeyValueStorage, Navigator};
use crate::services::session::SessionStore;
use crate::services::transport::{ApiRequest, ApiResponse, Transport};
use crate::utils::paths::{is_auth_page, LOGIN_PAGE};

pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Session-storage key holding the page to return to after signing in.
pub const REDIRECT_AFTER_LOGIN_KEY: &str = "redirectAfterLogin";

/// Lets other components wait for an in-flight refresh.
#[async_trait]
pub trait RefreshMonitor: Send + Sync {
    fn is_refreshing(&self) -> bool;

    /// Resolves once no refresh is in flight.
    async fn refresh_settled(&self);
}

type Waiter = oneshot::Sender<Result<(), String>>;

#[derive(Default)]
struct RefreshQueue {
    is_refreshing: bool,
    failed_queue: Vec<Waiter>,
}

/// What a 401 means for the request that received it.
#[derive(Debug, PartialEq, Eq)]
enum Unauthorized {
    /// Session is gone: redirect and fail.
    Terminal,
    /// Caller handles it (bad credentials, unverified email).
    Propagate,
    /// Worth a token refresh.
    Refreshable,
}

fn classify(request: &ApiRequest, error: &ClientError) -> Unauthorized {
    if request.path == REFRESH_PATH {
        return Unauthorized::Terminal;
    }
    match error.code() {
        Some(codes::NO_REFRESH_TOKEN | codes::REFRESH_FAILED) => Unauthorized::Terminal,
        Some(codes::EMAIL_NOT_VERIFIED) => Unauthorized::Propagate,
        _ if request.path == LOGIN_PATH => Unauthorized::Propagate,
        _ => Unauthorized::Refreshable,
    }
}

fn lock(queue: &Mutex<RefreshQueue>) -> MutexGuard<'_, RefreshQueue> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct AuthInterceptor {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    storage: Arc<dyn KeyValueStorage>,
    queue: Mutex<RefreshQueue>,
    refreshing: watch::Sender<bool>,
}

/// Settles the queue if the refreshing caller is dropped mid-flight, so
/// queued callers are never stranded.
struct RefreshGuard<'a> {
    interceptor: &'a AuthInterceptor,
    settled: bool,
}

impl RefreshGuard<'_> {
    fn settle(&mut self, outcome: Result<(), String>) {
        self.settled = true;
        self.interceptor.settle(outcome);
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Token refresh abandoned, releasing queued requests");
            self.interceptor.settle(Err("token refresh was cancelled".to_string()));
        }
    }
}

impl AuthInterceptor {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            storage,
            queue: Mutex::new(RefreshQueue::default()),
            refreshing: watch::channel(false).0,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Sends `request`, refreshing the session and replaying it once when
    /// the API answers 401.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ClientError> {
        loop {
            let response = self.transport.execute(&request).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return response.error_for_status();
            }

            let error = response.into_error();
            match classify(&request, &error) {
                Unauthorized::Terminal => {
                    self.redirect_to_login();
                    return Err(error);
                }
                Unauthorized::Propagate => return Err(error),
                Unauthorized::Refreshable if request.retried => {
                    tracing::debug!(path = %request.path, "Retried request rejected again");
                    return Err(error);
                }
                Unauthorized::Refreshable => {
                    request.retried = true;
                    self.await_refresh().await?;
                }
            }
        }
    }

    /// Joins the in-flight refresh or starts one.
    async fn await_refresh(&self) -> Result<(), ClientError> {
        let waiter = {
            let mut queue = lock(&self.queue);
            if queue.is_refreshing {
                let (tx, rx) = oneshot::channel();
                queue.failed_queue.push(tx);
                Some(rx)
            } else {
                queue.is_refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(reason)) => Err(ClientError::RefreshFailed(reason)),
                Err(_) => Err(ClientError::RefreshFailed(
                    "token refresh was cancelled".to_string(),
                )),
            };
        }

        self.refreshing.send_replace(true);
        let mut guard = RefreshGuard {
            interceptor: self,
            settled: false,
        };

        tracing::info!("Access token rejected, refreshing session");
        let outcome = self
            .transport
            .execute(&ApiRequest::post(REFRESH_PATH))
            .await
            .and_then(ApiResponse::error_for_status);

        match outcome {
            Ok(_) => {
                metrics::record_token_refresh("success");
                guard.settle(Ok(()));
                Ok(())
            }
            Err(e) => {
                metrics::record_token_refresh("failure");
                let reason = e.to_string();
                guard.settle(Err(reason.clone()));
                self.redirect_to_login();
                Err(ClientError::RefreshFailed(reason))
            }
        }
    }

    /// Releases every queued caller, in enqueue order, with `outcome`.
    fn settle(&self, outcome: Result<(), String>) {
        let waiters = {
            let mut queue = lock(&self.queue);
            queue.is_refreshing = false;
            std::mem::take(&mut queue.failed_queue)
        };
        self.refreshing.send_replace(false);

        tracing::debug!(queued = waiters.len(), ok = outcome.is_ok(), "Releasing queued requests");
        for waiter in waiters {
            // A dropped receiver means its caller went away.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Clears the session and sends the visitor to the login page,
    /// remembering where they were. Ends in the state a reload onto the
    /// login page would give: signed out and initialized, with the next
    /// bootstrap re-armed.
    fn redirect_to_login(&self) {
        self.session.clear_auth();
        self.session.mark_initialized();

        let current = self.navigator.current_path();
        let path = pathname(&current);
        if !is_auth_page(path) {
            self.storage.set(REDIRECT_AFTER_LOGIN_KEY, &current);
        }
        if path != LOGIN_PAGE {
            self.navigator.navigate(LOGIN_PAGE);
        }
        tracing::warn!(from = %current, "Session expired, redirecting to login");
    }
}

#[async_trait]
impl RefreshMonitor for AuthInterceptor {
    fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    async fn refresh_settled(&self) {
        let mut rx = self.refreshing.subscribe();
        // The sender lives in `self`, so this cannot fail.
        let _ = rx.wait_for(|refreshing| !*refreshing).await;
    }
}
