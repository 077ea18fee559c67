//! Wires the stores, the interceptor and the flows into one client.

use std::sync::Arc;

use crate::config::ApiSettings;
use crate::error::ClientError;
use crate::flows::{AuthFlows, EmailChangeFlow};
use crate::services::api::TropiqkApi;
use crate::services::bootstrap::{BootstrapOutcome, SessionBootstrapper};
use crate::services::feedback::{Notifier, ToastLog};
use crate::services::interceptor::{AuthInterceptor, RefreshMonitor};
use crate::services::navigation::{History, KeyValueStorage, MemoryStorage, Navigator};
use crate::services::profile::ArtistProfileStore;
use crate::services::route_guard::{GuardInput, GuardView, RouteGuard};
use crate::services::session::SessionStore;
use crate::services::transport::{ReqwestTransport, Transport};

pub struct TropiqkClient {
    pub api: TropiqkApi,
    pub session: SessionStore,
    pub profile: ArtistProfileStore,
    pub auth: AuthFlows,
    pub email_change: EmailChangeFlow,
    bootstrapper: SessionBootstrapper,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl TropiqkClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionStore::with_persistence(storage.clone());
        let profile = ArtistProfileStore::new();
        let interceptor = Arc::new(AuthInterceptor::new(
            transport,
            session.clone(),
            navigator.clone(),
            storage,
        ));
        let api = TropiqkApi::new(interceptor);

        Self {
            auth: AuthFlows::new(api.clone(), profile.clone(), notifier.clone()),
            email_change: EmailChangeFlow::new(api.clone(), notifier.clone()),
            bootstrapper: SessionBootstrapper::new(session.clone(), profile.clone()),
            api,
            session,
            profile,
            navigator,
            notifier,
        }
    }

    /// Headless client: reqwest transport with a cookie jar, in-memory
    /// history starting at `start`, in-memory storage, toasts kept in a log.
    pub fn from_settings(settings: &ApiSettings, start: &str) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(settings)?;
        tracing::info!(api = %transport.base_url(), "Tropiqk client ready");

        Ok(Self::new(
            Arc::new(transport),
            Arc::new(History::new(start)),
            Arc::new(MemoryStorage::new()),
            Arc::new(ToastLog::new()),
        ))
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Session bootstrap for the current location; runs once per client.
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        let location = self.navigator.current_path();
        self.bootstrapper.bootstrap(&location, &self.api).await
    }

    /// Evaluates `guard` against the current location and stores.
    pub fn guard(&self, guard: &RouteGuard) -> GuardView {
        let location = self.navigator.current_path();
        let session = self.session.snapshot();
        let input = GuardInput {
            pathname: &location,
            session: &session,
            profile_initialized: self.profile.is_initialized(),
            refreshing: self.api.is_refreshing(),
        };
        guard.check(&input, self.navigator.as_ref())
    }
}
