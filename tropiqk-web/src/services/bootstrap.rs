//! Decides, once per session generation, whether the session has to be
//! fetched. A hard redirect to login wipes the session and starts a new
//! generation, which re-arms the bootstrap the way a page reload would.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

use crate::models::Role;
use crate::services::interceptor::RefreshMonitor;
use crate::services::navigation::pathname;
use crate::services::profile::{ArtistProfileApi, ArtistProfileStore};
use crate::services::session::{SessionApi, SessionStore};
use crate::utils::paths::is_public_page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Public page: marked initialized without a network call.
    PublicPage,
    SignedIn(Role),
    SignedOut,
}

pub struct SessionBootstrapper {
    session: SessionStore,
    profile: ArtistProfileStore,
    started: Mutex<(u64, Arc<OnceCell<BootstrapOutcome>>)>,
}

impl SessionBootstrapper {
    pub fn new(session: SessionStore, profile: ArtistProfileStore) -> Self {
        Self {
            session,
            profile,
            started: Mutex::new((0, Arc::new(OnceCell::new()))),
        }
    }

    /// Outcome of the bootstrap for the current session generation.
    pub fn outcome(&self) -> Option<BootstrapOutcome> {
        self.cell().get().copied()
    }

    /// Once-cell of the current generation, replaced after a session wipe.
    fn cell(&self) -> Arc<OnceCell<BootstrapOutcome>> {
        let generation = self.session.generation();
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        if started.0 != generation {
            tracing::debug!(generation, "Session wiped, re-arming bootstrap");
            self.profile.clear();
            *started = (generation, Arc::new(OnceCell::new()));
        }
        started.1.clone()
    }

    /// Runs the bootstrap for the page at `location`. Within one session
    /// generation, later calls, including concurrent ones, wait for and
    /// return the first call's outcome. Every call then makes sure an
    /// onboarded artist's profile is loaded; that fetch happens at most once
    /// per user.
    pub async fn bootstrap<A>(&self, location: &str, api: &A) -> BootstrapOutcome
    where
        A: SessionApi + ArtistProfileApi + RefreshMonitor + ?Sized,
    {
        let cell = self.cell();
        let outcome = *cell
            .get_or_init(|| self.run(pathname(location), api))
            .await;

        self.ensure_artist_profile(api).await;
        outcome
    }

    async fn run<A>(&self, path: &str, api: &A) -> BootstrapOutcome
    where
        A: SessionApi + RefreshMonitor + ?Sized,
    {
        if is_public_page(path) {
            tracing::debug!(path = %path, "Public page, skipping session fetch");
            self.session.mark_initialized();
            return BootstrapOutcome::PublicPage;
        }

        if api.is_refreshing() {
            tracing::debug!("Waiting for token refresh before fetching session");
        }
        api.refresh_settled().await;
        self.session.initialize_auth(api).await;

        match self.session.user() {
            Some(user) => BootstrapOutcome::SignedIn(user.role),
            None => BootstrapOutcome::SignedOut,
        }
    }

    /// Loads the artist profile for an artist who finished onboarding.
    /// Users still onboarding have no profile yet, so nothing is fetched.
    pub async fn ensure_artist_profile<A: ArtistProfileApi + ?Sized>(&self, api: &A) {
        let session = self.session.snapshot();
        if !session.initialized {
            return;
        }
        let Some(user) = session.user else {
            return;
        };
        if user.is_onboarded_artist() {
            self.profile.fetch_for(&user.id, api).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::models::{ArtistProfile, User};
    use crate::test_support::user;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::watch;

    struct FakeBackend {
        user: Option<User>,
        session_calls: AtomicUsize,
        profile_calls: AtomicUsize,
        refreshing: watch::Sender<bool>,
        fetched_while_refreshing: AtomicBool,
    }

    impl FakeBackend {
        fn new(user: Option<User>) -> Self {
            Self {
                user,
                session_calls: AtomicUsize::new(0),
                profile_calls: AtomicUsize::new(0),
                refreshing: watch::channel(false).0,
                fetched_while_refreshing: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl SessionApi for FakeBackend {
        async fn current_user(&self) -> Result<User, ClientError> {
            self.session_calls.fetch_add(1, Ordering::SeqCst);
            if *self.refreshing.borrow() {
                self.fetched_while_refreshing.store(true, Ordering::SeqCst);
            }
            self.user
                .clone()
                .ok_or(ClientError::Transport("no session".into()))
        }

        async fn logout(&self) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ArtistProfileApi for FakeBackend {
        async fn artist_profile(&self) -> Result<ArtistProfile, ClientError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Transport("unused".into()))
        }
    }

    #[async_trait]
    impl RefreshMonitor for FakeBackend {
        fn is_refreshing(&self) -> bool {
            *self.refreshing.borrow()
        }

        async fn refresh_settled(&self) {
            let _ = self.refreshing.subscribe().wait_for(|r| !*r).await;
        }
    }

    fn bootstrapper() -> SessionBootstrapper {
        SessionBootstrapper::new(SessionStore::new(), ArtistProfileStore::new())
    }

    #[tokio::test]
    async fn public_pages_never_fetch() {
        for page in ["/", "/auth/login", "/auth/register?role=Artist", "/unauthorized"] {
            let boot = bootstrapper();
            let api = FakeBackend::new(Some(user(Role::Fan, true)));

            assert_eq!(boot.bootstrap(page, &api).await, BootstrapOutcome::PublicPage);
            assert_eq!(api.session_calls.load(Ordering::SeqCst), 0);
            assert!(boot.session.snapshot().initialized);
        }
    }

    #[tokio::test]
    async fn fetches_session_exactly_once() {
        let boot = bootstrapper();
        let api = FakeBackend::new(Some(user(Role::Fan, true)));

        let (a, b) = tokio::join!(
            boot.bootstrap("/fans/dashboard", &api),
            boot.bootstrap("/fans/dashboard", &api)
        );
        boot.bootstrap("/fans/dashboard", &api).await;

        assert_eq!(a, BootstrapOutcome::SignedIn(Role::Fan));
        assert_eq!(a, b);
        assert_eq!(api.session_calls.load(Ordering::SeqCst), 1);
        assert_eq!(boot.outcome(), Some(BootstrapOutcome::SignedIn(Role::Fan)));
    }

    #[tokio::test]
    async fn waits_for_in_flight_refresh() {
        let boot = bootstrapper();
        let api = FakeBackend::new(Some(user(Role::Fan, true)));
        api.refreshing.send_replace(true);

        let (outcome, _) = tokio::join!(boot.bootstrap("/fans/dashboard", &api), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(api.session_calls.load(Ordering::SeqCst), 0);
            api.refreshing.send_replace(false);
        });

        assert_eq!(outcome, BootstrapOutcome::SignedIn(Role::Fan));
        assert!(!api.fetched_while_refreshing.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_fetch_is_signed_out_but_initialized() {
        let boot = bootstrapper();
        let api = FakeBackend::new(None);

        assert_eq!(
            boot.bootstrap("/artist/dashboard", &api).await,
            BootstrapOutcome::SignedOut
        );
        assert!(boot.session.snapshot().is_signed_out());
        assert_eq!(api.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn profile_only_for_onboarded_artists() {
        let cases = [
            (user(Role::Artist, true), 1),
            (user(Role::Artist, false), 0),
            (user(Role::Fan, true), 0),
        ];
        for (who, expected) in cases {
            let boot = bootstrapper();
            let api = FakeBackend::new(Some(who));

            boot.bootstrap("/artist/dashboard", &api).await;
            boot.bootstrap("/artist/dashboard", &api).await;

            assert_eq!(api.profile_calls.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test]
    async fn session_wipe_rearms_bootstrap() {
        let boot = bootstrapper();
        let api = FakeBackend::new(None);

        assert_eq!(
            boot.bootstrap("/fans/dashboard", &api).await,
            BootstrapOutcome::SignedOut
        );
        boot.session.clear_auth();
        assert_eq!(boot.outcome(), None);

        assert_eq!(
            boot.bootstrap("/auth/login", &api).await,
            BootstrapOutcome::PublicPage
        );
        assert!(boot.session.snapshot().is_signed_out());
        assert_eq!(api.session_calls.load(Ordering::SeqCst), 1);
    }
}
