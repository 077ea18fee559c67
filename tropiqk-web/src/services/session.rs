//! Session store: who is signed in, and whether we know yet.
//!
//! State lives behind a `watch` channel so guards and views can subscribe to
//! changes; it is only mutated through the actions on [`SessionStore`].

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::models::User;
use crate::services::navigation::KeyValueStorage;

/// Storage key of the persisted user record.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    /// A session fetch is in flight.
    pub loading: bool,
    /// The first session fetch finished, successfully or not.
    pub initialized: bool,
    pub error: Option<String>,
}

impl Session {
    /// Initialized with no user: the visitor is known to be signed out.
    pub fn is_signed_out(&self) -> bool {
        self.initialized && self.user.is_none()
    }
}

/// Backend calls the session store depends on.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn current_user(&self) -> Result<User, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
    persistence: Option<Arc<dyn KeyValueStorage>>,
    /// Bumped by every local wipe; a new generation needs a new bootstrap.
    generation: Arc<AtomicU64>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            state: Arc::new(state),
            persistence: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Store that mirrors the user record into `storage` and restores it on
    /// construction. A restored user is not `initialized`: the backend still
    /// has to confirm it.
    pub fn with_persistence(storage: Arc<dyn KeyValueStorage>) -> Self {
        let restored = storage
            .get(SESSION_STORAGE_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable persisted session");
                    storage.remove(SESSION_STORAGE_KEY);
                    None
                }
            });

        let (state, _) = watch::channel(Session {
            user: restored,
            ..Session::default()
        });
        Self {
            state: Arc::new(state),
            persistence: Some(storage),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn login(&self, user: User) {
        tracing::info!(user_id = %user.id, role = %user.role, "Session started");
        self.persist(Some(&user));
        self.state.send_modify(|s| {
            s.user = Some(user);
            s.loading = false;
            s.initialized = true;
            s.error = None;
        });
    }

    pub fn set_user(&self, user: Option<User>) {
        self.persist(user.as_ref());
        self.state.send_modify(|s| s.user = user);
    }

    /// Ends the session on the backend, then locally. The local state is
    /// cleared even when the backend call fails; the failure is returned so
    /// the caller can report it.
    pub async fn logout<A: SessionApi + ?Sized>(&self, api: &A) -> Result<(), ClientError> {
        let result = api.logout().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }

        self.persist(None);
        self.state.send_modify(|s| {
            s.user = None;
            s.loading = false;
            s.initialized = true;
            s.error = None;
        });
        result
    }

    /// Fetches the current user once. A call made while a fetch is already
    /// in flight returns immediately. Never leaves the store uninitialized.
    pub async fn initialize_auth<A: SessionApi + ?Sized>(&self, api: &A) {
        let started = self.state.send_if_modified(|s| {
            if s.loading {
                false
            } else {
                s.loading = true;
                true
            }
        });
        if !started {
            tracing::debug!("Session fetch already in flight");
            return;
        }

        match api.current_user().await {
            Ok(user) => {
                self.persist(Some(&user));
                self.state.send_modify(|s| {
                    s.user = Some(user);
                    s.loading = false;
                    s.initialized = true;
                    s.error = None;
                });
            }
            Err(e) => {
                tracing::info!(error = %e, "No active session");
                self.persist(None);
                self.state.send_modify(|s| {
                    s.user = None;
                    s.loading = false;
                    s.initialized = true;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    /// Marks the session as decided without asking the backend; used on
    /// public pages.
    pub fn mark_initialized(&self) {
        self.state.send_if_modified(|s| {
            if s.initialized {
                false
            } else {
                s.initialized = true;
                true
            }
        });
    }

    /// Local wipe, no backend call. Starts a new generation, so the next
    /// bootstrap asks the backend again.
    pub fn clear_auth(&self) {
        self.persist(None);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(Session::default());
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    fn persist(&self, user: Option<&User>) {
        let Some(storage) = &self.persistence else {
            return;
        };
        match user {
            Some(user) => match serde_json::to_string(user) {
                Ok(raw) => storage.set(SESSION_STORAGE_KEY, &raw),
                Err(e) => tracing::warn!(error = %e, "Failed to persist session"),
            },
            None => storage.remove(SESSION_STORAGE_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::navigation::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn artist(onboarded: bool) -> User {
        User {
            id: "u1".into(),
            username: "nel".into(),
            email: "nel@tropiqk.io".into(),
            role: Role::Artist,
            has_onboarded: onboarded,
            profile_pic: None,
        }
    }

    struct FakeApi {
        user: Option<User>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl FakeApi {
        fn new(user: Option<User>) -> Self {
            Self {
                user,
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(0),
            }
        }
    }

    #[async_trait]
    impl SessionApi for FakeApi {
        async fn current_user(&self) -> Result<User, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.user.clone().ok_or(ClientError::Api {
                status: 401,
                code: None,
                message: "Not authenticated".into(),
            })
        }

        async fn logout(&self) -> Result<(), ClientError> {
            Err(ClientError::Transport("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn initialize_auth_populates_user() {
        let store = SessionStore::new();
        store.initialize_auth(&FakeApi::new(Some(artist(true)))).await;

        let session = store.snapshot();
        assert!(session.initialized);
        assert!(!session.loading);
        assert_eq!(session.user.unwrap().username, "nel");
    }

    #[tokio::test]
    async fn initialize_auth_failure_still_initializes() {
        let store = SessionStore::new();
        store.initialize_auth(&FakeApi::new(None)).await;

        let session = store.snapshot();
        assert!(session.is_signed_out());
        assert_eq!(session.error.as_deref(), Some("Not authenticated"));

        store.clear_error();
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn concurrent_initialize_is_a_single_fetch() {
        let store = SessionStore::new();
        let api = FakeApi {
            delay: Duration::from_millis(20),
            ..FakeApi::new(Some(artist(false)))
        };

        tokio::join!(store.initialize_auth(&api), store.initialize_auth(&api));

        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        assert!(store.snapshot().initialized);
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let store = SessionStore::new();
        store.login(artist(true));

        let result = store.logout(&FakeApi::new(None)).await;

        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert!(store.snapshot().is_signed_out());
    }

    #[test]
    fn clear_auth_resets_initialized() {
        let store = SessionStore::new();
        store.login(artist(true));
        let before = store.generation();
        store.clear_auth();
        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(store.generation(), before + 1);
    }

    #[test]
    fn persisted_user_is_restored_but_not_trusted() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        SessionStore::with_persistence(storage.clone()).login(artist(true));

        let restored = SessionStore::with_persistence(storage.clone()).snapshot();
        assert_eq!(restored.user.unwrap().id, "u1");
        assert!(!restored.initialized);

        SessionStore::with_persistence(storage.clone()).clear_auth();
        assert!(storage.get(SESSION_STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn subscribers_see_login() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        store.login(artist(false));
        rx.changed().await.unwrap();
        assert!(rx.borrow().user.is_some());
    }
}
