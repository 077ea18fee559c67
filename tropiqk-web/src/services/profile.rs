//! Artist profile cache, filled once per signed-in artist.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::models::ArtistProfile;

#[async_trait]
pub trait ArtistProfileApi: Send + Sync {
    async fn artist_profile(&self) -> Result<ArtistProfile, ClientError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
    pub profile: Option<ArtistProfile>,
    pub loading: bool,
    pub initialized: bool,
    pub error: Option<String>,
    /// User the current (or in-flight) fetch belongs to.
    fetched_for: Option<String>,
}

#[derive(Clone)]
pub struct ArtistProfileStore {
    state: Arc<watch::Sender<ProfileState>>,
}

impl Default for ArtistProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtistProfileStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ProfileState::default());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Loads the profile of `user_id` unless it was already fetched (or is
    /// being fetched) for that user. Returns whether a fetch was made.
    pub async fn fetch_for<A: ArtistProfileApi + ?Sized>(&self, user_id: &str, api: &A) -> bool {
        let claimed = self.state.send_if_modified(|s| {
            if s.fetched_for.as_deref() == Some(user_id) {
                return false;
            }
            *s = ProfileState {
                loading: true,
                fetched_for: Some(user_id.to_string()),
                ..ProfileState::default()
            };
            true
        });
        if !claimed {
            return false;
        }

        self.fetch_artist_profile(api).await;
        true
    }

    /// Unconditional (re)load. Always ends `initialized`, even on failure, so
    /// route guards waiting on the profile can proceed.
    pub async fn fetch_artist_profile<A: ArtistProfileApi + ?Sized>(&self, api: &A) {
        self.state.send_modify(|s| s.loading = true);

        match api.artist_profile().await {
            Ok(profile) => self.state.send_modify(|s| {
                s.profile = Some(profile);
                s.loading = false;
                s.initialized = true;
                s.error = None;
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load artist profile");
                self.state.send_modify(|s| {
                    s.profile = None;
                    s.loading = false;
                    s.initialized = true;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    pub fn set_profile(&self, profile: ArtistProfile) {
        self.state.send_modify(|s| {
            s.profile = Some(profile);
            s.initialized = true;
            s.error = None;
        });
    }

    pub fn clear(&self) {
        self.state.send_replace(ProfileState::default());
    }
}
