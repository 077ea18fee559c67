pub mod account;
pub mod artist;
pub mod auth;
pub mod track;
pub mod user;

pub use account::{
    EmailChangeRequest, PendingEmailChange, UpdateUsernameRequest, VerifyEmailChangeRequest,
};
pub use artist::{
    ArtistPermissions, ArtistProfile, OnboardArtistRequest, ProfileCompletion,
    UpdateArtistProfile,
};
pub use auth::{
    LoginForm, LoginResponse, MessageResponse, RegisterForm, UserMessageResponse,
    VerifyEmailRequest,
};
pub use track::{RejectTrackRequest, Track, TrackStatus, TrackUpdate, TrackUpload};
pub use user::{Role, User};
