use validator::Validate;

use super::{track_path, TropiqkApi};
use crate::error::ClientError;
use crate::models::artist::{CompletionEnvelope, PermissionsEnvelope, ProfileEnvelope};
use crate::models::auth::UserMessageResponse;
use crate::models::track::{TrackEnvelope, TracksEnvelope};
use crate::models::{
    ArtistPermissions, ArtistProfile, OnboardArtistRequest, ProfileCompletion, Track, TrackUpdate,
    TrackUpload, UpdateArtistProfile,
};
use crate::services::transport::{ApiRequest, FilePart, FormField};

const TRACKS: &str = "/api/artist/tracks/";

impl TropiqkApi {
    /// Completes artist onboarding; the response carries the updated user.
    pub async fn onboard(
        &self,
        request: &OnboardArtistRequest,
    ) -> Result<UserMessageResponse, ClientError> {
        request.validate()?;
        self.call(ApiRequest::post("/api/artist/onboard").json(request)?)
            .await
    }

    pub async fn profile(&self) -> Result<ArtistProfile, ClientError> {
        let envelope: ProfileEnvelope = self.call(ApiRequest::get("/api/artist/profile")).await?;
        Ok(envelope.profile)
    }

    pub async fn update_profile(
        &self,
        update: &UpdateArtistProfile,
    ) -> Result<ArtistProfile, ClientError> {
        update.validate()?;
        let envelope: ProfileEnvelope = self
            .call(ApiRequest::patch("/api/artist/profile").json(update)?)
            .await?;
        Ok(envelope.profile)
    }

    pub async fn profile_completion(&self) -> Result<ProfileCompletion, ClientError> {
        let envelope: CompletionEnvelope = self
            .call(ApiRequest::get("/api/artist/profile/completion"))
            .await?;
        Ok(envelope.completion)
    }

    pub async fn update_profile_pic(&self, image: FilePart) -> Result<ArtistProfile, ClientError> {
        if !image.content_type.starts_with("image/") {
            return Err(ClientError::InvalidRequest(format!(
                "profile picture must be an image, got '{}'",
                image.content_type
            )));
        }
        let request = ApiRequest::patch("/api/artist/profile/update-profilePic")
            .multipart(vec![FormField::file("profilePic", image)]);
        let envelope: ProfileEnvelope = self.call(request).await?;
        Ok(envelope.profile)
    }

    pub async fn upload_track(&self, upload: TrackUpload) -> Result<Track, ClientError> {
        upload.validate()?;
        let request = ApiRequest::post("/api/artist/tracks/upload").multipart(upload.into_fields());
        let envelope: TrackEnvelope = self.call(request).await?;
        Ok(envelope.track)
    }

    pub async fn tracks(&self) -> Result<Vec<Track>, ClientError> {
        let envelope: TracksEnvelope = self.call(ApiRequest::get("/api/artist/tracks")).await?;
        Ok(envelope.tracks)
    }

    pub async fn track(&self, id: &str) -> Result<Track, ClientError> {
        let envelope: TrackEnvelope = self
            .call(ApiRequest::get(track_path(TRACKS, id, "")?))
            .await?;
        Ok(envelope.track)
    }

    /// Multipart when a new thumbnail is attached, JSON otherwise.
    pub async fn update_track(&self, id: &str, update: TrackUpdate) -> Result<Track, ClientError> {
        update.validate()?;
        let request = ApiRequest::patch(track_path(TRACKS, id, "")?);
        let request = if update.thumbnail.is_some() {
            request.multipart(update.into_fields())
        } else {
            request.json(&update)?
        };
        let envelope: TrackEnvelope = self.call(request).await?;
        Ok(envelope.track)
    }

    pub async fn delete_track(&self, id: &str) -> Result<(), ClientError> {
        self.call_unit(ApiRequest::delete(track_path(TRACKS, id, "")?))
            .await
    }

    pub async fn permissions(&self) -> Result<ArtistPermissions, ClientError> {
        let envelope: PermissionsEnvelope = self
            .call(ApiRequest::get("/api/artist/permissions"))
            .await?;
        Ok(envelope.permissions)
    }
}
