use validator::Validate;

use super::{track_path, TropiqkApi};
use crate::error::ClientError;
use crate::models::track::{TrackEnvelope, TracksEnvelope};
use crate::models::{RejectTrackRequest, Track};
use crate::services::transport::ApiRequest;

const ADMIN_TRACKS: &str = "/api/admin/tracks/";

impl TropiqkApi {
    pub async fn pending_tracks(&self) -> Result<Vec<Track>, ClientError> {
        let envelope: TracksEnvelope = self
            .call(ApiRequest::get("/api/admin/tracks/pending"))
            .await?;
        Ok(envelope.tracks)
    }

    pub async fn all_tracks(&self) -> Result<Vec<Track>, ClientError> {
        let envelope: TracksEnvelope = self.call(ApiRequest::get(ADMIN_TRACKS)).await?;
        Ok(envelope.tracks)
    }

    pub async fn approve_track(&self, id: &str) -> Result<Track, ClientError> {
        let envelope: TrackEnvelope = self
            .call(ApiRequest::post(track_path(ADMIN_TRACKS, id, "/approve")?))
            .await?;
        Ok(envelope.track)
    }

    pub async fn reject_track(
        &self,
        id: &str,
        request: &RejectTrackRequest,
    ) -> Result<Track, ClientError> {
        request.validate()?;
        let envelope: TrackEnvelope = self
            .call(ApiRequest::post(track_path(ADMIN_TRACKS, id, "/reject")?).json(request)?)
            .await?;
        Ok(envelope.track)
    }
}
