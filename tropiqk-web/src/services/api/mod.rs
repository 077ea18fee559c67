//! Typed wrappers over the Tropiqk REST API. Every call goes through the
//! [`AuthInterceptor`], so each one gets the silent-refresh treatment.

mod admin;
mod artist;
mod auth;
mod user;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::ClientError;
use crate::models::{ArtistProfile, User};
use crate::services::interceptor::{AuthInterceptor, RefreshMonitor};
use crate::services::profile::ArtistProfileApi;
use crate::services::session::SessionApi;
use crate::services::transport::ApiRequest;

#[derive(Clone)]
pub struct TropiqkApi {
    interceptor: Arc<AuthInterceptor>,
}

impl TropiqkApi {
    pub fn new(interceptor: Arc<AuthInterceptor>) -> Self {
        Self { interceptor }
    }

    pub fn interceptor(&self) -> &Arc<AuthInterceptor> {
        &self.interceptor
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        self.interceptor.send(request).await?.json()
    }

    async fn call_unit(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.interceptor.send(request).await.map(|_| ())
    }
}

/// Ids are interpolated into paths, so they must be a single segment.
fn track_path(prefix: &str, id: &str, suffix: &str) -> Result<String, ClientError> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ClientError::InvalidRequest(format!(
            "invalid track id '{}'",
            id
        )));
    }
    Ok(format!("{}{}{}", prefix, id, suffix))
}

#[async_trait]
impl SessionApi for TropiqkApi {
    async fn current_user(&self) -> Result<User, ClientError> {
        self.get_user().await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        TropiqkApi::logout(self).await
    }
}

#[async_trait]
impl ArtistProfileApi for TropiqkApi {
    async fn artist_profile(&self) -> Result<ArtistProfile, ClientError> {
        self.profile().await
    }
}

#[async_trait]
impl RefreshMonitor for TropiqkApi {
    fn is_refreshing(&self) -> bool {
        self.interceptor.is_refreshing()
    }

    async fn refresh_settled(&self) {
        self.interceptor.refresh_settled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RejectTrackRequest, Role, TrackUpdate, TrackUpload, UpdateUsernameRequest};
    use crate::services::interceptor::REFRESH_PATH;
    use crate::services::navigation::{History, MemoryStorage};
    use crate::services::session::SessionStore;
    use crate::services::transport::{
        ApiResponse, FilePart, FormField, HttpMethod, RequestBody,
    };
    use crate::test_support::{json_response, user, MockTransport};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn track_response() -> ApiResponse {
        json_response(
            StatusCode::OK,
            json!({
                "track": {
                    "_id": "t1",
                    "title": "Carnival Sunrise",
                    "audioUrl": "https://cdn.tropiqk.io/t1.mp3",
                    "status": "pending"
                }
            }),
        )
    }

    fn api(transport: Arc<MockTransport>) -> TropiqkApi {
        let session = SessionStore::new();
        session.login(user(Role::Artist, true));
        TropiqkApi::new(Arc::new(AuthInterceptor::new(
            transport,
            session,
            Arc::new(History::new("/artist/tracks")),
            Arc::new(MemoryStorage::new()),
        )))
    }

    fn thumbnail() -> FilePart {
        FilePart::new("cover.png", "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn track_update_without_thumbnail_is_json() {
        let transport = MockTransport::new(|_| Ok(track_response())).into_arc();

        api(transport.clone())
            .update_track(
                "t1",
                TrackUpdate {
                    title: Some("Carnival Sunrise".into()),
                    ..TrackUpdate::default()
                },
            )
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.method, HttpMethod::Patch);
        assert_eq!(call.path, "/api/artist/tracks/t1");
        assert_eq!(call.body, RequestBody::Json(json!({ "title": "Carnival Sunrise" })));
    }

    #[tokio::test]
    async fn track_update_with_thumbnail_is_multipart() {
        let transport = MockTransport::new(|_| Ok(track_response())).into_arc();

        api(transport.clone())
            .update_track(
                "t1",
                TrackUpdate {
                    genre: Some("soca".into()),
                    thumbnail: Some(thumbnail()),
                    ..TrackUpdate::default()
                },
            )
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.path, "/api/artist/tracks/t1");
        assert_eq!(
            call.body,
            RequestBody::Multipart(vec![
                FormField::text("genre", "soca"),
                FormField::file("thumbnail", thumbnail()),
            ])
        );
    }

    #[tokio::test]
    async fn upload_replayed_after_refresh_keeps_its_files() {
        let uploads = Arc::new(AtomicUsize::new(0));
        let seen = uploads.clone();
        let transport = MockTransport::new(move |request| {
            if request.path == REFRESH_PATH {
                return Ok(json_response(StatusCode::OK, json!({ "message": "Token refreshed" })));
            }
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(json_response(
                    StatusCode::UNAUTHORIZED,
                    json!({ "message": "Access token expired", "code": "TOKEN_EXPIRED" }),
                ));
            }
            Ok(track_response())
        })
        .into_arc();
        let audio = FilePart::new("sunrise.mp3", "audio/mpeg", vec![0u8; 16]);

        let track = api(transport.clone())
            .upload_track(TrackUpload {
                title: "Carnival Sunrise".into(),
                genre: Some("soca".into()),
                description: None,
                audio: audio.clone(),
                thumbnail: Some(thumbnail()),
            })
            .await
            .unwrap();

        assert_eq!(track.id, "t1");
        let calls = transport.calls();
        let paths: Vec<_> = calls.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            paths,
            ["/api/artist/tracks/upload", REFRESH_PATH, "/api/artist/tracks/upload"]
        );
        assert!(calls[2].retried);
        assert_eq!(calls[2].body, calls[0].body);
        let RequestBody::Multipart(fields) = &calls[2].body else {
            panic!("upload must stay multipart on replay");
        };
        assert!(fields.contains(&FormField::file("audio", audio)));
        assert!(fields.contains(&FormField::file("thumbnail", thumbnail())));
    }

    #[tokio::test]
    async fn moderation_targets_the_track() {
        let transport = MockTransport::new(|_| Ok(track_response())).into_arc();
        let api = api(transport.clone());

        api.approve_track("t1").await.unwrap();
        api.reject_track(
            "t2",
            &RejectTrackRequest {
                reason: "Audio clips at the chorus".into(),
            },
        )
        .await
        .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].method, HttpMethod::Post);
        assert_eq!(calls[0].path, "/api/admin/tracks/t1/approve");
        assert_eq!(calls[1].path, "/api/admin/tracks/t2/reject");
        assert_eq!(
            calls[1].body,
            RequestBody::Json(json!({ "reason": "Audio clips at the chorus" }))
        );
    }

    #[tokio::test]
    async fn username_update_is_a_put() {
        let transport = MockTransport::new(|_| {
            Ok(json_response(StatusCode::OK, json!({ "message": "Username updated" })))
        })
        .into_arc();

        let response = api(transport.clone())
            .update_username(&UpdateUsernameRequest {
                username: "nel.soca".into(),
            })
            .await
            .unwrap();

        assert_eq!(response.message.as_deref(), Some("Username updated"));
        let call = &transport.calls()[0];
        assert_eq!(call.method, HttpMethod::Put);
        assert_eq!(call.path, "/api/user/update-username");
        assert_eq!(call.body, RequestBody::Json(json!({ "username": "nel.soca" })));
    }

    #[tokio::test]
    async fn profile_pic_must_be_an_image() {
        let transport = MockTransport::new(|_| {
            Ok(json_response(
                StatusCode::OK,
                json!({ "profile": { "artistName": "Nel", "profilePic": "https://cdn.tropiqk.io/p.png" } }),
            ))
        })
        .into_arc();
        let api = api(transport.clone());

        let err = api
            .update_profile_pic(FilePart::new("notes.txt", "text/plain", vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert!(transport.calls().is_empty());

        let profile = api.update_profile_pic(thumbnail()).await.unwrap();
        assert_eq!(profile.profile_pic.as_deref(), Some("https://cdn.tropiqk.io/p.png"));
        let call = &transport.calls()[0];
        assert_eq!(call.path, "/api/artist/profile/update-profilePic");
        assert_eq!(
            call.body,
            RequestBody::Multipart(vec![FormField::file("profilePic", thumbnail())])
        );
    }

    #[test]
    fn track_ids_must_be_one_segment() {
        assert_eq!(
            track_path("/api/artist/tracks/", "t1", "").unwrap(),
            "/api/artist/tracks/t1"
        );
        assert_eq!(
            track_path("/api/admin/tracks/", "t1", "/approve").unwrap(),
            "/api/admin/tracks/t1/approve"
        );
        assert!(track_path("/api/artist/tracks/", "", "").is_err());
        assert!(track_path("/api/artist/tracks/", "../admin", "").is_err());
    }
}
