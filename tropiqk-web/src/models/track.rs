use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::transport::{FilePart, FormField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub status: TrackStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// New track submission, sent as multipart.
#[derive(Debug, Clone, Validate)]
pub struct TrackUpload {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,
    pub genre: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub audio: FilePart,
    pub thumbnail: Option<FilePart>,
}

impl TrackUpload {
    pub fn into_fields(self) -> Vec<FormField> {
        let mut fields = vec![FormField::text("title", self.title)];
        if let Some(genre) = self.genre {
            fields.push(FormField::text("genre", genre));
        }
        if let Some(description) = self.description {
            fields.push(FormField::text("description", description));
        }
        fields.push(FormField::file("audio", self.audio));
        if let Some(thumbnail) = self.thumbnail {
            fields.push(FormField::file("thumbnail", thumbnail));
        }
        fields
    }
}

/// Edit of an existing track. A new thumbnail forces a multipart request.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct TrackUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[serde(skip)]
    pub thumbnail: Option<FilePart>,
}

impl TrackUpdate {
    pub fn into_fields(self) -> Vec<FormField> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(FormField::text("title", title));
        }
        if let Some(genre) = self.genre {
            fields.push(FormField::text("genre", genre));
        }
        if let Some(description) = self.description {
            fields.push(FormField::text("description", description));
        }
        if let Some(thumbnail) = self.thumbnail {
            fields.push(FormField::file("thumbnail", thumbnail));
        }
        fields
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RejectTrackRequest {
    #[validate(length(min = 3, max = 500, message = "Give the artist a reason (3-500 characters)"))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackEnvelope {
    pub track: Track,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksEnvelope {
    #[serde(default)]
    pub tracks: Vec<Track>,
}
