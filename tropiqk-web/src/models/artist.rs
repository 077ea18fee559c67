use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfile {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub artist_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Platform name to profile URL, e.g. `instagram`.
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardArtistRequest {
    #[validate(length(min = 2, max = 50, message = "Artist name must be 2-50 characters"))]
    pub artist_name: String,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: String,
    #[validate(length(min = 1, max = 5, message = "Pick between one and five genres"))]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub social_links: BTreeMap<String, String>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtistProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50, message = "Artist name must be 2-50 characters"))]
    pub artist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Enter a full URL"))]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompletion {
    pub percentage: u8,
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

impl ProfileCompletion {
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100 && self.missing_fields.is_empty()
    }
}

/// What the current artist may do right now.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistPermissions {
    pub can_upload: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub remaining_uploads: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEnvelope {
    pub profile: ArtistProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionEnvelope {
    pub completion: ProfileCompletion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsEnvelope {
    pub permissions: ArtistPermissions,
}
