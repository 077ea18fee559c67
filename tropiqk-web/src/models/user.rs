use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Serialized exactly as the API and the access token spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Artist,
    Fan,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Artist => "Artist",
            Role::Fan => "Fan",
            Role::Admin => "Admin",
        }
    }

    /// Path prefix of the role's protected area.
    pub fn area_prefix(&self) -> &'static str {
        match self {
            Role::Artist => "/artist",
            Role::Fan => "/fans",
            Role::Admin => "/admin",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Artist => "/artist/dashboard",
            Role::Fan => "/fans/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }

    /// Admin accounts are provisioned complete and have no onboarding step.
    pub fn onboarding_path(&self) -> Option<&'static str> {
        match self {
            Role::Artist => Some("/artist/onboarding"),
            Role::Fan => Some("/fans/onboarding"),
            Role::Admin => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artist" => Ok(Role::Artist),
            "fan" => Ok(Role::Fan),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// The signed-in account as returned by `/api/user/get-user` and login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub has_onboarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl User {
    pub fn is_onboarded_artist(&self) -> bool {
        self.role == Role::Artist && self.has_onboarded
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .username
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .collect::<String>()
            .to_uppercase();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_payload_with_missing_optional_fields() {
        let user: User =
            serde_json::from_str(r#"{"username":"nel","role":"Artist"}"#).unwrap();
        assert_eq!(user.role, Role::Artist);
        assert!(!user.has_onboarded);
        assert!(user.profile_pic.is_none());
    }

    #[test]
    fn accepts_mongo_style_id() {
        let user: User = serde_json::from_str(
            r#"{"_id":"65f0","username":"ada","email":"ada@tropiqk.io","role":"Fan","hasOnboarded":true}"#,
        )
        .unwrap();
        assert_eq!(user.id, "65f0");
        assert!(user.has_onboarded);
    }

    #[test]
    fn role_from_token_claim_is_case_insensitive() {
        assert_eq!("fan".parse::<Role>().unwrap(), Role::Fan);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("curator".parse::<Role>().is_err());
    }

    #[test]
    fn initials_fall_back_when_username_has_no_letters() {
        let mut user: User =
            serde_json::from_str(r#"{"username":"nel","role":"Artist"}"#).unwrap();
        assert_eq!(user.initials(), "NE");
        user.username = "__".into();
        assert_eq!(user.initials(), "U");
    }
}
