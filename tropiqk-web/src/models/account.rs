use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateUsernameRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        custom(function = "crate::models::auth::validate_username")
    )]
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub new_email: String,
    #[validate(length(min = 1, message = "Confirm with your current password"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct VerifyEmailChangeRequest {
    #[validate(length(min = 4, max = 12, message = "Enter the code from your email"))]
    pub code: String,
}

/// Outstanding email change, if any.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEmailChange {
    #[serde(default)]
    pub pending_email: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PendingEmailChange {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.pending_email, self.expires_at) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(expires_at)) => expires_at > now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn email_change_serializes_camel_case() {
        let req = EmailChangeRequest {
            new_email: "new@tropiqk.io".into(),
            password: "pw".into(),
        };
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["newEmail"], "new@tropiqk.io");
    }

    #[test]
    fn expired_pending_change_is_inactive() {
        let now = Utc::now();
        let pending = PendingEmailChange {
            pending_email: Some("new@tropiqk.io".into()),
            expires_at: Some(now - Duration::minutes(1)),
        };
        assert!(!pending.is_active_at(now));
        assert!(PendingEmailChange {
            expires_at: Some(now + Duration::minutes(10)),
            ..pending
        }
        .is_active_at(now));
    }
}
