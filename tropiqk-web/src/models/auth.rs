use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::user::{Role, User};

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterForm {
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(skip_serializing)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(custom(function = "validate_signup_role"))]
    pub role: Role,
}

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message = Some("Use letters, numbers, dots and underscores only".into());
        Err(err)
    }
}

fn validate_signup_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::Artist | Role::Fan => Ok(()),
        Role::Admin => {
            let mut err = ValidationError::new("signup_role");
            err.message = Some("Choose either Artist or Fan".into());
            Err(err)
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4, max = 12, message = "Enter the code from your email"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of endpoints that may or may not echo the updated account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMessageResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}
