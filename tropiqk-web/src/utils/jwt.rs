use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use crate::models::Role;

/// Claims the edge guard reads from the `accessToken` cookie.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EdgeClaims {
    /// Unknown role strings decode as `None`.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl EdgeClaims {
    /// A token without `exp` never expires here; the API is the authority.
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

fn lenient_role<'de, D>(deserializer: D) -> std::result::Result<Option<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()))
}

/// Decode JWT claims without validation.
///
/// The signature is never checked: the result is only a routing hint, and
/// every API call is authorized by the backend.
pub fn decode_jwt_claims(token: &str) -> Result<EdgeClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: EdgeClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &serde_json::Value) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_jwt_claims() {
        let token = encode_test_token(&json!({"id": "u1", "role": "Fan", "exp": 9999999999i64}));

        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.role, Some(Role::Fan));
        assert!(!claims.is_expired(1_736_500_000));
    }

    #[test]
    fn expired_and_missing_exp() {
        let claims = EdgeClaims {
            role: Some(Role::Artist),
            exp: Some(100),
        };
        assert!(claims.is_expired(100));
        assert!(!EdgeClaims {
            role: None,
            exp: None
        }
        .is_expired(i64::MAX));
    }

    #[test]
    fn unknown_role_is_none() {
        let token = encode_test_token(&json!({"role": "Superuser"}));
        assert_eq!(decode_jwt_claims(&token).unwrap().role, None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_jwt_claims("not-a-token").is_err());
        assert!(decode_jwt_claims("a.%%%.c").is_err());
    }
}
