//! JWT token handling

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::models::UserRole;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Lifetime of an issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(rename = "userID")]
    pub user_id: String,
    /// User role
    #[serde(rename = "userRole")]
    pub user_role: UserRole,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a subject issued at `issued_at`
    pub fn new(user_id: &str, user_role: UserRole, issued_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            user_role,
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

struct Keys {
    encoding: Option<EncodingKey>,
    decoding: Option<DecodingKey>,
    validation: Validation,
}

/// Issues and verifies HS256 identity tokens.
///
/// Holds only the immutable keys derived from the configured secret, so a
/// single instance is shared by every request.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        // An empty HMAC key would accept tokens anyone can forge.
        let (encoding, decoding) = if secret.is_empty() {
            tracing::warn!("No JWT secret configured; token issuance and verification are disabled");
            (None, None)
        } else {
            (
                Some(EncodingKey::from_secret(secret)),
                Some(DecodingKey::from_secret(secret)),
            )
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            keys: Arc::new(Keys {
                encoding,
                decoding,
                validation,
            }),
        }
    }

    /// Issue a token for `user_id` valid for 24 hours from now
    pub fn issue(&self, user_id: &str, role: UserRole) -> Result<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`
    pub fn issue_at(&self, user_id: &str, role: UserRole, issued_at: DateTime<Utc>) -> Result<String> {
        let key = self
            .keys
            .encoding
            .as_ref()
            .ok_or_else(|| Error::Signing("signing key unavailable".to_string()))?;

        let claims = Claims::new(user_id, role, issued_at);
        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| Error::Signing(e.to_string()))
    }

    /// Validate and decode a token.
    ///
    /// Every failure (bad signature, malformed, expired, unknown role) is
    /// reported as [`Error::InvalidToken`]; the cause is only logged.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let key = self.keys.decoding.as_ref().ok_or(Error::InvalidToken)?;

        let claims = decode::<Claims>(token, key, &self.keys.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                Error::InvalidToken
            })?;

        // exp must be strictly in the future
        if claims.is_expired() {
            tracing::debug!("Token rejected: expired at {}", claims.exp);
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&AuthConfig::new(secret))
    }

    #[test]
    fn test_issue_and_verify_token() {
        let tokens = service("test-secret");
        let token = tokens.issue("user-1", UserRole::Admin).expect("Failed to issue token");
        let claims = tokens.verify(&token).expect("Failed to verify token");

        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.user_role, UserRole::Admin);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry_is_twenty_four_hours() {
        let tokens = service("test-secret");
        let now = Utc::now();
        let token = tokens.issue_at("user-1", UserRole::User, now).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.exp, now.timestamp() + 24 * 3600);
    }

    #[test]
    fn test_invalid_token() {
        let result = service("test-secret").verify("invalid.token.here");
        assert!(matches!(result, Err(Error::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("test-secret");
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS + 1);
        let token = tokens.issue_at("user-1", UserRole::User, issued).unwrap();

        assert!(matches!(tokens.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_empty_secret_cannot_sign_or_verify() {
        let tokens = service("");
        assert!(matches!(
            tokens.issue("user-1", UserRole::User),
            Err(Error::Signing(_))
        ));

        let forged = service("x").issue("user-1", UserRole::Admin).unwrap();
        assert!(matches!(tokens.verify(&forged), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_wire_format_field_names() {
        let claims = Claims::new("user-1", UserRole::Admin, Utc::now());
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["userID"], "user-1");
        assert_eq!(json["userRole"], "admin");
        assert!(json["exp"].is_i64());
    }
}
