// auth/mod.rs - session issuance: JWT claims, role assignments and accounts
//
// Stands in for the external sign-in provider. The rest of the crate only
// sees the resulting `Session`.

pub mod accounts;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::rbac::{Role, Session};

pub use accounts::{Account, AccountDirectory, RoleAssignments};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` puts the expiry outside the representable date range.
    pub fn new(session: &Session, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| JwtError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours)))?
            .timestamp();

        Ok(Self {
            sub: session.user_id.clone(),
            email: session.email.clone(),
            name: session.name.clone(),
            role: session.role,
            avatar_url: session.avatar_url.clone(),
            exp,
            iat: now.timestamp(),
        })
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            avatar_url: claims.avatar_url,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    expiry_hours: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours)
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.expiry_hours.saturating_mul(3600)
    }

    pub fn issue(&self, session: &Session) -> Result<String, JwtError> {
        generate_jwt(&Claims::new(session, self.expiry_hours)?, &self.secret)
    }

    pub fn verify(&self, token: &str) -> Result<Session, JwtError> {
        validate_jwt(token, &self.secret).map(Session::from)
    }
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "7c1f".into(),
            email: "ada@academy.test".into(),
            name: "Ada".into(),
            role: Role::Operator,
            avatar_url: None,
        }
    }

    #[test]
    fn issued_token_verifies_back_to_session() {
        let issuer = TokenIssuer::new("s3cret", 1);
        let token = issuer.issue(&session()).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), session());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenIssuer::new("one", 1).issue(&session()).unwrap();
        assert!(matches!(
            TokenIssuer::new("two", 1).verify(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        assert!(matches!(
            TokenIssuer::new("", 1).issue(&session()),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn out_of_range_lifetime_is_a_generation_error() {
        let issuer = TokenIssuer::new("s3cret", 10_000_000_000_000);
        assert!(matches!(issuer.issue(&session()), Err(JwtError::TokenGeneration(_))));
        assert!(matches!(
            TokenIssuer::new("s3cret", u64::MAX).issue(&session()),
            Err(JwtError::TokenGeneration(_))
        ));
        assert_eq!(TokenIssuer::new("s3cret", u64::MAX).expires_in_secs(), u64::MAX);
    }
}
