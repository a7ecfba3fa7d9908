//! HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::user::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Validates a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 validator with a shared secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Claims carry their own RFC 3339 window; see `validate_claims`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Issues tokens for logged-in users.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    /// Fails with `Encoding` when `now + ttl` is past chrono's representable range.
    pub fn claims_for(&self, user: &User, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encoding(format!("token lifetime {} overflows", self.ttl)))?;
        Ok(JwtClaims {
            sub: user.id_typed(),
            email: user.email().to_string(),
            role: user.role().clone(),
            issued_at: now,
            expires_at,
        })
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.encode(&self.claims_for(user, now)?)
    }

    pub fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PasswordHashString, Role};
    use billbook_core::UserId;

    fn user() -> User {
        User::from_parts(
            UserId::new(),
            "Admin".to_string(),
            "admin@admin.com".to_string(),
            PasswordHashString::new("unused"),
            Role::admin(),
        )
    }

    #[test]
    fn issued_token_round_trips_through_validator() {
        let issuer = TokenIssuer::new("secret", Duration::minutes(60));
        let validator = Hs256JwtValidator::new("secret");
        let u = user();
        let now = Utc::now();

        let token = issuer.issue(&u, now).unwrap();
        let claims = validator.validate(&token, now + Duration::minutes(1)).unwrap();

        assert_eq!(claims.sub, u.id_typed());
        assert_eq!(claims.email, "admin@admin.com");
        assert_eq!(claims.role, Role::admin());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenIssuer::new("secret", Duration::minutes(60))
            .issue(&user(), Utc::now())
            .unwrap();
        let err = Hs256JwtValidator::new("other").validate(&token, Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = TokenIssuer::new("secret", Duration::minutes(5))
            .issue(&user(), now)
            .unwrap();
        let err = Hs256JwtValidator::new("secret")
            .validate(&token, now + Duration::minutes(6))
            .unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn lifetime_past_the_calendar_is_an_error() {
        let issuer = TokenIssuer::new("secret", Duration::MAX);
        let err = issuer.issue(&user(), Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Encoding(msg) if msg.contains("overflows")));
    }

    #[test]
    fn claims_expire_one_ttl_after_issue() {
        let now = Utc::now();
        let claims = TokenIssuer::new("secret", Duration::minutes(30))
            .claims_for(&user(), now)
            .unwrap();
        assert_eq!(claims.issued_at, now);
        assert_eq!(claims.expires_at, now + Duration::minutes(30));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Hs256JwtValidator::new("s").validate("not.a.jwt", Utc::now()).is_err());
    }
}
