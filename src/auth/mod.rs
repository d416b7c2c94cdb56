use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` puts the expiry past what a timestamp can hold
    pub fn new(user_id: Uuid, email: String, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!("expiry of {} hours is out of range", expiry_hours))
            })?;

        Ok(Self {
            sub: user_id,
            email,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// HS256 signing material shared by the middleware and the token CLI
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    /// Issue a token for `user_id`
    pub fn generate(&self, user_id: Uuid, email: impl Into<String>) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email.into(), self.expiry_hours)?;
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_validate() {
        let keys = JwtKeys::new("test-secret", 1).unwrap();
        let user_id = Uuid::new_v4();
        let token = keys.generate(user_id, "seller@example.com").unwrap();

        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "seller@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_foreign_signature() {
        let ours = JwtKeys::new("ours", 1).unwrap();
        let theirs = JwtKeys::new("theirs", 1).unwrap();
        let token = theirs.generate(Uuid::new_v4(), "x@example.com").unwrap();
        assert!(matches!(ours.validate(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn oversized_expiry_is_an_error_not_a_panic() {
        let keys = JwtKeys::new("test-secret", u64::MAX).unwrap();
        let result = keys.generate(Uuid::new_v4(), "x@example.com");
        assert!(matches!(result, Err(JwtError::TokenGeneration(_))));

        let keys = JwtKeys::new("test-secret", i64::MAX as u64).unwrap();
        assert!(matches!(
            keys.generate(Uuid::new_v4(), "x@example.com"),
            Err(JwtError::TokenGeneration(_))
        ));
    }

    #[test]
    fn long_lived_tokens_still_validate() {
        let keys = JwtKeys::new("test-secret", 24 * 365 * 100).unwrap();
        let token = keys.generate(Uuid::new_v4(), "x@example.com").unwrap();
        let claims = keys.validate(&token).unwrap();
        assert!(claims.exp > claims.iat + 3600 * 24 * 365 * 99);
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(JwtKeys::new("", 1), Err(JwtError::InvalidSecret)));
    }
}
