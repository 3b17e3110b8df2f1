//! JWT (JSON Web Token) handling for admin sessions
//!
//! Login issues a short-lived access token and a longer-lived refresh
//! token. Both are HS256-signed and carry the account's privilege flags so
//! the API can reject non-staff callers without a database round trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuer written into every token
pub const DEFAULT_ISSUER: &str = "catalog-api";

/// Which half of the token pair a token is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims for admin authentication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject (admin user id)
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    pub token_type: TokenType,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    /// Unique token id, used to revoke refresh tokens
    pub jti: String,
}

impl JwtClaims {
    pub fn new(user_id: i32, username: String, token_type: TokenType, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id.to_string(),
            username,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: DEFAULT_ISSUER.to_string(),
            token_type,
            is_staff: false,
            is_superuser: false,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.iss = issuer;
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Staff or superuser
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    /// The subject parsed back into a user id
    pub fn user_id(&self) -> Result<i32, JwtError> {
        self.sub.parse().map_err(|_| JwtError::InvalidToken)
    }

    pub fn expires_at(&self) -> chrono::DateTime<Utc> {
        chrono::DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Expected a {expected:?} token")]
    WrongTokenType { expected: TokenType },
}

/// JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JWT validator using HMAC-SHA256 (symmetric secret)
    ///
    /// Validates the signature, expiration and issuer.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[DEFAULT_ISSUER]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, JwtError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Validate and require a specific token type
    pub fn validate_type(&self, token: &str, expected: TokenType) -> Result<JwtClaims, JwtError> {
        let claims = self.validate(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    /// Encode JWT using HMAC-SHA256 (symmetric secret)
    pub fn encode(secret: &[u8], claims: &JwtClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    #[test]
    fn test_jwt_encode_decode() {
        let claims = JwtClaims::new(7, "admin".to_string(), TokenType::Access, Duration::minutes(30))
            .with_staff(true);

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let decoded = JwtValidator::new(TEST_SECRET).validate(&token).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id().unwrap(), 7);
        assert!(decoded.is_admin());
    }

    #[test]
    fn test_expired_token() {
        let claims = JwtClaims::new(1, "admin".to_string(), TokenType::Access, Duration::seconds(-10));
        assert!(claims.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let result = JwtValidator::new(TEST_SECRET).validate(&token);

        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = JwtClaims::new(1, "admin".to_string(), TokenType::Access, Duration::hours(1));
        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let result = JwtValidator::new(b"another_secret").validate(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_token_type_enforced() {
        let claims = JwtClaims::new(1, "admin".to_string(), TokenType::Refresh, Duration::days(7));
        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let validator = JwtValidator::new(TEST_SECRET);

        assert!(validator.validate_type(&token, TokenType::Refresh).is_ok());
        assert!(matches!(
            validator.validate_type(&token, TokenType::Access),
            Err(JwtError::WrongTokenType {
                expected: TokenType::Access
            })
        ));
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let a = JwtClaims::new(1, "a".to_string(), TokenType::Access, Duration::hours(1));
        let b = JwtClaims::new(1, "a".to_string(), TokenType::Access, Duration::hours(1));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let claims = JwtClaims::new(1, "admin".to_string(), TokenType::Access, Duration::hours(1))
            .with_issuer("someone-else".to_string());
        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        assert!(JwtValidator::new(TEST_SECRET).validate(&token).is_err());
    }
}
