//! Authentication for the catalog admin API

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, TokenType};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
