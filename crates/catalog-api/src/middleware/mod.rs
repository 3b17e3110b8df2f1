//! API Middleware
//!
//! Middleware layers for authentication and authorization.

pub mod auth;

pub use auth::{require_admin, AuthUser, JwtState, ACCESS_COOKIE};
