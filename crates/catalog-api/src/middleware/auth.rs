//! JWT Authentication Middleware
//!
//! Guards the admin surface and the product write endpoints. The access
//! token is read from the `access_token` cookie or an
//! `Authorization: Bearer <token>` header, validated, and the caller is
//! made available to handlers as an [`AuthUser`] extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use catalog_auth::{JwtError, JwtValidator, TokenType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::{forbidden, unauthorized, ApiError, ErrorResponse};

/// Cookie consulted before the Authorization header
pub const ACCESS_COOKIE: &str = "access_token";

/// Authenticated admin extracted from the access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    /// Create new JWT state with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
        }
    }
}

/// Pull the raw token out of the cookie or the Authorization header
pub fn extract_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix("access_token="))
                .filter(|t| !t.is_empty())
        });
    if let Some(token) = from_cookie {
        return Ok(token.to_string());
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            unauthorized(
                "MISSING_AUTH",
                "Учетные данные не были предоставлены.",
            )
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .ok_or_else(|| {
            unauthorized(
                "INVALID_AUTH_FORMAT",
                "Invalid Authorization header format. Expected 'Bearer <token>'",
            )
        })
}

/// Require a valid access token belonging to a staff or superuser account.
///
/// # Errors
/// - 401 when the token is missing, malformed, expired or not an access token
/// - 403 when the account has no admin rights
pub async fn require_admin(
    State(state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_token(request.headers())?;

    let claims = state
        .validator
        .validate_type(&token, TokenType::Access)
        .map_err(|e| match e {
            JwtError::WrongTokenType { .. } => unauthorized(
                "INVALID_TOKEN_TYPE",
                "Invalid token type. Expected an access token",
            ),
            other => unauthorized("INVALID_TOKEN", format!("Invalid or expired token: {}", other)),
        })?;

    if !claims.is_admin() {
        debug!("Rejected non-staff token for {}", claims.username);
        return Err(forbidden(
            "FORBIDDEN",
            "Доступ запрещен. Требуются права администратора.",
        ));
    }

    let user_id = claims
        .user_id()
        .map_err(|_| unauthorized("INVALID_TOKEN", "Token subject is not a user id"))?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
        is_staff: claims.is_staff,
        is_superuser: claims.is_superuser,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use catalog_auth::JwtClaims;
    use chrono::Duration;
    use tower::ServiceExt; // For oneshot()

    const SECRET: &[u8] = b"test-secret-key";

    async fn protected_handler(axum::Extension(user): axum::Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }

    fn create_test_app() -> Router {
        let jwt_state = Arc::new(JwtState::new(SECRET));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_admin,
            ))
            .with_state(jwt_state)
    }

    fn token(token_type: TokenType, staff: bool, validity: Duration) -> String {
        let claims = JwtClaims::new(7, "editor".to_string(), token_type, validity).with_staff(staff);
        JwtValidator::encode(SECRET, &claims).unwrap()
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_staff_access_token_passes() {
        let token = token(TokenType::Access, true, Duration::minutes(5));
        let (status, body) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["username"], "editor");
        assert_eq!(body["is_staff"], true);
    }

    #[tokio::test]
    async fn test_cookie_token_passes() {
        let token = token(TokenType::Access, true, Duration::minutes(5));
        let (status, _) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .header("Cookie", format!("theme=dark; access_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (status, body) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_AUTH");
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        let (status, body) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .header("Authorization", "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_AUTH_FORMAT");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let token = token(TokenType::Access, true, Duration::seconds(-10));
        let (status, body) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let token = token(TokenType::Refresh, true, Duration::days(1));
        let (status, body) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN_TYPE");
    }

    #[tokio::test]
    async fn test_non_staff_is_forbidden() {
        let token = token(TokenType::Access, false, Duration::minutes(5));
        let (status, body) = call(
            create_test_app(),
            Request::builder()
                .uri("/protected")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }
}
