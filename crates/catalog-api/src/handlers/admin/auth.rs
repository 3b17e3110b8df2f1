//! Admin sign-in and account endpoints
//!
//! Login hands out an access/refresh token pair. Refresh tokens can be
//! revoked by logout; revoked `jti`s are kept until the token would have
//! expired anyway.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use catalog_auth::{
    hash_password, validate_password_strength, verify_password, JwtClaims, JwtError,
    JwtValidator, TokenType,
};
use catalog_db::entities::{admin_user, revoked_token};
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use tracing::{debug, info, warn};

use crate::error::{
    api_error, bad_request, db_error, forbidden, password_error, unauthorized, ApiError,
    ApiResult, ErrorResponse, FieldErrors,
};
use crate::middleware::AuthUser;
use crate::models::{
    AdminUserResponse, ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    RefreshRequest, RefreshResponse, UpdateProfileRequest,
};
use crate::AppState;

use crate::handlers::body;

const BAD_CREDENTIALS: &str = "Неверный логин или пароль";

pub(crate) fn user_response(user: admin_user::Model) -> AdminUserResponse {
    AdminUserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
        date_joined: user.date_joined,
        last_login: user.last_login,
    }
}

fn issue(state: &AppState, user: &admin_user::Model, token_type: TokenType) -> ApiResult<String> {
    let validity = match token_type {
        TokenType::Access => state.access_ttl,
        TokenType::Refresh => state.refresh_ttl,
    };
    let claims = JwtClaims::new(user.id, user.username.clone(), token_type, validity)
        .with_staff(user.is_staff)
        .with_superuser(user.is_superuser);

    JwtValidator::encode(state.jwt_secret.as_bytes(), &claims).map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "TOKEN_ERROR",
            format!("Failed to issue token: {}", e),
        )
    })
}

async fn load_user(db: &DatabaseConnection, id: i32) -> ApiResult<admin_user::Model> {
    admin_user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| unauthorized("USER_NOT_FOUND", "Не авторизован"))
}

/// Validate a refresh token and make sure it was not revoked
async fn check_refresh(state: &AppState, token: &str) -> Result<JwtClaims, ApiError> {
    let claims = JwtValidator::new(state.jwt_secret.as_bytes())
        .validate_type(token, TokenType::Refresh)
        .map_err(|e| match e {
            JwtError::WrongTokenType { .. } => unauthorized(
                "INVALID_TOKEN_TYPE",
                "Invalid token type. Expected a refresh token",
            ),
            other => unauthorized("INVALID_TOKEN", format!("Invalid or expired token: {}", other)),
        })?;

    let revoked = revoked_token::Entity::find_by_id(claims.jti.clone())
        .one(&state.db)
        .await
        .map_err(db_error)?;
    if revoked.is_some() {
        return Err(unauthorized("TOKEN_REVOKED", "Token has been revoked"));
    }

    Ok(claims)
}

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Wrong username or password", body = ErrorResponse),
        (status = 403, description = "Account has no admin rights", body = ErrorResponse)
    ),
    tag = "admin-auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let req = body(payload)?;

    let mut errors = FieldErrors::new();
    errors.require("username", req.username.as_deref());
    errors.require("password", req.password.as_deref());
    errors.into_result()?;
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = admin_user::Entity::find()
        .filter(admin_user::Column::Username.eq(username.trim()))
        .one(&state.db)
        .await
        .map_err(db_error)?;

    let user = match user {
        Some(user) if user.is_active => user,
        _ => {
            debug!("Login failed for unknown or inactive user {}", username);
            return Err(unauthorized("INVALID_CREDENTIALS", BAD_CREDENTIALS));
        }
    };

    let valid = verify_password(&password, &user.password_hash).map_err(password_error)?;
    if !valid {
        warn!("Wrong password for admin user {}", user.username);
        return Err(unauthorized("INVALID_CREDENTIALS", BAD_CREDENTIALS));
    }
    if !user.can_access_admin() {
        return Err(forbidden(
            "FORBIDDEN",
            "Доступ запрещен. Требуются права администратора.",
        ));
    }

    let mut active: admin_user::ActiveModel = user.into();
    active.last_login = Set(Some(Utc::now()));
    let user = active.update(&state.db).await.map_err(db_error)?;

    let access = issue(&state, &user, TokenType::Access)?;
    let refresh = issue(&state, &user, TokenType::Refresh)?;
    info!("Admin user {} signed in", user.username);

    Ok(Json(LoginResponse {
        access,
        refresh,
        user: user_response(user),
    }))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/admin/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid, expired or revoked token", body = ErrorResponse)
    ),
    tag = "admin-auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let req = body(payload)?;
    let mut errors = FieldErrors::new();
    errors.require("refresh", req.refresh.as_deref());
    errors.into_result()?;

    let claims = check_refresh(&state, req.refresh.as_deref().unwrap_or_default()).await?;
    let user_id = claims
        .user_id()
        .map_err(|_| unauthorized("INVALID_TOKEN", "Token subject is not a user id"))?;

    // Rights are re-read so a demoted account stops getting tokens
    let user = load_user(&state.db, user_id).await?;
    if !user.can_access_admin() {
        return Err(forbidden(
            "FORBIDDEN",
            "Доступ запрещен. Требуются права администратора.",
        ));
    }

    debug!("Refreshed access token for {}", user.username);
    Ok(Json(RefreshResponse {
        access: issue(&state, &user, TokenType::Access)?,
    }))
}

/// Sign out, revoking the given refresh token
#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Signed out", body = MessageResponse)
    ),
    tag = "admin-auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    // A missing body or an unusable token still signs the caller out
    let token = payload.ok().and_then(|Json(req)| req.refresh);

    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        match check_refresh(&state, token.trim()).await {
            Ok(claims) => {
                let row = revoked_token::ActiveModel {
                    jti: Set(claims.jti.clone()),
                    expires_at: Set(claims.expires_at()),
                    revoked_at: Set(Utc::now()),
                };
                revoked_token::Entity::insert(row)
                    .on_conflict(
                        OnConflict::column(revoked_token::Column::Jti)
                            .do_nothing()
                            .to_owned(),
                    )
                    .do_nothing()
                    .exec(&state.db)
                    .await
                    .map_err(db_error)?;
                info!("Revoked refresh token of {}", claims.username);
            }
            Err(_) => debug!("Logout with an unusable refresh token"),
        }
    }

    // Expired revocations are no longer needed
    revoked_token::Entity::delete_many()
        .filter(revoked_token::Column::ExpiresAt.lt(Utc::now()))
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(MessageResponse::new("Вы вышли из системы")))
}

/// Current admin user
#[utoipa::path(
    get,
    path = "/api/admin/auth/me",
    responses(
        (status = 200, description = "Current user", body = AdminUserResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<AdminUserResponse>> {
    let user = load_user(&state.db, auth.user_id).await?;
    Ok(Json(user_response(user)))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/admin/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Wrong current password or weak new one", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-auth"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let req = body(payload)?;
    let mut errors = FieldErrors::new();
    errors.require("old_password", req.old_password.as_deref());
    errors.require("new_password", req.new_password.as_deref());
    errors.into_result()?;
    let old_password = req.old_password.unwrap_or_default();
    let new_password = req.new_password.unwrap_or_default();

    let user = load_user(&state.db, auth.user_id).await?;
    if !verify_password(&old_password, &user.password_hash).map_err(password_error)? {
        return Err(bad_request("WRONG_PASSWORD", "Неверный текущий пароль"));
    }
    validate_password_strength(&new_password, &user.username).map_err(password_error)?;

    let hash = hash_password(&new_password).map_err(password_error)?;
    let mut active: admin_user::ActiveModel = user.into();
    active.password_hash = Set(hash);
    let user = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin user {} changed their password", user.username);
    Ok(Json(MessageResponse::new("Пароль успешно изменен")))
}

/// Update the current user's email and name
#[utoipa::path(
    put,
    path = "/api/admin/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = AdminUserResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-auth"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<AdminUserResponse>> {
    let req = body(payload)?;
    let mut errors = FieldErrors::new();
    errors.email("email", req.email.as_deref());
    errors.max_len("email", req.email.as_deref(), 254);
    errors.max_len("first_name", req.first_name.as_deref(), 150);
    errors.max_len("last_name", req.last_name.as_deref(), 150);
    errors.into_result()?;

    let user = load_user(&state.db, auth.user_id).await?;
    let mut active: admin_user::ActiveModel = user.into();
    if let Some(email) = req.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(first_name) = req.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = req.last_name {
        active.last_name = Set(last_name);
    }
    let user = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin user {} updated their profile", user.username);
    Ok(Json(user_response(user)))
}
