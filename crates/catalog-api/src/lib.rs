//! HTTP API for the product catalog
//!
//! Public catalog endpoints under `/api`, the JWT-guarded admin surface
//! under `/api/admin`, uploaded media under the media URL prefix and the
//! OpenAPI document at `/api/openapi.json`.

pub mod assemble;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod product_write;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use handlers::admin;
use media::MediaStore;
use sea_orm::DatabaseConnection;

/// Largest request body accepted (multipart uploads included)
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub media: MediaStore,
    pub jwt_secret: String,
    pub access_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalog with a JWT-protected admin surface",
        contact(
            name = "Catalog Team",
            email = "team@catalog.local"
        )
    ),
    modifiers(&BearerAuth),
    paths(
        handlers::system::health_check,
        handlers::categories::list_categories,
        handlers::categories::get_category,
        handlers::categories::category_products,
        handlers::categories::category_brands,
        handlers::categories::category_tags,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::price_range,
        handlers::products::upload_image,
        handlers::products::products_by_feature,
        handlers::brands::list_brands,
        handlers::brands::get_brand,
        handlers::brands::brand_products,
        handlers::brands::brand_categories,
        handlers::brands::brand_tags,
        handlers::tags::list_tags,
        handlers::tags::get_tag,
        handlers::tags::tags_with_count,
        handlers::news::list_news,
        handlers::news::get_news,
        handlers::content::get_about,
        handlers::content::get_contact,
        handlers::content::send_message,
        handlers::vocabulary::features_tags_by_category,
        handlers::vocabulary::feature_values_by_feature,
        admin::auth::login,
        admin::auth::refresh,
        admin::auth::logout,
        admin::auth::me,
        admin::auth::change_password,
        admin::auth::update_profile,
        admin::stats::stats,
        admin::products::list,
        admin::products::create,
        admin::products::get,
        admin::products::update,
        admin::products::delete,
        admin::products::upload_image,
        admin::products::delete_image,
        admin::categories::list,
        admin::categories::create,
        admin::categories::get,
        admin::categories::update,
        admin::categories::delete,
        admin::categories::upload_image,
        admin::brands::list,
        admin::brands::create,
        admin::brands::get,
        admin::brands::update,
        admin::brands::delete,
        admin::brands::upload_logo,
        admin::vocabulary::list_tags,
        admin::vocabulary::create_tag,
        admin::vocabulary::get_tag,
        admin::vocabulary::update_tag,
        admin::vocabulary::delete_tag,
        admin::vocabulary::tags_by_tag_name,
        admin::vocabulary::list_tag_names,
        admin::vocabulary::create_tag_name,
        admin::vocabulary::get_tag_name,
        admin::vocabulary::update_tag_name,
        admin::vocabulary::delete_tag_name,
        admin::vocabulary::list_features,
        admin::vocabulary::create_feature,
        admin::vocabulary::get_feature,
        admin::vocabulary::update_feature,
        admin::vocabulary::delete_feature,
        admin::vocabulary::list_feature_values,
        admin::vocabulary::create_feature_value,
        admin::vocabulary::get_feature_value,
        admin::vocabulary::update_feature_value,
        admin::vocabulary::delete_feature_value,
        admin::news::list,
        admin::news::create,
        admin::news::get,
        admin::news::update,
        admin::news::delete,
        admin::images::list,
        admin::images::create,
        admin::images::get,
        admin::images::update,
        admin::images::delete,
        admin::content::get_about,
        admin::content::update_about,
        admin::content::get_contact,
        admin::content::update_contact,
        admin::content::list_messages,
        admin::content::get_message,
        admin::content::update_message,
        admin::content::delete_message,
        admin::content::mark_processed,
        admin::content::mark_unprocessed,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::HealthResponse,
            models::MessageResponse,
            models::IdName,
            models::CategoryTreeNode,
            models::TagItem,
            models::TagWithCount,
            models::TagGroupFacet,
            models::BrandItem,
            models::ImageItem,
            models::ProductFeatureItem,
            models::ProductTagGroupItem,
            models::ProductListItem,
            models::ProductDetail,
            models::FeatureInput,
            models::ProductWriteRequest,
            models::PriceRange,
            models::UploadedImage,
            models::UploadedImages,
            models::NewsListItem,
            models::NewsDetail,
            models::AboutContentResponse,
            models::ContactInfoResponse,
            models::ContactMessageRequest,
            models::FeatureValueFacet,
            models::CategoryVocabulary,
            models::FeatureValueItem,
            models::AdminUserResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::RefreshRequest,
            models::RefreshResponse,
            models::ChangePasswordRequest,
            models::UpdateProfileRequest,
            models::StatsResponse,
            models::TagGroupInput,
            models::ImageEditInput,
            models::AdminProductRequest,
            models::AdminProductFeature,
            models::AdminProductTagGroup,
            models::AdminProduct,
            models::SuccessResponse,
            models::AdminCategory,
            models::AdminCategoryRequest,
            models::ImageUrlResponse,
            models::AdminBrand,
            models::AdminBrandRequest,
            models::LogoUrlResponse,
            models::AdminTag,
            models::AdminTagName,
            models::AdminFeature,
            models::AdminFeatureValue,
            models::VocabularyRequest,
            models::AdminNews,
            models::AdminNewsRequest,
            models::AdminImage,
            models::AdminImageRequest,
            models::AdminAboutContent,
            models::AdminAboutRequest,
            models::AdminContactInfo,
            models::AdminContactRequest,
            models::AdminMessage,
            models::AdminMessageRequest,
            models::MessageStatusResponse,
        )
    ),
    tags(
        (name = "system", description = "System health endpoints"),
        (name = "products", description = "Product catalog"),
        (name = "categories", description = "Category tree"),
        (name = "brands", description = "Brands and their facets"),
        (name = "tags", description = "Product tags"),
        (name = "news", description = "Published news"),
        (name = "content", description = "About page, contacts and visitor messages"),
        (name = "vocabulary", description = "Features and tags available per category"),
        (name = "admin-auth", description = "Admin login and account endpoints"),
        (name = "admin", description = "Admin dashboard"),
        (name = "admin-products", description = "Product management"),
        (name = "admin-catalog", description = "Category and brand management"),
        (name = "admin-vocabulary", description = "Tag, tag name, feature and feature value management"),
        (name = "admin-content", description = "News, images, pages and message management")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// Allowed CORS origins; empty allows local development origins only
    pub cors_origins: Vec<String>,
    /// Secret for signing admin tokens
    pub jwt_secret: String,
    /// Directory uploaded files are written to
    pub media_root: std::path::PathBuf,
    /// URL prefix media paths are published under
    pub media_url: String,
    pub access_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            enable_cors: true,
            cors_origins: Vec::new(),
            jwt_secret: String::new(),
            media_root: "media".into(),
            media_url: "/media/".to_string(),
            access_ttl: chrono::Duration::minutes(30),
            refresh_ttl: chrono::Duration::days(7),
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let state = Arc::new(AppState {
            db,
            media: MediaStore::new(config.media_root.clone(), config.media_url.clone()),
            jwt_secret: config.jwt_secret.clone(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();
        let jwt_state = Arc::new(middleware::JwtState::new(self.config.jwt_secret.as_bytes()));
        let require_admin =
            axum_middleware::from_fn_with_state(jwt_state, middleware::require_admin);

        // Reads of the public catalog plus the admin token endpoints
        let public_router = Router::new()
            .route("/api/health", get(handlers::system::health_check))
            .route("/api/categories", get(handlers::categories::list_categories))
            .route("/api/categories/{slug}", get(handlers::categories::get_category))
            .route(
                "/api/categories/{slug}/products",
                get(handlers::categories::category_products),
            )
            .route(
                "/api/categories/{slug}/brands",
                get(handlers::categories::category_brands),
            )
            .route(
                "/api/categories/{slug}/tags",
                get(handlers::categories::category_tags),
            )
            .route("/api/products", get(handlers::products::list_products))
            .route("/api/products/price-range", get(handlers::products::price_range))
            .route(
                "/api/products/by-feature",
                get(handlers::products::products_by_feature),
            )
            .route("/api/products/{slug}", get(handlers::products::get_product))
            .route("/api/brands", get(handlers::brands::list_brands))
            .route("/api/brands/{slug}", get(handlers::brands::get_brand))
            .route("/api/brands/{slug}/products", get(handlers::brands::brand_products))
            .route(
                "/api/brands/{slug}/categories",
                get(handlers::brands::brand_categories),
            )
            .route("/api/brands/{slug}/tags", get(handlers::brands::brand_tags))
            .route("/api/tags", get(handlers::tags::list_tags))
            .route("/api/tags/with-count", get(handlers::tags::tags_with_count))
            .route("/api/tags/{id}", get(handlers::tags::get_tag))
            .route("/api/news", get(handlers::news::list_news))
            .route("/api/news/{slug}", get(handlers::news::get_news))
            .route("/api/about", get(handlers::content::get_about))
            .route("/api/contact", get(handlers::content::get_contact))
            .route("/api/contact/message", post(handlers::content::send_message))
            .route(
                "/api/features-tags-by-category",
                get(handlers::vocabulary::features_tags_by_category),
            )
            .route(
                "/api/feature-values-by-feature",
                get(handlers::vocabulary::feature_values_by_feature),
            )
            .route("/api/admin/auth/login", post(admin::auth::login))
            .route("/api/admin/auth/refresh", post(admin::auth::refresh))
            .route("/api/admin/auth/logout", post(admin::auth::logout))
            .with_state(self.state.clone());

        // Product writes on the public surface need a staff token
        let catalog_writes = Router::new()
            .route("/api/products", post(handlers::products::create_product))
            .route(
                "/api/products/{slug}",
                put(handlers::products::update_product).patch(handlers::products::update_product),
            )
            .route(
                "/api/products/{slug}/upload-image",
                post(handlers::products::upload_image),
            )
            .with_state(self.state.clone())
            .route_layer(require_admin.clone());

        let admin_router = Router::new()
            .route("/api/admin/auth/me", get(admin::auth::me))
            .route(
                "/api/admin/auth/change-password",
                post(admin::auth::change_password),
            )
            .route(
                "/api/admin/auth/profile",
                put(admin::auth::update_profile).patch(admin::auth::update_profile),
            )
            .route("/api/admin/stats", get(admin::stats::stats))
            // Products
            .route(
                "/api/admin/products",
                get(admin::products::list).post(admin::products::create),
            )
            .route(
                "/api/admin/products/{id}",
                get(admin::products::get)
                    .put(admin::products::update)
                    .patch(admin::products::update)
                    .delete(admin::products::delete),
            )
            .route(
                "/api/admin/products/{id}/upload-image",
                post(admin::products::upload_image),
            )
            .route(
                "/api/admin/products/{id}/delete-image/{image_id}",
                axum::routing::delete(admin::products::delete_image),
            )
            // Categories and brands
            .route(
                "/api/admin/categories",
                get(admin::categories::list).post(admin::categories::create),
            )
            .route(
                "/api/admin/categories/{id}",
                get(admin::categories::get)
                    .put(admin::categories::update)
                    .patch(admin::categories::update)
                    .delete(admin::categories::delete),
            )
            .route(
                "/api/admin/categories/{id}/upload-image",
                post(admin::categories::upload_image),
            )
            .route(
                "/api/admin/brands",
                get(admin::brands::list).post(admin::brands::create),
            )
            .route(
                "/api/admin/brands/{id}",
                get(admin::brands::get)
                    .put(admin::brands::update)
                    .patch(admin::brands::update)
                    .delete(admin::brands::delete),
            )
            .route(
                "/api/admin/brands/{id}/upload-logo",
                post(admin::brands::upload_logo),
            )
            // Vocabulary
            .route(
                "/api/admin/tags",
                get(admin::vocabulary::list_tags).post(admin::vocabulary::create_tag),
            )
            .route(
                "/api/admin/tags/{id}",
                get(admin::vocabulary::get_tag)
                    .put(admin::vocabulary::update_tag)
                    .patch(admin::vocabulary::update_tag)
                    .delete(admin::vocabulary::delete_tag),
            )
            .route(
                "/api/admin/tags-by-tag-name/{tag_name_id}",
                get(admin::vocabulary::tags_by_tag_name),
            )
            .route(
                "/api/admin/tag-names",
                get(admin::vocabulary::list_tag_names).post(admin::vocabulary::create_tag_name),
            )
            .route(
                "/api/admin/tag-names/{id}",
                get(admin::vocabulary::get_tag_name)
                    .put(admin::vocabulary::update_tag_name)
                    .patch(admin::vocabulary::update_tag_name)
                    .delete(admin::vocabulary::delete_tag_name),
            )
            .route(
                "/api/admin/features",
                get(admin::vocabulary::list_features).post(admin::vocabulary::create_feature),
            )
            .route(
                "/api/admin/features/{id}",
                get(admin::vocabulary::get_feature)
                    .put(admin::vocabulary::update_feature)
                    .patch(admin::vocabulary::update_feature)
                    .delete(admin::vocabulary::delete_feature),
            )
            .route(
                "/api/admin/feature-values",
                get(admin::vocabulary::list_feature_values)
                    .post(admin::vocabulary::create_feature_value),
            )
            .route(
                "/api/admin/feature-values/{id}",
                get(admin::vocabulary::get_feature_value)
                    .put(admin::vocabulary::update_feature_value)
                    .patch(admin::vocabulary::update_feature_value)
                    .delete(admin::vocabulary::delete_feature_value),
            )
            // Content
            .route(
                "/api/admin/news",
                get(admin::news::list).post(admin::news::create),
            )
            .route(
                "/api/admin/news/{id}",
                get(admin::news::get)
                    .put(admin::news::update)
                    .patch(admin::news::update)
                    .delete(admin::news::delete),
            )
            .route(
                "/api/admin/images",
                get(admin::images::list).post(admin::images::create),
            )
            .route(
                "/api/admin/images/{id}",
                get(admin::images::get)
                    .put(admin::images::update)
                    .patch(admin::images::update)
                    .delete(admin::images::delete),
            )
            .route(
                "/api/admin/about",
                get(admin::content::get_about)
                    .put(admin::content::update_about)
                    .patch(admin::content::update_about),
            )
            .route(
                "/api/admin/contact",
                get(admin::content::get_contact)
                    .put(admin::content::update_contact)
                    .patch(admin::content::update_contact),
            )
            .route("/api/admin/messages", get(admin::content::list_messages))
            .route(
                "/api/admin/messages/{id}",
                get(admin::content::get_message)
                    .put(admin::content::update_message)
                    .patch(admin::content::update_message)
                    .delete(admin::content::delete_message),
            )
            .route(
                "/api/admin/messages/{id}/mark-processed",
                post(admin::content::mark_processed),
            )
            .route(
                "/api/admin/messages/{id}/mark-unprocessed",
                post(admin::content::mark_unprocessed),
            )
            .with_state(self.state.clone())
            .route_layer(require_admin);

        // Public GETs and guarded writes share paths, so method routers are merged
        let api_router = public_router.merge(catalog_writes).merge(admin_router);

        // SwaggerUi also registers /api/openapi.json
        let mut router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        if let Some(path) = self.state.media.serve_path() {
            router = router.nest_service(path, ServeDir::new(self.state.media.root()));
        }

        let mut router = router
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(self.cors_layer());
        }

        router
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins = self.config.cors_origins.clone();

        // Credentials are allowed for cookie auth, which rules out a wildcard origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true)
            .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                let origin_str = origin.to_str().unwrap_or("");
                if !origins.is_empty() {
                    return origins.iter().any(|o| o == origin_str);
                }
                origin_str.starts_with("http://localhost:")
                    || origin_str.starts_with("http://127.0.0.1:")
                    || origin_str.starts_with("https://localhost:")
                    || origin_str.starts_with("https://127.0.0.1:")
            }))
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI document: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);
        info!("Media files: {}", self.state.media.root().display());

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/products/{slug}"));
        assert!(doc.paths.paths.contains_key("/api/admin/messages/{id}/mark-processed"));

        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
