//! Shared helpers for the API integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_api::{ApiServer, ApiServerConfig};
use catalog_db::entities::{admin_user, category, product};
use catalog_db::sku;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt; // For `oneshot` method

pub const ADMIN_PASSWORD: &str = "Sturdy-Catalog-42";

pub struct TestApp {
    pub db: DatabaseConnection,
    pub router: Router,
    /// Keeps the media directory alive for the test
    pub media: TempDir,
}

/// In-memory database with migrations applied, wired into a router
pub async fn create_test_app() -> TestApp {
    let db = catalog_db::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    catalog_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    let media = tempfile::tempdir().expect("Failed to create media dir");
    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        jwt_secret: "test-secret".to_string(),
        media_root: media.path().to_path_buf(),
        ..Default::default()
    };
    let router = ApiServer::new(config, db.clone()).build_router();

    TestApp { db, router, media }
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None, None).await
    }

    /// Create an account and return it
    pub async fn create_user(&self, username: &str, is_staff: bool) -> admin_user::Model {
        admin_user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{}@catalog.local", username)),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            password_hash: Set(catalog_auth::hash_password(ADMIN_PASSWORD).unwrap()),
            is_staff: Set(is_staff),
            is_superuser: Set(false),
            is_active: Set(true),
            date_joined: Set(chrono::Utc::now()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to create user")
    }

    /// Log in as a fresh staff account and return `(access, refresh)`
    pub async fn staff_tokens(&self) -> (String, String) {
        self.create_user("editor", true).await;
        let (status, body) = self
            .send(
                "POST",
                "/api/admin/auth/login",
                None,
                Some(serde_json::json!({"username": "editor", "password": ADMIN_PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (
            body["access"].as_str().unwrap().to_string(),
            body["refresh"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_category(&self, name: &str, parent: Option<i32>) -> category::Model {
        category::ActiveModel {
            name: Set(name.to_string()),
            parent_id: Set(parent),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to create category")
    }

    pub async fn create_product(
        &self,
        name: &str,
        category: &category::Model,
        price: Option<i64>,
    ) -> product::Model {
        let model = product::ActiveModel {
            name: Set(name.to_string()),
            description: Set(format!("{} description", name)),
            category_id: Set(category.id),
            price: Set(price.map(Decimal::from)),
            ..Default::default()
        };
        sku::save_product(&self.db, model, Some(&category.slug), sku::random_suffix)
            .await
            .expect("Failed to create product")
    }
}
