//! Integration tests for the admin surface: auth, CRUD and nested product sync

mod common;

use axum::http::StatusCode;
use catalog_db::entities::{contact_message, feature, feature_value, tag, tag_name};
use common::{create_test_app, ADMIN_PASSWORD};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

#[tokio::test]
async fn test_login_rejects_bad_credentials_and_non_staff() {
    let app = create_test_app().await;
    app.create_user("visitor", false).await;
    app.create_user("editor", true).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/auth/login",
            None,
            Some(json!({"username": "editor", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/auth/login",
            None,
            Some(json!({"username": "visitor", "password": ADMIN_PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = app
        .send("POST", "/api/admin/auth/login", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["username"].is_array());
}

#[tokio::test]
async fn test_refresh_and_logout_revokes_token() {
    let app = create_test_app().await;
    let (access, refresh) = app.staff_tokens().await;

    let (status, body) = app.send("GET", "/api/admin/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "editor");

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/auth/refresh",
            None,
            Some(json!({"refresh": refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].as_str().is_some());

    // An access token is not accepted as a refresh token
    let (status, body) = app
        .send(
            "POST",
            "/api/admin/auth/refresh",
            None,
            Some(json!({"refresh": access})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN_TYPE");

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/auth/logout",
            None,
            Some(json!({"refresh": refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/auth/refresh",
            None,
            Some(json!({"refresh": refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_change_password() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/auth/change-password",
            Some(&access),
            Some(json!({"old_password": "nope", "new_password": "Another-Strong-77"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "WRONG_PASSWORD");

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/auth/change-password",
            Some(&access),
            Some(json!({"old_password": ADMIN_PASSWORD, "new_password": "12345678"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/auth/change-password",
            Some(&access),
            Some(json!({"old_password": ADMIN_PASSWORD, "new_password": "Another-Strong-77"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/auth/login",
            None,
            Some(json!({"username": "editor", "password": "Another-Strong-77"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/admin/stats").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_AUTH");
}

#[tokio::test]
async fn test_brand_crud_and_protected_delete() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;
    let token = Some(access.as_str());

    let (status, brand) = app
        .send(
            "POST",
            "/api/admin/brands",
            token,
            Some(json!({"name": "Hilti", "description": "Anchors"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(brand["slug"], "hilti");
    let brand_id = brand["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "PATCH",
            &format!("/api/admin/brands/{}", brand_id),
            token,
            Some(json!({"description": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["description"].is_null());
    assert_eq!(body["name"], "Hilti");

    let category = app.create_category("Anchors", None).await;
    let (status, _) = app
        .send(
            "POST",
            "/api/admin/products",
            token,
            Some(json!({"name": "Anchor bolt", "category": category.id, "brand": brand_id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send("DELETE", &format!("/api/admin/brands/{}", brand_id), token, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BRAND_IN_USE");
}

#[tokio::test]
async fn test_image_paths_must_stay_under_media_root() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;
    let token = Some(access.as_str());
    let tools = app.create_category("Tools", None).await;
    let drill = app.create_product("Drill", &tools, Some(100)).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/images",
            token,
            Some(json!({"product": drill.id, "image": "/etc/hostname"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["image"].is_array());

    let (status, image) = app
        .send(
            "POST",
            "/api/admin/images",
            token,
            Some(json!({"product": drill.id, "image": "products/drill.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = image["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/admin/images/{}", id),
            token,
            Some(json!({"image": "products/../../outside.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["image"].is_array());

    let (status, _) = app
        .send("DELETE", &format!("/api/admin/images/{}", id), token, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_category_cannot_move_under_its_subtree() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;
    let root = app.create_category("Root", None).await;
    let child = app.create_category("Child", Some(root.id)).await;

    let (status, body) = app
        .send(
            "PATCH",
            &format!("/api/admin/categories/{}", root.id),
            Some(&access),
            Some(json!({"parent": child.id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["parent"].is_array());

    let (status, body) = app
        .send("GET", "/api/admin/categories?parent=null", Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_product_nested_sync() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;
    let token = Some(access.as_str());
    let tools = app.create_category("Tools", None).await;

    let color = feature::ActiveModel {
        name: Set("Color".to_string()),
        category_id: Set(tools.id),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    let red = feature_value::ActiveModel {
        category_id: Set(Some(tools.id)),
        feature_id: Set(Some(color.id)),
        value: Set("Red".to_string()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    let usage = tag_name::ActiveModel {
        name: Set("Usage".to_string()),
        category_id: Set(Some(tools.id)),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    let pro = tag::ActiveModel {
        name: Set("Pro".to_string()),
        category_id: Set(Some(tools.id)),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let (status, product) = app
        .send(
            "POST",
            "/api/admin/products",
            token,
            Some(json!({
                "name": "Red drill",
                "category": tools.id,
                "price": "99.90",
                "features": [{"feature_id": color.id, "value_id": red.id}],
                "tag_groups": [{"group_name_id": usage.id, "tag_ids": [pro.id]}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", product);
    assert_eq!(product["features"].as_array().unwrap().len(), 1);
    assert_eq!(product["tag_groups"][0]["tag_ids"][0], pro.id);
    assert!(product["internal_sku"].as_str().unwrap().starts_with("TOO-"));
    let id = product["id"].as_i64().unwrap();

    // Replace-all: an empty list clears the features
    let (status, product) = app
        .send(
            "PATCH",
            &format!("/api/admin/products/{}", id),
            token,
            Some(json!({"features": []})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(product["features"].as_array().unwrap().is_empty());
    assert_eq!(product["tag_groups"].as_array().unwrap().len(), 1);

    // Features from another category are rejected
    let garden = app.create_category("Garden", None).await;
    let size = feature::ActiveModel {
        name: Set("Size".to_string()),
        category_id: Set(garden.id),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    let (status, _) = app
        .send(
            "PATCH",
            &format!("/api/admin/products/{}", id),
            token,
            Some(json!({"features": [{"feature_id": size.id}]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Moving the product re-checks the tag groups it keeps
    let (status, body) = app
        .send(
            "PATCH",
            &format!("/api/admin/products/{}", id),
            token,
            Some(json!({"category": garden.id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["tag_groups"].is_array(), "{}", body);

    let (status, product) = app
        .send(
            "PATCH",
            &format!("/api/admin/products/{}", id),
            token,
            Some(json!({"category": garden.id, "tag_groups": []})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", product);
    assert_eq!(product["category"], garden.id);
    assert!(product["tag_groups"].as_array().unwrap().is_empty());

    let (status, _) = app
        .send("DELETE", &format!("/api/admin/products/{}", id), token, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_about_get_or_create() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;

    let (status, body) = app.send("GET", "/api/admin/about", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "О нас");
    let id = body["id"].clone();

    let (status, body) = app
        .send(
            "PUT",
            "/api/admin/about",
            Some(&access),
            Some(json!({"title": "About the shop"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (_, body) = app.get("/api/about").await;
    assert_eq!(body["title"], "About the shop");
}

#[tokio::test]
async fn test_message_processing() {
    let app = create_test_app().await;
    let (access, _) = app.staff_tokens().await;
    let message = contact_message::ActiveModel {
        name: Set("Ann".to_string()),
        email: Set("ann@example.com".to_string()),
        message: Set("Do you ship abroad?".to_string()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let (_, body) = app
        .send("GET", "/api/admin/stats", Some(&access), None)
        .await;
    assert_eq!(body["unread_messages"], 1);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/admin/messages/{}/mark-processed", message.id),
            Some(&access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");

    let (_, body) = app
        .send(
            "GET",
            "/api/admin/messages?is_processed=false",
            Some(&access),
            None,
        )
        .await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/admin/messages/{}", message.id),
            Some(&access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(contact_message::Entity::find_by_id(message.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_none());
}
