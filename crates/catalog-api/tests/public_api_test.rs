//! Integration tests for the public catalog endpoints

mod common;

use axum::http::StatusCode;
use catalog_db::entities::{about_content, brand, news_item};
use common::create_test_app;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_category_tree_rolls_up_product_counts() {
    let app = create_test_app().await;
    let tools = app.create_category("Tools", None).await;
    let drills = app.create_category("Drills", Some(tools.id)).await;
    let cordless = app.create_category("Cordless", Some(drills.id)).await;
    app.create_category("Garden", None).await;

    app.create_product("Hammer", &tools, Some(10)).await;
    app.create_product("Impact drill", &drills, Some(90)).await;
    app.create_product("Cordless drill", &cordless, Some(120)).await;

    let (status, body) = app.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);

    let roots = body.as_array().unwrap();
    assert_eq!(roots.len(), 2);
    let tools_node = roots.iter().find(|c| c["slug"] == "tools").unwrap();
    assert_eq!(tools_node["products_count"], 3);
    assert_eq!(tools_node["children"][0]["products_count"], 2);
    assert_eq!(tools_node["children"][0]["children"][0]["products_count"], 1);

    let (status, body) = app.get("/api/categories/drills/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_product_pagination() {
    let app = create_test_app().await;
    let category = app.create_category("Fasteners", None).await;
    for i in 0..15 {
        app.create_product(&format!("Bolt {}", i), &category, Some(i)).await;
    }

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 15);
    assert_eq!(body["results"].as_array().unwrap().len(), 12);
    assert_eq!(body["next"], 2);
    assert!(body["previous"].is_null());

    let (_, body) = app.get("/api/products?page=2").await;
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert!(body["next"].is_null());

    let (status, body) = app.get("/api/products?page=3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "INVALID_PAGE");

    let (_, body) = app.get("/api/products?page_size=500").await;
    assert_eq!(body["results"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn test_product_price_filter_and_range() {
    let app = create_test_app().await;
    let category = app.create_category("Saws", None).await;
    app.create_product("Hand saw", &category, Some(15)).await;
    app.create_product("Band saw", &category, Some(400)).await;
    app.create_product("Unpriced saw", &category, None).await;

    let (_, body) = app.get("/api/products?price_min=100").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Band saw");

    let (status, body) = app.get("/api/products/price-range?category=saws").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["min_price"], 15.0);
    assert_eq!(body["max_price"], 400.0);

    let (_, body) = app.get("/api/products/price-range?category=missing").await;
    assert!(body["min_price"].is_null());
    assert!(body["max_price"].is_null());
}

#[tokio::test]
async fn test_product_detail_and_missing_slug() {
    let app = create_test_app().await;
    let category = app.create_category("Ladders", None).await;
    let product = app.create_product("Step ladder", &category, Some(70)).await;

    let (status, body) = app.get(&format!("/api/products/{}", product.slug)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Step ladder");
    assert!(body["internal_sku"].as_str().unwrap().contains('-'));

    let (status, _) = app.get("/api/products/no-such-product").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_writes_require_token() {
    let app = create_test_app().await;
    let category = app.create_category("Paint", None).await;

    let payload = json!({"name": "Primer", "category_id": category.id});
    let (status, body) = app.send("POST", "/api/products", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_AUTH");

    let (access, _) = app.staff_tokens().await;
    let (status, body) = app
        .send("POST", "/api/products", Some(&access), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "primer");
}

#[tokio::test]
async fn test_by_feature_requires_value() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/products/by-feature").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_PARAMETER");
}

#[tokio::test]
async fn test_brand_listing_counts_and_ordering() {
    let app = create_test_app().await;
    let category = app.create_category("Power tools", None).await;
    let mut brands = Vec::new();
    for name in ["Makita", "Bosch", "Dewalt"] {
        let model = brand::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&app.db)
        .await
        .unwrap();
        brands.push(model);
    }
    for (i, brand) in brands.iter().enumerate() {
        for n in 0..=i {
            let product = app
                .create_product(&format!("{} tool {}", brand.name, n), &category, Some(50))
                .await;
            let mut active: catalog_db::entities::product::ActiveModel = product.into();
            active.brand_id = Set(Some(brand.id));
            active.update(&app.db).await.unwrap();
        }
    }

    let (status, body) = app.get("/api/brands?ordering=-products_count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"][0]["name"], "Dewalt");
    assert_eq!(body["results"][0]["products_count"], 3);

    let (_, body) = app.get("/api/brands?ordering=name").await;
    assert_eq!(body["results"][0]["name"], "Bosch");

    let (_, body) = app.get("/api/brands/makita/products").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_news_lists_only_published() {
    let app = create_test_app().await;
    for (title, published) in [("Opening", true), ("Draft", false), ("Sale", true)] {
        news_item::ActiveModel {
            title: Set(title.to_string()),
            content: Set(format!("{} content", title)),
            preview: Set(format!("{} preview", title)),
            is_published: Set(published),
            ..Default::default()
        }
        .insert(&app.db)
        .await
        .unwrap();
    }

    let (status, body) = app.get("/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, _) = app.get("/api/news/draft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/news/sale").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Sale content");
}

#[tokio::test]
async fn test_about_placeholder_and_stored_page() {
    let app = create_test_app().await;

    let (status, body) = app.get("/api/about").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "О нас");

    about_content::ActiveModel {
        title: Set("Our shop".to_string()),
        content: Set("Since 1999".to_string()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let (_, body) = app.get("/api/about").await;
    assert_eq!(body["title"], "Our shop");
}

#[tokio::test]
async fn test_contact_message_validation() {
    let app = create_test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/contact/message",
            None,
            Some(json!({"name": "Ann", "email": "not-an-email"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["message"].is_array());

    let (status, body) = app
        .send(
            "POST",
            "/api/contact/message",
            None,
            Some(json!({"name": "Ann", "email": "ann@example.com", "message": "Hello"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Ваше сообщение успешно отправлено!");
}
