//! Integration tests for catalog-db
//!
//! Run against a real SQLite in-memory database with migrations applied

use std::collections::HashSet;

use catalog_db::category_tree::{self, CategoryForest};
use catalog_db::entities::{
    about_content, brand, category, contact_info, feature, feature_value, image, product,
    product_feature, product_tag_group, product_tag_group_tag, tag, tag_name,
};
use catalog_db::product_filter::{ProductFilter, ProductOrdering};
use catalog_db::product_sync::{self, FeatureAssignment, ImageEdit, TagGroupAssignment};
use catalog_db::sku::{self, MAX_SKU_ATTEMPTS};
use catalog_db::{connect, migrate, CatalogError};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};

async fn setup_test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn create_category(db: &DatabaseConnection, name: &str, parent: Option<i32>) -> category::Model {
    category::ActiveModel {
        name: Set(name.to_string()),
        parent_id: Set(parent),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create category")
}

async fn create_product(
    db: &DatabaseConnection,
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
    sku::save_product(db, model, Some(&category.slug), sku::random_suffix)
        .await
        .expect("Failed to create product")
}

async fn filtered(db: &DatabaseConnection, filter: &ProductFilter) -> Vec<product::Model> {
    filter
        .apply(db, product::Entity::find())
        .await
        .expect("Failed to build filter")
        .all(db)
        .await
        .expect("Failed to run filter")
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");
    assert!(migrate(&db).await.is_ok());
}

#[tokio::test]
async fn test_slug_derived_on_insert() {
    let db = setup_test_db().await;

    let cat = create_category(&db, "Power Tools", None).await;
    assert_eq!(cat.slug, "power-tools");
    assert_eq!(cat.sort_order, 0);

    let b = brand::ActiveModel {
        name: Set("Black & Decker".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    assert_eq!(b.slug, "black-decker");
}

#[tokio::test]
async fn test_rollup_returns_union_without_duplicates() {
    let db = setup_test_db().await;

    let tools = create_category(&db, "Tools", None).await;
    let drills = create_category(&db, "Drills", Some(tools.id)).await;
    let cordless = create_category(&db, "Cordless", Some(drills.id)).await;
    let saws = create_category(&db, "Saws", Some(tools.id)).await;
    let garden = create_category(&db, "Garden", None).await;

    let mut expected = HashSet::new();
    for (i, cat) in [&tools, &drills, &cordless, &saws].iter().enumerate() {
        for j in 0..2 {
            let p = create_product(&db, &format!("Item {}-{}", i, j), cat, Some(100)).await;
            expected.insert(p.id);
        }
    }
    create_product(&db, "Rake", &garden, Some(10)).await;

    let products = category_tree::subtree_products(&db, tools.id)
        .await
        .unwrap()
        .all(&db)
        .await
        .unwrap();
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let unique: HashSet<i32> = ids.iter().copied().collect();

    assert_eq!(ids.len(), unique.len());
    assert_eq!(unique, expected);

    let forest = CategoryForest::load(&db).await.unwrap();
    assert_eq!(forest.products_count(tools.id), 8);
    assert_eq!(forest.products_count(drills.id), 4);
    assert_eq!(forest.products_count(garden.id), 1);

    let roots = forest.roots();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].category.name, "Garden");
    assert_eq!(roots[1].children.len(), 2);
}

#[tokio::test]
async fn test_filter_without_params_returns_all_newest_first() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Tools", None).await;

    let first = create_product(&db, "First", &cat, Some(1)).await;
    let second = create_product(&db, "Second", &cat, None).await;
    let third = create_product(&db, "Third", &cat, Some(3)).await;

    let products = filtered(&db, &ProductFilter::default()).await;
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn test_price_bounds_intersect() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Tools", None).await;

    for price in [50, 100, 150, 200, 250] {
        create_product(&db, &format!("P{}", price), &cat, Some(price)).await;
    }
    create_product(&db, "Unpriced", &cat, None).await;

    let both = ProductFilter {
        price_min: Some(Decimal::from(100)),
        price_max: Some(Decimal::from(200)),
        ordering: ProductOrdering::PriceAsc,
        ..Default::default()
    };
    let prices: Vec<Option<Decimal>> = filtered(&db, &both).await.iter().map(|p| p.price).collect();
    assert_eq!(
        prices,
        vec![
            Some(Decimal::from(100)),
            Some(Decimal::from(150)),
            Some(Decimal::from(200))
        ]
    );

    let min_only: HashSet<i32> = filtered(
        &db,
        &ProductFilter {
            price_min: Some(Decimal::from(100)),
            ..Default::default()
        },
    )
    .await
    .iter()
    .map(|p| p.id)
    .collect();
    let max_only: HashSet<i32> = filtered(
        &db,
        &ProductFilter {
            price_max: Some(Decimal::from(200)),
            ..Default::default()
        },
    )
    .await
    .iter()
    .map(|p| p.id)
    .collect();
    let combined: HashSet<i32> = filtered(&db, &both).await.iter().map(|p| p.id).collect();
    assert_eq!(combined, &min_only & &max_only);
}

#[tokio::test]
async fn test_filter_by_tags_brand_search_and_category() {
    let db = setup_test_db().await;
    let tools = create_category(&db, "Tools", None).await;
    let drills = create_category(&db, "Drills", Some(tools.id)).await;
    let garden = create_category(&db, "Garden", None).await;

    let bosch = brand::ActiveModel {
        name: Set("Bosch".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let drill = create_product(&db, "Cordless Drill", &drills, Some(120)).await;
    let mut drill_active: product::ActiveModel = drill.clone().into();
    drill_active.brand_id = Set(Some(bosch.id));
    drill_active.update(&db).await.unwrap();

    let hammer = create_product(&db, "Hammer", &tools, Some(20)).await;
    let rake = create_product(&db, "Rake", &garden, Some(15)).await;

    let group_name = tag_name::ActiveModel {
        name: Set("Purpose".to_string()),
        category_id: Set(Some(drills.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    let pro = tag::ActiveModel {
        name: Set("Professional".to_string()),
        category_id: Set(Some(drills.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    let home = tag::ActiveModel {
        name: Set("Home".to_string()),
        category_id: Set(Some(drills.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    // Two matching tags on one product must still yield the product once
    product_sync::replace_tag_groups(
        &db,
        drill.id,
        &[TagGroupAssignment {
            group_name_id: Some(group_name.id),
            tag_ids: vec![pro.id, home.id],
        }],
    )
    .await
    .unwrap();

    let by_tag = filtered(
        &db,
        &ProductFilter {
            tags: vec!["professional".to_string(), "Home".to_string()],
            ..Default::default()
        },
    )
    .await;
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, drill.id);

    let by_brand = filtered(
        &db,
        &ProductFilter {
            brands: vec!["bosch".to_string()],
            ..Default::default()
        },
    )
    .await;
    assert_eq!(by_brand.len(), 1);

    let by_search = filtered(
        &db,
        &ProductFilter {
            search: Some("HAMM".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].id, hammer.id);

    let by_category: HashSet<i32> = filtered(
        &db,
        &ProductFilter {
            category: Some("tools".to_string()),
            ..Default::default()
        },
    )
    .await
    .iter()
    .map(|p| p.id)
    .collect();
    assert_eq!(by_category, HashSet::from([drill.id, hammer.id]));
    assert!(!by_category.contains(&rake.id));

    let unknown = filtered(
        &db,
        &ProductFilter {
            category: Some("no-such-category".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn test_filter_by_feature_value() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Drills", None).await;
    let voltage = feature::ActiveModel {
        name: Set("Voltage".to_string()),
        category_id: Set(cat.id),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    let v18 = feature_value::ActiveModel {
        category_id: Set(Some(cat.id)),
        feature_id: Set(Some(voltage.id)),
        value: Set("18V".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    let v12 = feature_value::ActiveModel {
        category_id: Set(Some(cat.id)),
        feature_id: Set(Some(voltage.id)),
        value: Set("12V".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let strong = create_product(&db, "Strong", &cat, None).await;
    let light = create_product(&db, "Light", &cat, None).await;
    product_sync::replace_features(
        &db,
        strong.id,
        &[FeatureAssignment {
            feature_id: Some(voltage.id),
            value_id: Some(v18.id),
        }],
    )
    .await
    .unwrap();
    product_sync::replace_features(
        &db,
        light.id,
        &[FeatureAssignment {
            feature_id: Some(voltage.id),
            value_id: Some(v12.id),
        }],
    )
    .await
    .unwrap();

    let found = filtered(
        &db,
        &ProductFilter {
            features: vec![(voltage.id, "18v".to_string())],
            ..Default::default()
        },
    )
    .await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, strong.id);
}

#[tokio::test]
async fn test_sku_format() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Drills", None).await;
    let p = create_product(&db, "Impact drill", &cat, None).await;

    let sku = p.internal_sku.expect("SKU assigned");
    let (prefix, digits) = sku.split_once('-').expect("dash separator");
    assert_eq!(prefix, "DRI");
    assert_eq!(digits.len(), 4);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_sku_retries_on_collision() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Drills", None).await;

    let first = sku::save_product(
        &db,
        product::ActiveModel {
            name: Set("One".to_string()),
            description: Set(String::new()),
            category_id: Set(cat.id),
            ..Default::default()
        },
        Some(&cat.slug),
        || 42,
    )
    .await
    .unwrap();
    assert_eq!(first.internal_sku.as_deref(), Some("DRI-0042"));

    let mut candidates = vec![7u16, 42, 42].into_iter();
    let second = sku::save_product(
        &db,
        product::ActiveModel {
            name: Set("Two".to_string()),
            description: Set(String::new()),
            category_id: Set(cat.id),
            ..Default::default()
        },
        Some(&cat.slug),
        move || candidates.next_back().unwrap_or(0),
    )
    .await
    .unwrap();
    assert_eq!(second.internal_sku.as_deref(), Some("DRI-0007"));
    assert_eq!(product::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_sku_exhaustion_is_an_error() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Drills", None).await;

    let taken = || 1234;
    let model = |name: &str| product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(String::new()),
        category_id: Set(cat.id),
        ..Default::default()
    };
    sku::save_product(&db, model("One"), Some(&cat.slug), taken)
        .await
        .unwrap();

    let mut calls = 0u32;
    let result = sku::save_product(&db, model("Two"), Some(&cat.slug), || {
        calls += 1;
        1234
    })
    .await;

    match result {
        Err(CatalogError::SkuExhausted { prefix, attempts }) => {
            assert_eq!(prefix, "DRI");
            assert_eq!(attempts, MAX_SKU_ATTEMPTS);
        }
        other => panic!("expected SKU exhaustion, got {:?}", other),
    }
    assert_eq!(calls, MAX_SKU_ATTEMPTS);
    assert_eq!(product::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_replace_features_removes_old_rows() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Drills", None).await;
    let p = create_product(&db, "Drill", &cat, None).await;

    let mut features = Vec::new();
    for name in ["Voltage", "Weight", "Chuck"] {
        let f = feature::ActiveModel {
            name: Set(name.to_string()),
            category_id: Set(cat.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let v = feature_value::ActiveModel {
            category_id: Set(Some(cat.id)),
            feature_id: Set(Some(f.id)),
            value: Set(format!("{} value", name)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        features.push(FeatureAssignment {
            feature_id: Some(f.id),
            value_id: Some(v.id),
        });
    }

    product_sync::replace_features(&db, p.id, &features[..2]).await.unwrap();
    let created = product_sync::replace_features(
        &db,
        p.id,
        &[
            features[2].clone(),
            FeatureAssignment {
                feature_id: features[0].feature_id,
                value_id: None,
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(created, 1);

    let rows = product_feature::Entity::find()
        .filter(product_feature::Column::ProductId.eq(p.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].feature_id, features[2].feature_id);
}

#[tokio::test]
async fn test_replace_tag_groups_and_image_edits() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Drills", None).await;
    let other = create_category(&db, "Garden", None).await;
    let p = create_product(&db, "Drill", &cat, None).await;
    let stranger = create_product(&db, "Rake", &other, None).await;

    let name = tag_name::ActiveModel {
        name: Set("Use".to_string()),
        category_id: Set(Some(cat.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    let t = tag::ActiveModel {
        name: Set("Pro".to_string()),
        category_id: Set(Some(cat.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let groups = [TagGroupAssignment {
        group_name_id: Some(name.id),
        tag_ids: vec![t.id, t.id],
    }];
    product_sync::replace_tag_groups(&db, p.id, &groups).await.unwrap();
    product_sync::replace_tag_groups(&db, p.id, &groups).await.unwrap();
    assert_eq!(
        product_tag_group::Entity::find()
            .filter(product_tag_group::Column::ProductId.eq(p.id))
            .count(&db)
            .await
            .unwrap(),
        1
    );
    assert_eq!(product_tag_group_tag::Entity::find().count(&db).await.unwrap(), 1);

    let mut images = Vec::new();
    for (owner, order) in [(p.id, 0), (p.id, 1), (stranger.id, 0)] {
        images.push(
            image::ActiveModel {
                product_id: Set(owner),
                image: Set(Some(format!("products/{}-{}.jpg", owner, order))),
                is_main: Set(false),
                sort_order: Set(order),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap(),
        );
    }

    product_sync::apply_image_edits(
        &db,
        p.id,
        &[
            ImageEdit {
                id: Some(images[0].id),
                delete: true,
                ..Default::default()
            },
            ImageEdit {
                id: Some(images[1].id),
                is_main: Some(true),
                order: Some(5),
                ..Default::default()
            },
            ImageEdit {
                id: Some(images[2].id),
                delete: true,
                ..Default::default()
            },
        ],
    )
    .await
    .unwrap();

    assert!(image::Entity::find_by_id(images[0].id).one(&db).await.unwrap().is_none());
    let edited = image::Entity::find_by_id(images[1].id).one(&db).await.unwrap().unwrap();
    assert!(edited.is_main);
    assert_eq!(edited.sort_order, 5);
    assert!(image::Entity::find_by_id(images[2].id).one(&db).await.unwrap().is_some());
}

#[tokio::test]
async fn test_scope_check_rejects_foreign_category() {
    let db = setup_test_db().await;
    let drills = create_category(&db, "Drills", None).await;
    let garden = create_category(&db, "Garden", None).await;
    let garden_feature = feature::ActiveModel {
        name: Set("Length".to_string()),
        category_id: Set(garden.id),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let result = product_sync::check_scope(
        &db,
        drills.id,
        &[FeatureAssignment {
            feature_id: Some(garden_feature.id),
            value_id: None,
        }],
        &[],
    )
    .await;
    assert!(matches!(result, Err(CatalogError::Scope { field: "features", .. })));

    assert!(product_sync::check_scope(&db, garden.id, &[], &[]).await.is_ok());
}

#[tokio::test]
async fn test_singletons_reject_second_insert() {
    let db = setup_test_db().await;

    let about = || about_content::ActiveModel {
        title: Set("About us".to_string()),
        content: Set("We sell tools".to_string()),
        ..Default::default()
    };
    about().insert(&db).await.expect("first row is allowed");
    let err = about().insert(&db).await.expect_err("second row must fail");
    assert!(matches!(
        CatalogError::from_singleton(err, "about_content"),
        CatalogError::SingletonExists("about_content")
    ));

    let contact = || contact_info::ActiveModel {
        phone: Set("+7 000 000-00-00".to_string()),
        email: Set("shop@example.com".to_string()),
        address: Set("Main street 1".to_string()),
        map_url: Set(None),
        ..Default::default()
    };
    let first = contact().insert(&db).await.expect("first row is allowed");
    assert!(contact().insert(&db).await.is_err());

    // Updating the existing row is still fine
    let mut active: contact_info::ActiveModel = first.into();
    active.phone = Set("+7 111 111-11-11".to_string());
    assert!(active.update(&db).await.is_ok());
}

#[tokio::test]
async fn test_category_delete_cascades() {
    let db = setup_test_db().await;
    let tools = create_category(&db, "Tools", None).await;
    let drills = create_category(&db, "Drills", Some(tools.id)).await;
    create_product(&db, "Drill", &drills, None).await;
    feature::ActiveModel {
        name: Set("Voltage".to_string()),
        category_id: Set(drills.id),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    tools.delete(&db).await.unwrap();

    assert_eq!(category::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(product::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(feature::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_brand_with_products_cannot_be_deleted() {
    let db = setup_test_db().await;
    let cat = create_category(&db, "Tools", None).await;
    let b = brand::ActiveModel {
        name: Set("Makita".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    let p = create_product(&db, "Saw", &cat, None).await;
    let mut active: product::ActiveModel = p.into();
    active.brand_id = Set(Some(b.id));
    active.update(&db).await.unwrap();

    assert!(b.clone().delete(&db).await.is_err());
    assert!(brand::Entity::find_by_id(b.id).one(&db).await.unwrap().is_some());
}
