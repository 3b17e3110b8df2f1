//! Product create/update shared by the public and admin endpoints
//!
//! Scalar fields are applied when present in the payload. Features and tag
//! groups, when present, replace the stored rows; image edits are applied in
//! place. Everything runs in one transaction so a failed SKU generation or
//! scope check leaves no partial writes.

use catalog_db::entities::{brand, category, product};
use catalog_db::product_sync::{
    apply_image_edits, check_scope, replace_features, replace_tag_groups, stored_assignments,
    FeatureAssignment, ImageEdit, TagGroupAssignment,
};
use catalog_db::sku::{random_suffix, save_product};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tracing::info;

use crate::error::{catalog_error, db_error, ApiResult, FieldErrors};
use crate::models::{AdminProductRequest, FeatureInput, ProductWriteRequest};

const NAME_MAX_LEN: usize = 200;
const SKU_MAX_LEN: usize = 100;
const PRICE_DECIMAL_PLACES: u32 = 2;

/// Payload keys for the two references, which differ between surfaces
#[derive(Debug, Clone, Copy)]
pub struct FieldNames {
    pub category: &'static str,
    pub brand: &'static str,
}

pub const PUBLIC_FIELDS: FieldNames = FieldNames {
    category: "category_id",
    brand: "brand_id",
};

pub const ADMIN_FIELDS: FieldNames = FieldNames {
    category: "category",
    brand: "brand",
};

/// Requested changes to a product; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<Option<String>>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub brand_id: Option<Option<i32>>,
    pub price: Option<Option<Decimal>>,
    pub is_available: Option<bool>,
    pub manufacturer_sku: Option<Option<String>>,
    pub internal_sku: Option<Option<String>>,
    pub features: Option<Vec<FeatureAssignment>>,
    pub tag_groups: Option<Vec<TagGroupAssignment>>,
    pub images: Option<Vec<ImageEdit>>,
}

fn feature_assignments(inputs: Vec<FeatureInput>) -> Vec<FeatureAssignment> {
    inputs
        .into_iter()
        .map(|f| FeatureAssignment {
            feature_id: f.feature_id,
            value_id: f.value_id,
        })
        .collect()
}

impl From<ProductWriteRequest> for ProductChanges {
    fn from(req: ProductWriteRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug.map(Some),
            description: req.description,
            category_id: req.category_id,
            brand_id: req.brand_id,
            price: req.price,
            is_available: req.is_available,
            manufacturer_sku: req.manufacturer_sku,
            internal_sku: req.internal_sku.map(Some),
            features: req.features.map(feature_assignments),
            tag_groups: None,
            images: None,
        }
    }
}

impl From<AdminProductRequest> for ProductChanges {
    fn from(req: AdminProductRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
            category_id: req.category,
            brand_id: req.brand,
            price: req.price,
            is_available: req.is_available,
            manufacturer_sku: req.manufacturer_sku,
            internal_sku: req.internal_sku,
            features: req.features.map(feature_assignments),
            tag_groups: req.tag_groups.map(|groups| {
                groups
                    .into_iter()
                    .map(|g| TagGroupAssignment {
                        group_name_id: g.group_name_id,
                        tag_ids: g.tag_ids,
                    })
                    .collect()
            }),
            images: req.images.map(|edits| {
                edits
                    .into_iter()
                    .map(|e| ImageEdit {
                        id: e.id,
                        is_main: e.is_main,
                        order: e.order,
                        delete: e.delete,
                    })
                    .collect()
            }),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate `changes` against `existing` (None when creating) and return
/// the category the product will belong to.
pub async fn validate(
    db: &DatabaseConnection,
    changes: &ProductChanges,
    existing: Option<&product::Model>,
    names: FieldNames,
) -> ApiResult<category::Model> {
    let mut errors = FieldErrors::new();
    let creating = existing.is_none();

    if creating {
        errors.require("name", changes.name.as_deref());
    } else {
        errors.not_blank("name", changes.name.as_deref());
    }
    errors.max_len("name", changes.name.as_deref(), NAME_MAX_LEN);
    errors.max_len(
        "slug",
        changes.slug.as_ref().and_then(|s| s.as_deref()),
        product::SLUG_MAX_LEN,
    );
    errors.max_len(
        "manufacturer_sku",
        changes.manufacturer_sku.as_ref().and_then(|s| s.as_deref()),
        SKU_MAX_LEN,
    );
    errors.max_len(
        "internal_sku",
        changes.internal_sku.as_ref().and_then(|s| s.as_deref()),
        SKU_MAX_LEN,
    );

    if let Some(Some(price)) = changes.price {
        if price.normalize().scale() > PRICE_DECIMAL_PLACES {
            errors.add(
                "price",
                format!(
                    "Ensure that there are no more than {} decimal places.",
                    PRICE_DECIMAL_PLACES
                ),
            );
        }
    }

    let category_id = changes
        .category_id
        .or_else(|| existing.map(|p| p.category_id));
    let category = match category_id {
        Some(id) => {
            let found = category::Entity::find_by_id(id)
                .one(db)
                .await
                .map_err(db_error)?;
            if found.is_none() {
                errors.missing_ref(names.category, id);
            }
            found
        }
        None => {
            errors.add(names.category, crate::error::REQUIRED);
            None
        }
    };

    if let Some(Some(brand_id)) = changes.brand_id {
        let found = brand::Entity::find_by_id(brand_id)
            .one(db)
            .await
            .map_err(db_error)?;
        if found.is_none() {
            errors.missing_ref(names.brand, brand_id);
        }
    }

    errors.into_result()?;
    category.ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.add(names.category, crate::error::REQUIRED);
        errors.into_error()
    })
}

/// Create (`existing == None`) or update a product with its nested rows
pub async fn save(
    db: &DatabaseConnection,
    existing: Option<product::Model>,
    changes: ProductChanges,
    category: &category::Model,
) -> ApiResult<product::Model> {
    let txn = db.begin().await.map_err(db_error)?;

    // A move to another category re-checks the stored rows the payload keeps.
    let mut scoped_features = changes.features.clone();
    let mut scoped_groups = changes.tag_groups.clone();
    if let Some(model) = existing.as_ref().filter(|m| m.category_id != category.id) {
        if scoped_features.is_none() || scoped_groups.is_none() {
            let (features, groups) = stored_assignments(&txn, model.id)
                .await
                .map_err(db_error)?;
            scoped_features.get_or_insert(features);
            scoped_groups.get_or_insert(groups);
        }
    }
    check_scope(
        &txn,
        category.id,
        scoped_features.as_deref().unwrap_or_default(),
        scoped_groups.as_deref().unwrap_or_default(),
    )
    .await
    .map_err(catalog_error)?;

    let creating = existing.is_none();
    let mut active: product::ActiveModel = match existing {
        Some(model) => model.into(),
        None => product::ActiveModel {
            description: Set(String::new()),
            ..Default::default()
        },
    };

    if let Some(name) = changes.name {
        active.name = Set(name.trim().to_string());
    }
    match changes.slug {
        Some(Some(slug)) if !slug.trim().is_empty() => active.slug = Set(slug.trim().to_string()),
        // A blank slug on create is derived from the name; on update it keeps the old one.
        _ if creating => active.slug = Set(String::new()),
        _ => {}
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    active.category_id = Set(category.id);
    if let Some(brand_id) = changes.brand_id {
        active.brand_id = Set(brand_id);
    }
    if let Some(price) = changes.price {
        active.price = Set(price);
    }
    if let Some(is_available) = changes.is_available {
        active.is_available = Set(is_available);
    }
    if let Some(sku) = changes.manufacturer_sku {
        active.manufacturer_sku = Set(blank_to_none(sku));
    }
    match changes.internal_sku.map(blank_to_none) {
        Some(Some(sku)) => active.internal_sku = Set(Some(sku)),
        _ if creating => active.internal_sku = Set(None),
        _ => {}
    }

    let saved = save_product(&txn, active, Some(&category.slug), random_suffix)
        .await
        .map_err(catalog_error)?;

    if let Some(features) = &changes.features {
        replace_features(&txn, saved.id, features)
            .await
            .map_err(db_error)?;
    }
    if let Some(groups) = &changes.tag_groups {
        replace_tag_groups(&txn, saved.id, groups)
            .await
            .map_err(db_error)?;
    }
    if let Some(edits) = &changes.images {
        apply_image_edits(&txn, saved.id, edits)
            .await
            .map_err(db_error)?;
    }

    txn.commit().await.map_err(db_error)?;

    info!(
        "{} product {} ({})",
        if creating { "Created" } else { "Updated" },
        saved.id,
        saved.internal_sku.as_deref().unwrap_or("-")
    );
    Ok(saved)
}
