//! Replace-all sync of a product's nested collections
//!
//! Admin product writes carry features and tag groups as complete lists:
//! the stored rows are deleted and recreated from the payload. Images are
//! the exception and are edited in place by id. Callers run these inside
//! one transaction together with the product row itself.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{
    feature, feature_value, image, product_feature, product_tag_group, product_tag_group_tag,
    tag, tag_name,
};
use crate::error::CatalogError;

/// One feature row of an admin payload; rows missing either id are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAssignment {
    #[serde(default)]
    pub feature_id: Option<i32>,
    #[serde(default)]
    pub value_id: Option<i32>,
}

/// One tag group of an admin payload; groups without a name are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroupAssignment {
    #[serde(default)]
    pub group_name_id: Option<i32>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

/// In-place edit of an existing product image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEdit {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub is_main: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default, rename = "_delete")]
    pub delete: bool,
}

/// Replace every feature row of `product_id`
pub async fn replace_features<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    features: &[FeatureAssignment],
) -> Result<usize, DbErr> {
    let removed = product_feature::Entity::delete_many()
        .filter(product_feature::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;

    let mut created = 0;
    for assignment in features {
        let (Some(feature_id), Some(value_id)) = (assignment.feature_id, assignment.value_id)
        else {
            continue;
        };
        product_feature::ActiveModel {
            product_id: Set(product_id),
            feature_id: Set(Some(feature_id)),
            value_id: Set(Some(value_id)),
            ..Default::default()
        }
        .insert(db)
        .await?;
        created += 1;
    }

    debug!(
        "Product {} features replaced: {} removed, {} created",
        product_id, removed.rows_affected, created
    );
    Ok(created)
}

/// Replace every tag group of `product_id`
pub async fn replace_tag_groups<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    groups: &[TagGroupAssignment],
) -> Result<usize, DbErr> {
    // Link rows go with their group through the cascade.
    let removed = product_tag_group::Entity::delete_many()
        .filter(product_tag_group::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;

    let mut created = 0;
    for assignment in groups {
        let Some(group_name_id) = assignment.group_name_id else {
            continue;
        };
        let group = product_tag_group::ActiveModel {
            product_id: Set(product_id),
            group_name_id: Set(Some(group_name_id)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let mut tag_ids = assignment.tag_ids.clone();
        tag_ids.sort_unstable();
        tag_ids.dedup();
        for tag_id in tag_ids {
            product_tag_group_tag::ActiveModel {
                product_tag_group_id: Set(group.id),
                tag_id: Set(tag_id),
            }
            .insert(db)
            .await?;
        }
        created += 1;
    }

    debug!(
        "Product {} tag groups replaced: {} removed, {} created",
        product_id, removed.rows_affected, created
    );
    Ok(created)
}

/// Stored features and tag groups of `product_id`, in payload form
pub async fn stored_assignments<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
) -> Result<(Vec<FeatureAssignment>, Vec<TagGroupAssignment>), DbErr> {
    let features = product_feature::Entity::find()
        .filter(product_feature::Column::ProductId.eq(product_id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| FeatureAssignment {
            feature_id: row.feature_id,
            value_id: row.value_id,
        })
        .collect();

    let groups = product_tag_group::Entity::find()
        .filter(product_tag_group::Column::ProductId.eq(product_id))
        .all(db)
        .await?;
    let mut assignments = Vec::with_capacity(groups.len());
    for group in groups {
        let tag_ids = group
            .find_related(product_tag_group_tag::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();
        assignments.push(TagGroupAssignment {
            group_name_id: group.group_name_id,
            tag_ids,
        });
    }

    Ok((features, assignments))
}

/// Apply ordering/main-flag edits and deletions to images of `product_id`.
/// Edits naming an image of another product, or no image at all, are ignored.
pub async fn apply_image_edits<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    edits: &[ImageEdit],
) -> Result<(), DbErr> {
    for edit in edits {
        let Some(id) = edit.id else { continue };
        let Some(existing) = image::Entity::find_by_id(id)
            .filter(image::Column::ProductId.eq(product_id))
            .one(db)
            .await?
        else {
            continue;
        };

        if edit.delete {
            existing.delete(db).await?;
            continue;
        }

        let mut active: image::ActiveModel = existing.into();
        if let Some(is_main) = edit.is_main {
            active.is_main = Set(is_main);
        }
        if let Some(order) = edit.order {
            active.sort_order = Set(order);
        }
        if active.is_changed() {
            active.update(db).await?;
        }
    }
    Ok(())
}

/// Check that features, values, tag names and tags all belong to `category_id`.
///
/// Unknown ids are left to the foreign keys.
pub async fn check_scope<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
    features: &[FeatureAssignment],
    groups: &[TagGroupAssignment],
) -> Result<(), CatalogError> {
    let feature_ids: Vec<i32> = features.iter().filter_map(|f| f.feature_id).collect();
    if !feature_ids.is_empty() {
        let found = feature::Entity::find()
            .filter(feature::Column::Id.is_in(feature_ids))
            .all(db)
            .await?;
        if let Some(stray) = found.iter().find(|f| f.category_id != category_id) {
            return Err(scope_error(
                "features",
                format!("Feature {} belongs to another category", stray.id),
            ));
        }
    }

    let value_ids: Vec<i32> = features
        .iter()
        .filter(|f| f.feature_id.is_some())
        .filter_map(|f| f.value_id)
        .collect();
    if !value_ids.is_empty() {
        let values: HashMap<i32, feature_value::Model> = feature_value::Entity::find()
            .filter(feature_value::Column::Id.is_in(value_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        for assignment in features {
            let (Some(feature_id), Some(value_id)) = (assignment.feature_id, assignment.value_id)
            else {
                continue;
            };
            let Some(value) = values.get(&value_id) else {
                continue;
            };
            if value.feature_id.is_some_and(|f| f != feature_id) {
                return Err(scope_error(
                    "features",
                    format!("Value {} is not a value of feature {}", value_id, feature_id),
                ));
            }
            if value.category_id.is_some_and(|c| c != category_id) {
                return Err(scope_error(
                    "features",
                    format!("Value {} belongs to another category", value_id),
                ));
            }
        }
    }

    let name_ids: Vec<i32> = groups.iter().filter_map(|g| g.group_name_id).collect();
    if !name_ids.is_empty() {
        let names = tag_name::Entity::find()
            .filter(tag_name::Column::Id.is_in(name_ids))
            .all(db)
            .await?;
        if let Some(stray) = names
            .iter()
            .find(|n| n.category_id.is_some_and(|c| c != category_id))
        {
            return Err(scope_error(
                "tag_groups",
                format!("Tag group name {} belongs to another category", stray.id),
            ));
        }
    }

    let tag_ids: Vec<i32> = groups
        .iter()
        .filter(|g| g.group_name_id.is_some())
        .flat_map(|g| g.tag_ids.iter().copied())
        .collect();
    if !tag_ids.is_empty() {
        let tags = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .all(db)
            .await?;
        if let Some(stray) = tags
            .iter()
            .find(|t| t.category_id.is_some_and(|c| c != category_id))
        {
            return Err(scope_error(
                "tag_groups",
                format!("Tag {} belongs to another category", stray.id),
            ));
        }
    }

    Ok(())
}

fn scope_error(field: &'static str, message: String) -> CatalogError {
    CatalogError::Scope { field, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes() {
        let edits: Vec<ImageEdit> =
            serde_json::from_str(r#"[{"id": 3, "order": 2}, {"id": 4, "_delete": true}]"#)
                .unwrap();
        assert_eq!(edits[0].order, Some(2));
        assert!(!edits[0].delete);
        assert!(edits[1].delete);

        let groups: Vec<TagGroupAssignment> =
            serde_json::from_str(r#"[{"group_name_id": 1, "tag_ids": [2, 3]}, {}]"#).unwrap();
        assert_eq!(groups[0].tag_ids, vec![2, 3]);
        assert_eq!(groups[1].group_name_id, None);

        let features: Vec<FeatureAssignment> =
            serde_json::from_str(r#"[{"feature_id": 1, "value_id": null}]"#).unwrap();
        assert_eq!(features[0].value_id, None);
    }
}
