//! Lookups used by product editors: which features, tags and values a
//! category offers.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    Json,
};
use catalog_db::entities::{feature, feature_value, tag, tag_name};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::error::{db_error, ApiResult};
use crate::models::{CategoryVocabulary, FeatureValueFacet, FeatureValueItem, IdName};
use crate::query::{id_param, Params};
use crate::AppState;

/// Features, tags, tag names and feature values of one category
#[utoipa::path(
    get,
    path = "/api/features-tags-by-category",
    params(
        ("category" = Option<i32>, Query, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category vocabulary", body = CategoryVocabulary)
    ),
    tag = "vocabulary"
)]
pub async fn features_tags_by_category(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<CategoryVocabulary>> {
    let Some(category_id) = id_param(&params, "category") else {
        return Ok(Json(CategoryVocabulary {
            features: Vec::new(),
            tags: Vec::new(),
            tag_names: Vec::new(),
            feature_values: Vec::new(),
        }));
    };
    debug!("Getting vocabulary of category {}", category_id);

    let db = &state.db;
    let features = feature::Entity::find()
        .filter(feature::Column::CategoryId.eq(category_id))
        .order_by_asc(feature::Column::Name)
        .all(db)
        .await
        .map_err(db_error)?;
    let tags = tag::Entity::find()
        .filter(tag::Column::CategoryId.eq(category_id))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
        .map_err(db_error)?;
    let tag_names = tag_name::Entity::find()
        .filter(tag_name::Column::CategoryId.eq(category_id))
        .order_by_asc(tag_name::Column::Name)
        .all(db)
        .await
        .map_err(db_error)?;
    let values = feature_value::Entity::find()
        .filter(feature_value::Column::CategoryId.eq(category_id))
        .order_by_asc(feature_value::Column::Value)
        .all(db)
        .await
        .map_err(db_error)?;

    // Values may point at features of other categories
    let feature_names: HashMap<i32, String> = feature::Entity::find()
        .filter(feature::Column::Id.is_in(values.iter().filter_map(|v| v.feature_id)))
        .all(db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|f| (f.id, f.name))
        .collect();

    Ok(Json(CategoryVocabulary {
        features: features
            .into_iter()
            .map(|f| IdName { id: f.id, name: f.name })
            .collect(),
        tags: tags
            .into_iter()
            .map(|t| IdName { id: t.id, name: t.name })
            .collect(),
        tag_names: tag_names
            .into_iter()
            .map(|n| IdName { id: n.id, name: n.name })
            .collect(),
        feature_values: values
            .into_iter()
            .map(|v| FeatureValueFacet {
                feature_name: v.feature_id.and_then(|id| feature_names.get(&id).cloned()),
                id: v.id,
                value: v.value,
                feature_id: v.feature_id,
            })
            .collect(),
    }))
}

/// Values of one feature
#[utoipa::path(
    get,
    path = "/api/feature-values-by-feature",
    params(
        ("feature" = Option<i32>, Query, description = "Feature id")
    ),
    responses(
        (status = 200, description = "Feature values", body = Vec<FeatureValueItem>)
    ),
    tag = "vocabulary"
)]
pub async fn feature_values_by_feature(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<FeatureValueItem>>> {
    let Some(feature_id) = id_param(&params, "feature") else {
        return Ok(Json(Vec::new()));
    };
    debug!("Listing values of feature {}", feature_id);

    let values = feature_value::Entity::find()
        .filter(feature_value::Column::FeatureId.eq(feature_id))
        .order_by_asc(feature_value::Column::Value)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(
        values
            .into_iter()
            .map(|v| FeatureValueItem {
                id: v.id,
                value: v.value,
            })
            .collect(),
    ))
}
