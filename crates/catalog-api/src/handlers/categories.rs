use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use catalog_db::category_tree::{self, CategoryForest};
use catalog_db::entities::{brand, category, product};
use sea_orm::sea_query::Query as SqlQuery;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use crate::assemble::{brand_item, tag_facets, tree_node};
use crate::error::{db_error, not_found, ApiResult, ErrorResponse, Missing};
use crate::models::{BrandItem, CategoryTreeNode, ProductListItem, TagGroupFacet};
use crate::pagination::{parse_limit, Page};
use crate::AppState;

use super::products::list_products_page;

pub(crate) async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> ApiResult<category::Model> {
    category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Category))
}

/// Root categories with their subtrees
#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("limit" = Option<u64>, Query, description = "Return at most this many roots")
    ),
    responses(
        (status = 200, description = "Category forest", body = Vec<CategoryTreeNode>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<CategoryTreeNode>>> {
    debug!("Listing category tree");

    let forest = CategoryForest::load(&state.db).await.map_err(db_error)?;
    let mut roots = forest.roots();
    if let Some(limit) = parse_limit(&params) {
        roots.truncate(limit as usize);
    }

    Ok(Json(
        roots
            .into_iter()
            .map(|node| tree_node(node, &state.media))
            .collect(),
    ))
}

/// One category with its subtree
#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category", body = CategoryTreeNode),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<CategoryTreeNode>> {
    debug!("Getting category: {}", slug);

    let category = find_by_slug(&state.db, &slug).await?;
    let forest = CategoryForest::load(&state.db).await.map_err(db_error)?;
    let node = forest
        .node(category.id)
        .ok_or_else(|| not_found(Missing::Category))?;

    Ok(Json(tree_node(node, &state.media)))
}

/// Products of a category and all its descendants
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/products",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Products", body = Page<ProductListItem>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn category_products(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<ProductListItem>>> {
    debug!("Listing products of category: {}", slug);

    let category = find_by_slug(&state.db, &slug).await?;
    let base = category_tree::subtree_products(&state.db, category.id)
        .await
        .map_err(db_error)?;

    list_products_page(&state, base, &params).await.map(Json)
}

/// Brands that have products anywhere under a category
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/brands",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Brands", body = Vec<BrandItem>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn category_brands(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<BrandItem>>> {
    debug!("Listing brands of category: {}", slug);

    let category = find_by_slug(&state.db, &slug).await?;
    let ids = category_tree::subtree_ids(&state.db, category.id)
        .await
        .map_err(db_error)?;

    let brand_ids: Vec<Option<i32>> = product::Entity::find()
        .select_only()
        .column(product::Column::BrandId)
        .filter(product::Column::CategoryId.is_in(ids))
        .filter(product::Column::BrandId.is_not_null())
        .distinct()
        .into_tuple()
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let brands = brand::Entity::find()
        .filter(brand::Column::Id.is_in(brand_ids.into_iter().flatten()))
        .order_by_asc(brand::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(
        brands
            .into_iter()
            .map(|b| brand_item(b, None, &state.media))
            .collect(),
    ))
}

/// Tags used by products under a category, grouped by tag name
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/tags",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Grouped tags", body = Vec<TagGroupFacet>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn category_tags(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<TagGroupFacet>>> {
    debug!("Listing tags of category: {}", slug);

    let category = find_by_slug(&state.db, &slug).await?;
    let ids = category_tree::subtree_ids(&state.db, category.id)
        .await
        .map_err(db_error)?;

    let products = SqlQuery::select()
        .column(product::Column::Id)
        .from(product::Entity)
        .and_where(product::Column::CategoryId.is_in(ids))
        .to_owned();

    tag_facets(&state.db, products)
        .await
        .map(Json)
        .map_err(db_error)
}
