use std::{cmp::Reverse, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use catalog_db::category_tree::CategoryForest;
use catalog_db::entities::{brand, category, product};
use catalog_db::product_filter::icontains;
use sea_orm::sea_query::{Condition, Expr, Query as SqlQuery, SelectStatement};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::debug;

use crate::assemble::{brand_item, tag_facets, tree_node};
use crate::error::{db_error, not_found, ApiResult, ErrorResponse, Missing};
use crate::models::{BrandItem, CategoryTreeNode, ProductListItem, TagGroupFacet};
use crate::pagination::{Page, PageRequest};
use crate::query::{param, parse_decimal, Params};
use crate::AppState;

use super::products::list_products_page;

/// Sort orders of the brand listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrandOrdering {
    NameAsc,
    NameDesc,
    CountAsc,
    CountDesc,
    Newest,
}

impl BrandOrdering {
    fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("name") => Self::NameAsc,
            Some("-name") => Self::NameDesc,
            Some("products_count") => Self::CountAsc,
            Some("-products_count") => Self::CountDesc,
            _ => Self::Newest,
        }
    }
}

pub(crate) async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> ApiResult<brand::Model> {
    brand::Entity::find()
        .filter(brand::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Brand))
}

/// Number of products per brand id
pub(crate) async fn product_counts(db: &DatabaseConnection) -> Result<HashMap<i32, u64>, sea_orm::DbErr> {
    let rows: Vec<(Option<i32>, i64)> = product::Entity::find()
        .select_only()
        .column(product::Column::BrandId)
        .column_as(Expr::col(product::Column::Id).count(), "products_count")
        .filter(product::Column::BrandId.is_not_null())
        .group_by(product::Column::BrandId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count.max(0) as u64)))
        .collect())
}

/// `SELECT brand_id FROM products WHERE <cond>`
fn brands_with_products(cond: Condition) -> SelectStatement {
    SqlQuery::select()
        .column(product::Column::BrandId)
        .from(product::Entity)
        .and_where(product::Column::BrandId.is_not_null())
        .cond_where(cond)
        .to_owned()
}

/// List brands
#[utoipa::path(
    get,
    path = "/api/brands",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("search" = Option<String>, Query, description = "Substring of name or description"),
        ("category" = Option<String>, Query, description = "Slug of a category the brand has products in"),
        ("has_products" = Option<String>, Query, description = "Only brands with products"),
        ("price_min" = Option<String>, Query, description = "Brand has a product at or above this price"),
        ("price_max" = Option<String>, Query, description = "Brand has a product at or below this price"),
        ("has_available" = Option<String>, Query, description = "Only brands with an available product"),
        ("ordering" = Option<String>, Query, description = "name, -name, products_count, -products_count")
    ),
    responses(
        (status = 200, description = "Brands", body = Page<BrandItem>),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn list_brands(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Page<BrandItem>>> {
    debug!("Listing brands");

    let request = PageRequest::from_params(&params)?;
    let mut query = brand::Entity::find();

    if let Some(term) = param(&params, "search") {
        query = query.filter(
            Condition::any()
                .add(icontains(brand::Entity, brand::Column::Name, term))
                .add(icontains(brand::Entity, brand::Column::Description, term)),
        );
    }
    if let Some(slug) = param(&params, "category") {
        let in_category = SqlQuery::select()
            .column(category::Column::Id)
            .from(category::Entity)
            .and_where(category::Column::Slug.eq(slug))
            .to_owned();
        query = query.filter(brand::Column::Id.in_subquery(brands_with_products(
            Condition::all().add(product::Column::CategoryId.in_subquery(in_category)),
        )));
    }
    if param(&params, "has_products").is_some() {
        query = query.filter(brand::Column::Id.in_subquery(brands_with_products(Condition::all())));
    }
    if let Some(min) = param(&params, "price_min").and_then(parse_decimal) {
        query = query.filter(brand::Column::Id.in_subquery(brands_with_products(
            Condition::all().add(product::Column::Price.gte(min)),
        )));
    }
    if let Some(max) = param(&params, "price_max").and_then(parse_decimal) {
        query = query.filter(brand::Column::Id.in_subquery(brands_with_products(
            Condition::all().add(product::Column::Price.lte(max)),
        )));
    }
    if param(&params, "has_available").is_some() {
        query = query.filter(brand::Column::Id.in_subquery(brands_with_products(
            Condition::all().add(product::Column::IsAvailable.eq(true)),
        )));
    }

    let ordering = BrandOrdering::from_param(param(&params, "ordering"));
    query = match ordering {
        BrandOrdering::NameAsc => query.order_by_asc(brand::Column::Name),
        BrandOrdering::NameDesc => query.order_by_desc(brand::Column::Name),
        _ => query
            .order_by_desc(brand::Column::CreatedAt)
            .order_by_desc(brand::Column::Id),
    };

    let brands = query.all(&state.db).await.map_err(db_error)?;
    let counts = product_counts(&state.db).await.map_err(db_error)?;
    let mut rows: Vec<(brand::Model, u64)> = brands
        .into_iter()
        .map(|b| {
            let count = counts.get(&b.id).copied().unwrap_or(0);
            (b, count)
        })
        .collect();

    // Stable sorts keep the newest-first order among equal counts.
    match ordering {
        BrandOrdering::CountAsc => rows.sort_by_key(|(_, count)| *count),
        BrandOrdering::CountDesc => rows.sort_by_key(|(_, count)| Reverse(*count)),
        _ => {}
    }

    let page = request.slice(rows)?;
    Ok(Json(
        page.map(|(b, count)| brand_item(b, Some(count), &state.media)),
    ))
}

/// Get a brand by slug
#[utoipa::path(
    get,
    path = "/api/brands/{slug}",
    params(
        ("slug" = String, Path, description = "Brand slug")
    ),
    responses(
        (status = 200, description = "Brand", body = BrandItem),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn get_brand(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BrandItem>> {
    debug!("Getting brand: {}", slug);

    let brand = find_by_slug(&state.db, &slug).await?;
    let count = product::Entity::find()
        .filter(product::Column::BrandId.eq(brand.id))
        .count(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(brand_item(brand, Some(count), &state.media)))
}

/// Products of a brand
#[utoipa::path(
    get,
    path = "/api/brands/{slug}/products",
    params(
        ("slug" = String, Path, description = "Brand slug"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Products", body = Page<ProductListItem>),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn brand_products(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Page<ProductListItem>>> {
    debug!("Listing products of brand: {}", slug);

    let brand = find_by_slug(&state.db, &slug).await?;
    let base = product::Entity::find().filter(product::Column::BrandId.eq(brand.id));

    list_products_page(&state, base, &params).await.map(Json)
}

/// Categories that hold products of a brand
#[utoipa::path(
    get,
    path = "/api/brands/{slug}/categories",
    params(
        ("slug" = String, Path, description = "Brand slug")
    ),
    responses(
        (status = 200, description = "Categories", body = Vec<CategoryTreeNode>),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn brand_categories(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<CategoryTreeNode>>> {
    debug!("Listing categories of brand: {}", slug);

    let brand = find_by_slug(&state.db, &slug).await?;
    let category_ids: Vec<i32> = product::Entity::find()
        .select_only()
        .column(product::Column::CategoryId)
        .filter(product::Column::BrandId.eq(brand.id))
        .distinct()
        .into_tuple()
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let forest = CategoryForest::load(&state.db).await.map_err(db_error)?;
    let mut nodes: Vec<CategoryTreeNode> = category_ids
        .into_iter()
        .filter_map(|id| forest.node(id))
        .map(|node| tree_node(node, &state.media))
        .collect();
    nodes.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(nodes))
}

/// Tags used by a brand's products, grouped by tag name
#[utoipa::path(
    get,
    path = "/api/brands/{slug}/tags",
    params(
        ("slug" = String, Path, description = "Brand slug")
    ),
    responses(
        (status = 200, description = "Grouped tags", body = Vec<TagGroupFacet>),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn brand_tags(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<TagGroupFacet>>> {
    debug!("Listing tags of brand: {}", slug);

    let brand = find_by_slug(&state.db, &slug).await?;
    let products = SqlQuery::select()
        .column(product::Column::Id)
        .from(product::Entity)
        .and_where(product::Column::BrandId.eq(brand.id))
        .to_owned();

    tag_facets(&state.db, products)
        .await
        .map(Json)
        .map_err(db_error)
}
