//! Response assembly for products and categories
//!
//! Listings load each related table once for the whole page and stitch the
//! rows together in memory.

use std::collections::{BTreeMap, HashMap, HashSet};

use catalog_db::category_tree::{CategoryForest, CategoryNode};
use catalog_db::entities::{
    brand, feature, feature_value, image, product, product_feature, product_tag_group,
    product_tag_group_tag, tag, tag_name,
};
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::media::MediaStore;
use crate::models::{
    AdminProduct, AdminProductFeature, AdminProductTagGroup, BrandItem, CategoryTreeNode,
    ImageItem, ProductDetail, ProductFeatureItem, ProductListItem, ProductTagGroupItem,
    TagGroupFacet, TagItem,
};

pub fn tree_node(node: CategoryNode, media: &MediaStore) -> CategoryTreeNode {
    CategoryTreeNode {
        id: node.category.id,
        name: node.category.name,
        slug: node.category.slug,
        image: media.url_opt(node.category.image.as_deref()),
        parent: node.category.parent_id,
        children: node
            .children
            .into_iter()
            .map(|child| tree_node(child, media))
            .collect(),
        products_count: node.products_count,
    }
}

pub fn brand_item(model: brand::Model, products_count: Option<u64>, media: &MediaStore) -> BrandItem {
    BrandItem {
        id: model.id,
        image: media.url_opt(model.logo.as_deref()),
        name: model.name,
        slug: model.slug,
        description: model.description,
        products_count,
    }
}

pub fn image_item(model: &image::Model, media: &MediaStore) -> ImageItem {
    ImageItem {
        id: model.id,
        image: media.url_opt(model.image.as_deref()),
        is_main: model.is_main,
        order: model.sort_order,
    }
}

pub fn tag_item(model: &tag::Model) -> TagItem {
    TagItem {
        id: model.id,
        name: model.name.clone(),
        slug: model.slug.clone(),
    }
}

/// Main image if one is flagged, else the first by order
fn main_image(images: &[image::Model]) -> Option<&image::Model> {
    images.iter().find(|i| i.is_main).or_else(|| images.first())
}

struct LoadedFeature {
    row: product_feature::Model,
    feature_name: Option<String>,
    value_text: Option<String>,
}

struct LoadedTagGroup {
    group: product_tag_group::Model,
    group_name: Option<String>,
    tags: Vec<tag::Model>,
}

/// Rows attached to a set of products
#[derive(Default)]
pub struct ProductRelations {
    images: HashMap<i32, Vec<image::Model>>,
    features: HashMap<i32, Vec<LoadedFeature>>,
    tag_groups: HashMap<i32, Vec<LoadedTagGroup>>,
    brands: HashMap<i32, brand::Model>,
}

impl ProductRelations {
    pub async fn load<C: ConnectionTrait>(db: &C, products: &[product::Model]) -> Result<Self, DbErr> {
        if products.is_empty() {
            return Ok(Self::default());
        }
        let ids: Vec<i32> = products.iter().map(|p| p.id).collect();

        let mut images: HashMap<i32, Vec<image::Model>> = HashMap::new();
        for row in image::Entity::find()
            .filter(image::Column::ProductId.is_in(ids.clone()))
            .order_by_asc(image::Column::SortOrder)
            .order_by_asc(image::Column::Id)
            .all(db)
            .await?
        {
            images.entry(row.product_id).or_default().push(row);
        }

        let feature_rows = product_feature::Entity::find()
            .filter(product_feature::Column::ProductId.is_in(ids.clone()))
            .order_by_asc(product_feature::Column::Id)
            .all(db)
            .await?;
        let feature_names: HashMap<i32, String> = feature::Entity::find()
            .filter(feature::Column::Id.is_in(feature_rows.iter().filter_map(|r| r.feature_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect();
        let value_texts: HashMap<i32, String> = feature_value::Entity::find()
            .filter(feature_value::Column::Id.is_in(feature_rows.iter().filter_map(|r| r.value_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|v| (v.id, v.value))
            .collect();
        let mut features: HashMap<i32, Vec<LoadedFeature>> = HashMap::new();
        for row in feature_rows {
            let feature_name = row.feature_id.and_then(|id| feature_names.get(&id).cloned());
            let value_text = row.value_id.and_then(|id| value_texts.get(&id).cloned());
            features.entry(row.product_id).or_default().push(LoadedFeature {
                row,
                feature_name,
                value_text,
            });
        }

        let groups = product_tag_group::Entity::find()
            .filter(product_tag_group::Column::ProductId.is_in(ids.clone()))
            .order_by_asc(product_tag_group::Column::Id)
            .all(db)
            .await?;
        let links = product_tag_group_tag::Entity::find()
            .filter(
                product_tag_group_tag::Column::ProductTagGroupId
                    .is_in(groups.iter().map(|g| g.id)),
            )
            .all(db)
            .await?;
        let tags: HashMap<i32, tag::Model> = tag::Entity::find()
            .filter(tag::Column::Id.is_in(links.iter().map(|l| l.tag_id)))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let names: HashMap<i32, String> = tag_name::Entity::find()
            .filter(tag_name::Column::Id.is_in(groups.iter().filter_map(|g| g.group_name_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|n| (n.id, n.name))
            .collect();
        let mut tags_by_group: HashMap<i32, Vec<tag::Model>> = HashMap::new();
        for link in links {
            if let Some(tag) = tags.get(&link.tag_id) {
                tags_by_group
                    .entry(link.product_tag_group_id)
                    .or_default()
                    .push(tag.clone());
            }
        }
        let mut tag_groups: HashMap<i32, Vec<LoadedTagGroup>> = HashMap::new();
        for group in groups {
            let mut group_tags = tags_by_group.remove(&group.id).unwrap_or_default();
            group_tags.sort_by(|a, b| a.name.cmp(&b.name));
            let group_name = group.group_name_id.and_then(|id| names.get(&id).cloned());
            tag_groups.entry(group.product_id).or_default().push(LoadedTagGroup {
                group,
                group_name,
                tags: group_tags,
            });
        }

        let brands = brand::Entity::find()
            .filter(brand::Column::Id.is_in(products.iter().filter_map(|p| p.brand_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        Ok(Self {
            images,
            features,
            tag_groups,
            brands,
        })
    }

    fn images_of(&self, product_id: i32) -> &[image::Model] {
        self.images.get(&product_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn features_of(&self, product_id: i32) -> Vec<ProductFeatureItem> {
        self.features
            .get(&product_id)
            .into_iter()
            .flatten()
            .map(|f| ProductFeatureItem {
                id: f.row.id,
                feature_name: f.feature_name.clone(),
                feature_id: f.row.feature_id,
                value_id: f.row.value_id,
                value_name: f.value_text.clone(),
            })
            .collect()
    }

    fn groups_of(&self, product_id: i32) -> &[LoadedTagGroup] {
        self.tag_groups
            .get(&product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct tags across the product's groups, by name
    fn tags_of(&self, product_id: i32) -> Vec<TagItem> {
        let mut seen = HashSet::new();
        let mut tags: Vec<TagItem> = self
            .groups_of(product_id)
            .iter()
            .flat_map(|g| g.tags.iter())
            .filter(|t| seen.insert(t.id))
            .map(tag_item)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }
}

/// Products whose relations are loaded in one round of queries
const RELATION_BATCH: usize = 500;

/// Listing view of each product, in input order.
///
/// Relations are loaded per batch so the bound id lists stay well under
/// the database's variable limit for unpaginated listings.
pub async fn product_list<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    products: Vec<product::Model>,
) -> Result<Vec<ProductListItem>, DbErr> {
    let forest = CategoryForest::load(db).await?;
    let mut items = Vec::with_capacity(products.len());
    let mut remaining = products.into_iter().peekable();
    while remaining.peek().is_some() {
        let batch: Vec<product::Model> = remaining.by_ref().take(RELATION_BATCH).collect();
        let relations = ProductRelations::load(db, &batch).await?;
        items.extend(batch.into_iter().map(|p| list_item(p, &relations, &forest, media)));
    }
    Ok(items)
}

fn list_item(
    p: product::Model,
    relations: &ProductRelations,
    forest: &CategoryForest,
    media: &MediaStore,
) -> ProductListItem {
    ProductListItem {
        id: p.id,
        main_image: main_image(relations.images_of(p.id)).map(|i| image_item(i, media)),
        category: forest.node(p.category_id).map(|n| tree_node(n, media)),
        category_id: p.category_id,
        features: relations.features_of(p.id),
        tags: relations.tags_of(p.id),
        name: p.name,
        slug: p.slug,
        price: p.price,
        is_available: p.is_available,
        manufacturer_sku: p.manufacturer_sku,
        internal_sku: p.internal_sku,
        created_at: p.created_at,
        updated_at: p.updated_at,
    }
}

pub async fn product_detail<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    product: product::Model,
) -> Result<ProductDetail, DbErr> {
    let forest = CategoryForest::load(db).await?;
    let relations = ProductRelations::load(db, std::slice::from_ref(&product)).await?;
    let p = product;

    Ok(ProductDetail {
        id: p.id,
        brand: p
            .brand_id
            .and_then(|id| relations.brands.get(&id).cloned())
            .map(|b| brand_item(b, None, media)),
        category: forest.node(p.category_id).map(|n| tree_node(n, media)),
        images: relations
            .images_of(p.id)
            .iter()
            .map(|i| image_item(i, media))
            .collect(),
        features: relations.features_of(p.id),
        tag_groups: relations
            .groups_of(p.id)
            .iter()
            .map(|g| ProductTagGroupItem {
                id: g.group.id,
                group_name: g.group.group_name_id,
                tags: g.tags.iter().map(tag_item).collect(),
            })
            .collect(),
        name: p.name,
        slug: p.slug,
        description: p.description,
        price: p.price,
        is_available: p.is_available,
        manufacturer_sku: p.manufacturer_sku,
        internal_sku: p.internal_sku,
        created_at: p.created_at,
        updated_at: p.updated_at,
    })
}

/// Admin view of each product, in input order
pub async fn admin_products<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    products: Vec<product::Model>,
) -> Result<Vec<AdminProduct>, DbErr> {
    let forest = CategoryForest::load(db).await?;
    let relations = ProductRelations::load(db, &products).await?;

    Ok(products
        .into_iter()
        .map(|p| {
            let images = relations.images_of(p.id);
            AdminProduct {
                id: p.id,
                category_name: forest.get(p.category_id).map(|c| c.name.clone()),
                brand_name: p
                    .brand_id
                    .and_then(|id| relations.brands.get(&id))
                    .map(|b| b.name.clone()),
                images_count: images.len() as u64,
                main_image: main_image(images).and_then(|i| media.url_opt(i.image.as_deref())),
                images: images.iter().map(|i| image_item(i, media)).collect(),
                features: relations
                    .features
                    .get(&p.id)
                    .into_iter()
                    .flatten()
                    .map(|f| AdminProductFeature {
                        id: f.row.id,
                        feature_id: f.row.feature_id,
                        feature_name: f.feature_name.clone(),
                        value_id: f.row.value_id,
                        value_text: f.value_text.clone(),
                    })
                    .collect(),
                tag_groups: relations
                    .groups_of(p.id)
                    .iter()
                    .map(|g| AdminProductTagGroup {
                        id: g.group.id,
                        group_name_id: g.group.group_name_id,
                        group_name_text: g.group_name.clone(),
                        tag_ids: g.tags.iter().map(|t| t.id).collect(),
                    })
                    .collect(),
                category: p.category_id,
                brand: p.brand_id,
                name: p.name,
                slug: p.slug,
                description: p.description,
                price: p.price,
                is_available: p.is_available,
                manufacturer_sku: p.manufacturer_sku,
                internal_sku: p.internal_sku,
                created_at: p.created_at,
            }
        })
        .collect())
}

pub async fn admin_product<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    product: product::Model,
) -> Result<AdminProduct, DbErr> {
    let mut items = admin_products(db, media, vec![product]).await?;
    items
        .pop()
        .ok_or_else(|| DbErr::Custom("assembled product went missing".to_string()))
}

/// Tags used by the products `products` selects, grouped under their tag name.
///
/// `products` is a statement selecting product ids. Groups without a name
/// are skipped. Groups are ordered by tag name, tags within a group by tag
/// name.
pub async fn tag_facets<C: ConnectionTrait>(
    db: &C,
    products: SelectStatement,
) -> Result<Vec<TagGroupFacet>, DbErr> {
    let named_groups = Query::select()
        .column(product_tag_group::Column::Id)
        .from(product_tag_group::Entity)
        .and_where(product_tag_group::Column::ProductId.in_subquery(products))
        .and_where(product_tag_group::Column::GroupNameId.is_not_null())
        .to_owned();
    let used_names = Query::select()
        .column(product_tag_group::Column::GroupNameId)
        .from(product_tag_group::Entity)
        .and_where(product_tag_group::Column::Id.in_subquery(named_groups.clone()))
        .to_owned();
    let used_tags = Query::select()
        .column(product_tag_group_tag::Column::TagId)
        .from(product_tag_group_tag::Entity)
        .and_where(product_tag_group_tag::Column::ProductTagGroupId.in_subquery(named_groups.clone()))
        .to_owned();

    let groups = product_tag_group::Entity::find()
        .filter(product_tag_group::Column::Id.in_subquery(named_groups.clone()))
        .all(db)
        .await?;
    let names: HashMap<i32, String> = tag_name::Entity::find()
        .filter(tag_name::Column::Id.in_subquery(used_names))
        .all(db)
        .await?
        .into_iter()
        .map(|n| (n.id, n.name))
        .collect();
    let links = product_tag_group_tag::Entity::find()
        .filter(product_tag_group_tag::Column::ProductTagGroupId.in_subquery(named_groups))
        .all(db)
        .await?;
    let tags: HashMap<i32, tag::Model> = tag::Entity::find()
        .filter(tag::Column::Id.in_subquery(used_tags))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let group_name_of: HashMap<i32, i32> = groups
        .iter()
        .filter_map(|g| g.group_name_id.map(|n| (g.id, n)))
        .collect();

    // tag name id -> tag id -> tag
    let mut grouped: HashMap<i32, BTreeMap<i32, &tag::Model>> = HashMap::new();
    for group in &groups {
        if let Some(name_id) = group.group_name_id {
            grouped.entry(name_id).or_default();
        }
    }
    for link in &links {
        let (Some(name_id), Some(tag)) = (
            group_name_of.get(&link.product_tag_group_id),
            tags.get(&link.tag_id),
        ) else {
            continue;
        };
        grouped.entry(*name_id).or_default().insert(tag.id, tag);
    }

    let mut facets: Vec<TagGroupFacet> = grouped
        .into_iter()
        .filter_map(|(name_id, tags)| {
            let group_name = names.get(&name_id)?.clone();
            let mut tags: Vec<TagItem> = tags.into_values().map(tag_item).collect();
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            Some(TagGroupFacet {
                id: name_id,
                group_name,
                tags,
            })
        })
        .collect();
    facets.sort_by(|a, b| a.group_name.cmp(&b.group_name));
    Ok(facets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_db::entities::category;
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set};

    /// More products than SQLite accepts bound variables in one statement
    const MANY: usize = 33_000;

    async fn seeded_catalog() -> (DatabaseConnection, category::Model) {
        let db = catalog_db::connect("sqlite::memory:").await.unwrap();
        catalog_db::migrate(&db).await.unwrap();

        let tools = category::ActiveModel {
            name: Set("Tools".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let now = Utc::now();
        let products: Vec<product::ActiveModel> = (1..=MANY)
            .map(|n| product::ActiveModel {
                name: Set(format!("Product {}", n)),
                slug: Set(format!("product-{}", n)),
                description: Set(String::new()),
                category_id: Set(tools.id),
                brand_id: Set(None),
                price: Set(None),
                is_available: Set(true),
                manufacturer_sku: Set(None),
                internal_sku: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();
        let mut rows = products.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<product::ActiveModel> = rows.by_ref().take(100).collect();
            product::Entity::insert_many(chunk).exec(&db).await.unwrap();
        }

        (db, tools)
    }

    #[tokio::test]
    async fn test_large_catalog_tag_facets_and_listing() {
        let (db, tools) = seeded_catalog().await;

        let usage = tag_name::ActiveModel {
            name: Set("Usage".to_string()),
            category_id: Set(Some(tools.id)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let pro = tag::ActiveModel {
            name: Set("Pro".to_string()),
            category_id: Set(Some(tools.id)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        db.execute_unprepared(&format!(
            "INSERT INTO product_tag_groups (product_id, group_name_id) SELECT id, {} FROM products",
            usage.id
        ))
        .await
        .unwrap();
        db.execute_unprepared(&format!(
            "INSERT INTO product_tag_group_tags (product_tag_group_id, tag_id) SELECT id, {} FROM product_tag_groups",
            pro.id
        ))
        .await
        .unwrap();

        let in_tools = Query::select()
            .column(product::Column::Id)
            .from(product::Entity)
            .and_where(product::Column::CategoryId.eq(tools.id))
            .to_owned();
        let facets = tag_facets(&db, in_tools).await.unwrap();
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].group_name, "Usage");
        assert_eq!(facets[0].tags.len(), 1);
        assert_eq!(facets[0].tags[0].id, pro.id);

        let products = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&db)
            .await
            .unwrap();
        let items = product_list(&db, &MediaStore::new("media", "/media/"), products)
            .await
            .unwrap();
        assert_eq!(items.len(), MANY);
        assert_eq!(items[0].slug, "product-1");
        assert_eq!(items[MANY - 1].slug, format!("product-{}", MANY));
        assert_eq!(items[MANY - 1].tags.len(), 1);
    }

    #[tokio::test]
    async fn test_tag_facets_of_no_products() {
        let db = catalog_db::connect("sqlite::memory:").await.unwrap();
        catalog_db::migrate(&db).await.unwrap();

        let nothing = Query::select()
            .column(product::Column::Id)
            .from(product::Entity)
            .and_where(product::Column::BrandId.eq(1))
            .to_owned();
        assert!(tag_facets(&db, nothing).await.unwrap().is_empty());
    }
}
