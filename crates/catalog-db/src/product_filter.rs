//! Product filter composition
//!
//! Every filter is optional and they combine with AND. Multi-row matches
//! (tags, features) are expressed as `id IN (subquery)` so the outer query
//! never yields a product twice.

use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Select,
};
use tracing::debug;

use crate::category_tree;
use crate::entities::{
    brand, category, feature_value, product, product_feature, product_tag_group,
    product_tag_group_tag, tag,
};

/// Sort orders a client may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductOrdering {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    CreatedAsc,
    #[default]
    CreatedDesc,
}

impl ProductOrdering {
    /// Parse an `ordering` parameter; anything off the whitelist gets the default
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Self::NameAsc,
            Some("-name") => Self::NameDesc,
            Some("price") => Self::PriceAsc,
            Some("-price") => Self::PriceDesc,
            Some("created_at") => Self::CreatedAsc,
            _ => Self::CreatedDesc,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::NameAsc => "name",
            Self::NameDesc => "-name",
            Self::PriceAsc => "price",
            Self::PriceDesc => "-price",
            Self::CreatedAsc => "created_at",
            Self::CreatedDesc => "-created_at",
        }
    }

    pub fn apply(&self, query: Select<product::Entity>) -> Select<product::Entity> {
        let query = match self {
            Self::NameAsc => query.order_by_asc(product::Column::Name),
            Self::NameDesc => query.order_by_desc(product::Column::Name),
            Self::PriceAsc => query.order_by_asc(product::Column::Price),
            Self::PriceDesc => query.order_by_desc(product::Column::Price),
            Self::CreatedAsc => query.order_by_asc(product::Column::CreatedAt),
            Self::CreatedDesc => query.order_by_desc(product::Column::CreatedAt),
        };
        match self {
            Self::CreatedDesc | Self::NameDesc | Self::PriceDesc => {
                query.order_by_desc(product::Column::Id)
            }
            _ => query.order_by_asc(product::Column::Id),
        }
    }
}

/// Filters for product listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Tag slugs or names; a product matches if any of its tags matches any entry
    pub tags: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    /// Brand slugs
    pub brands: Vec<String>,
    pub is_available: Option<bool>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    /// `(feature_id, value substring)`, all must match
    pub features: Vec<(i32, String)>,
    /// Category slug; the whole subtree is included
    pub category: Option<String>,
    pub ordering: ProductOrdering,
}

/// `%term%` with LIKE wildcards in `term` escaped, lowercased for use against `lower(col)`
pub fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

/// `lower(table.column) LIKE %term%`
pub fn icontains<T, C>(table: T, column: C, term: &str) -> sea_orm::sea_query::SimpleExpr
where
    T: sea_orm::sea_query::IntoIden + 'static,
    C: sea_orm::sea_query::IntoIden + 'static,
{
    Expr::expr(Func::lower(Expr::col((table, column)))).like(contains_pattern(term))
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every filter and the ordering to `query`
    pub async fn apply<C: ConnectionTrait>(
        &self,
        db: &C,
        query: Select<product::Entity>,
    ) -> Result<Select<product::Entity>, DbErr> {
        let mut query = query;

        if !self.tags.is_empty() {
            let matching = Query::select()
                .column((product_tag_group::Entity, product_tag_group::Column::ProductId))
                .from(product_tag_group::Entity)
                .inner_join(
                    product_tag_group_tag::Entity,
                    Expr::col((
                        product_tag_group_tag::Entity,
                        product_tag_group_tag::Column::ProductTagGroupId,
                    ))
                    .equals((product_tag_group::Entity, product_tag_group::Column::Id)),
                )
                .inner_join(
                    tag::Entity,
                    Expr::col((tag::Entity, tag::Column::Id)).equals((
                        product_tag_group_tag::Entity,
                        product_tag_group_tag::Column::TagId,
                    )),
                )
                .cond_where(
                    Condition::any()
                        .add(tag::Column::Slug.is_in(self.tags.clone()))
                        .add(tag::Column::Name.is_in(self.tags.clone())),
                )
                .to_owned();
            query = query.filter(product::Column::Id.in_subquery(matching));
        }

        if let Some(min) = self.price_min {
            query = query.filter(product::Column::Price.gte(min));
        }
        if let Some(max) = self.price_max {
            query = query.filter(product::Column::Price.lte(max));
        }

        if !self.brands.is_empty() {
            let brand_ids = Query::select()
                .column(brand::Column::Id)
                .from(brand::Entity)
                .and_where(brand::Column::Slug.is_in(self.brands.clone()))
                .to_owned();
            query = query.filter(product::Column::BrandId.in_subquery(brand_ids));
        }

        if let Some(available) = self.is_available {
            query = query.filter(product::Column::IsAvailable.eq(available));
        }

        if let Some(term) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains(product::Entity, product::Column::Name, term))
                    .add(icontains(product::Entity, product::Column::Description, term)),
            );
        }

        for (feature_id, value) in &self.features {
            let matching = Query::select()
                .column((product_feature::Entity, product_feature::Column::ProductId))
                .from(product_feature::Entity)
                .inner_join(
                    feature_value::Entity,
                    Expr::col((feature_value::Entity, feature_value::Column::Id))
                        .equals((product_feature::Entity, product_feature::Column::ValueId)),
                )
                .and_where(product_feature::Column::FeatureId.eq(*feature_id))
                .and_where(icontains(
                    feature_value::Entity,
                    feature_value::Column::Value,
                    value,
                ))
                .to_owned();
            query = query.filter(product::Column::Id.in_subquery(matching));
        }

        if let Some(slug) = self.category.as_deref().filter(|s| !s.is_empty()) {
            let root = category::Entity::find()
                .filter(category::Column::Slug.eq(slug))
                .one(db)
                .await?;
            let ids = match root {
                Some(root) => category_tree::subtree_ids(db, root.id).await?,
                None => {
                    debug!("Unknown category slug {:?} in product filter", slug);
                    Vec::new()
                }
            };
            query = query.filter(product::Column::CategoryId.is_in(ids));
        }

        Ok(self.ordering.apply(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_ordering_whitelist() {
        assert_eq!(ProductOrdering::from_param(Some("price")), ProductOrdering::PriceAsc);
        assert_eq!(ProductOrdering::from_param(Some("-name")), ProductOrdering::NameDesc);
        assert_eq!(
            ProductOrdering::from_param(Some("description")),
            ProductOrdering::CreatedDesc
        );
        assert_eq!(ProductOrdering::from_param(None), ProductOrdering::CreatedDesc);
    }

    #[test]
    fn test_default_ordering_sql() {
        let sql = ProductOrdering::default()
            .apply(product::Entity::find())
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.ends_with(r#"ORDER BY "products"."created_at" DESC, "products"."id" DESC"#));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        let sql = product::Entity::find()
            .filter(icontains(product::Entity, product::Column::Name, "50%_OFF"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("LOWER"), "{}", sql);
        assert!(sql.contains("_off%"), "{}", sql);
        assert!(sql.contains("ESCAPE"), "{}", sql);
    }

    #[test]
    fn test_empty_filter() {
        assert!(ProductFilter::default().is_empty());
        let filter = ProductFilter {
            is_available: Some(true),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
