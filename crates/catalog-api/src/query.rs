//! Lenient query-string parsing
//!
//! Listing filters never reject a request: values that do not parse are
//! dropped and the filter is simply not applied.

use std::collections::HashMap;
use std::str::FromStr;

use catalog_db::product_filter::{ProductFilter, ProductOrdering};
use rust_decimal::Decimal;

pub type Params = HashMap<String, String>;

const FEATURE_PREFIX: &str = "feature_";

/// Non-empty, trimmed value of `key`
pub fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// `true/1/yes` or `false/0/no`, case-insensitive
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

pub fn parse_id(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

/// Split a comma-separated list, dropping blanks
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn bool_param(params: &Params, key: &str) -> Option<bool> {
    param(params, key).and_then(parse_bool)
}

pub fn id_param(params: &Params, key: &str) -> Option<i32> {
    param(params, key).and_then(parse_id)
}

/// Build the product listing filter from the query string
///
/// Recognized keys: `tag`, `price_min`, `price_max`, `brand`,
/// `is_available`, `search`, `feature_<id>`, `category`, `ordering`.
pub fn product_filter(params: &Params) -> ProductFilter {
    let mut features: Vec<(i32, String)> = params
        .iter()
        .filter_map(|(key, value)| {
            let id = key.strip_prefix(FEATURE_PREFIX)?.parse::<i32>().ok()?;
            let value = value.trim();
            (!value.is_empty()).then(|| (id, value.to_string()))
        })
        .collect();
    features.sort();

    ProductFilter {
        tags: param(params, "tag").map(split_csv).unwrap_or_default(),
        price_min: param(params, "price_min").and_then(parse_decimal),
        price_max: param(params, "price_max").and_then(parse_decimal),
        brands: param(params, "brand").map(split_csv).unwrap_or_default(),
        is_available: bool_param(params, "is_available"),
        search: param(params, "search").map(str::to_string),
        features,
        category: param(params, "category").map(str::to_string),
        ordering: ProductOrdering::from_param(param(params, "ordering")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_query_is_empty_filter() {
        assert!(product_filter(&Params::new()).is_empty());
    }

    #[test]
    fn test_full_query() {
        let filter = product_filter(&params(&[
            ("tag", "new, sale,,"),
            ("price_min", "10.5"),
            ("price_max", "99"),
            ("brand", "acme"),
            ("is_available", "Yes"),
            ("search", "  drill "),
            ("feature_3", "red"),
            ("feature_1", "steel"),
            ("category", "tools"),
            ("ordering", "-price"),
        ]));

        assert_eq!(filter.tags, vec!["new", "sale"]);
        assert_eq!(filter.price_min, Some(Decimal::new(105, 1)));
        assert_eq!(filter.price_max, Some(Decimal::from(99)));
        assert_eq!(filter.brands, vec!["acme"]);
        assert_eq!(filter.is_available, Some(true));
        assert_eq!(filter.search.as_deref(), Some("drill"));
        assert_eq!(
            filter.features,
            vec![(1, "steel".to_string()), (3, "red".to_string())]
        );
        assert_eq!(filter.category.as_deref(), Some("tools"));
        assert_eq!(filter.ordering, ProductOrdering::PriceDesc);
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let filter = product_filter(&params(&[
            ("price_min", "cheap"),
            ("price_max", ""),
            ("is_available", "maybe"),
            ("feature_x", "red"),
            ("feature_2", "   "),
            ("ordering", "random()"),
        ]));

        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("on"), None);
    }
}
