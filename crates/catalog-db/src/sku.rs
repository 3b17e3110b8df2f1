//! Internal SKU generation
//!
//! A product without an internal SKU gets `<PREFIX>-<NNNN>` on save. The
//! prefix is up to three uppercase alphanumerics taken from the category
//! slug (or the product name when the category has no slug) and the suffix
//! is a random zero-padded number. Each candidate is written inside its own
//! transaction (a savepoint when the caller already holds one) so a unique
//! violation only rolls back that attempt.

use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr, SqlErr, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entities::product;
use crate::error::CatalogError;

/// Candidates tried before giving up
pub const MAX_SKU_ATTEMPTS: u32 = 10;

/// Used when neither the category slug nor the name yields an alphanumeric
pub const FALLBACK_PREFIX: &str = "PRD";

/// Derive the SKU prefix
pub fn sku_prefix(category_slug: Option<&str>, name: &str) -> String {
    let raw: String = match category_slug {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => name.chars().take(3).collect(),
    };

    let prefix: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect();

    if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Random four-digit suffix in `0..10_000`
pub fn random_suffix() -> u16 {
    rand::thread_rng().gen_range(0..10_000)
}

pub fn format_sku(prefix: &str, suffix: u16) -> String {
    format!("{}-{:04}", prefix, suffix % 10_000)
}

fn has_sku(model: &product::ActiveModel) -> bool {
    match &model.internal_sku {
        ActiveValue::Set(Some(sku)) | ActiveValue::Unchanged(Some(sku)) => !sku.trim().is_empty(),
        _ => false,
    }
}

fn is_sku_collision(err: &DbErr) -> bool {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => msg.contains("internal_sku"),
        _ => false,
    }
}

/// Insert or update a product, generating its internal SKU when missing.
///
/// `suffix` supplies the numeric part of each candidate; production callers
/// pass [`random_suffix`].
pub async fn save_product<C, F>(
    db: &C,
    model: product::ActiveModel,
    category_slug: Option<&str>,
    mut suffix: F,
) -> Result<product::Model, CatalogError>
where
    C: ConnectionTrait + TransactionTrait,
    F: FnMut() -> u16 + Send,
{
    let is_insert = model.id.is_not_set();

    if has_sku(&model) {
        return Ok(persist(db, model, is_insert).await?);
    }

    let name = match &model.name {
        ActiveValue::Set(name) | ActiveValue::Unchanged(name) => name.clone(),
        ActiveValue::NotSet => String::new(),
    };
    let prefix = sku_prefix(category_slug, &name);

    for attempt in 1..=MAX_SKU_ATTEMPTS {
        let candidate = format_sku(&prefix, suffix());
        let mut attempt_model = model.clone();
        attempt_model.internal_sku = ActiveValue::Set(Some(candidate.clone()));

        let txn = db.begin().await?;
        match persist(&txn, attempt_model, is_insert).await {
            Ok(saved) => {
                txn.commit().await?;
                debug!("Assigned internal SKU {} on attempt {}", candidate, attempt);
                return Ok(saved);
            }
            Err(err) if is_sku_collision(&err) => {
                txn.rollback().await?;
                debug!("Internal SKU {} already taken, retrying", candidate);
            }
            Err(err) => {
                txn.rollback().await?;
                return Err(err.into());
            }
        }
    }

    warn!(
        "Gave up generating an internal SKU with prefix {} after {} attempts",
        prefix, MAX_SKU_ATTEMPTS
    );
    Err(CatalogError::SkuExhausted {
        prefix,
        attempts: MAX_SKU_ATTEMPTS,
    })
}

async fn persist<C: ConnectionTrait>(
    db: &C,
    model: product::ActiveModel,
    is_insert: bool,
) -> Result<product::Model, DbErr> {
    if is_insert {
        model.insert(db).await
    } else {
        model.update(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_from_category_slug() {
        assert_eq!(sku_prefix(Some("drills"), "Bosch GSR"), "DRI");
        assert_eq!(sku_prefix(Some("a-b-c-d"), "x"), "ABC");
    }

    #[test]
    fn test_prefix_falls_back_to_name() {
        assert_eq!(sku_prefix(None, "hammer"), "HAM");
        assert_eq!(sku_prefix(Some(""), "x1 saw"), "X1");
    }

    #[test]
    fn test_prefix_default() {
        assert_eq!(sku_prefix(None, "!!!"), FALLBACK_PREFIX);
        assert_eq!(sku_prefix(None, ""), FALLBACK_PREFIX);
    }

    #[test]
    fn test_format_sku() {
        assert_eq!(format_sku("DRI", 7), "DRI-0007");
        assert_eq!(format_sku("AB", 9999), "AB-9999");
    }

    #[test]
    fn test_random_suffix_in_range() {
        for _ in 0..1000 {
            assert!(random_suffix() < 10_000);
        }
    }
}
