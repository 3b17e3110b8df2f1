//! Single-row tables (about page, contact details)

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait};

/// Prefix of the `DbErr::Custom` message raised when a second row is inserted
pub const SINGLETON_ERROR_PREFIX: &str = "singleton violation";

/// Fail if the table behind `E` already holds a row
pub(crate) async fn ensure_vacant<E, C>(db: &C) -> Result<(), DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let existing = E::find().count(db).await?;
    if existing > 0 {
        return Err(DbErr::Custom(format!(
            "{}: {} already has a row",
            SINGLETON_ERROR_PREFIX,
            E::default().table_name()
        )));
    }
    Ok(())
}
