use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use uuid::Uuid;

use stockpile_core::catalog::Product;
use stockpile_core::errors::Error;
use stockpile_core::stockpile::{
    HistoryChangeType, HistoryFilter, StockpileHistoryEntry, StockpileItem,
    StockpileRepositoryTrait,
};
use stockpile_core::Result;

use super::model::{StockpileHistoryDB, VirtualStockpileDB};
use crate::catalog::load_products_by_ids;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{stockpile_history, virtual_stockpile};
use crate::utils::{format_decimal, format_timestamp, parse_decimal};

pub struct StockpileRepository {
    pool: Arc<DbPool>,
    // Writes go through the allocation and shipment repositories.
    #[allow(dead_code)]
    writer: WriteHandle,
}

impl StockpileRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        StockpileRepository { pool, writer }
    }
}

/// One quantity movement to apply to a stockpile row, with its history entry.
#[derive(Debug, Clone)]
pub(crate) struct QuantityChange<'a> {
    pub user_id: &'a str,
    pub product_id: &'a str,
    /// Added to the current quantity; negative for shipments.
    pub delta: Decimal,
    /// Overwrites the row's target when present.
    pub target_quantity: Option<Decimal>,
    pub change_type: HistoryChangeType,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub at: DateTime<Utc>,
}

/// Applies `change` to the `(user, product)` row, creating it when missing,
/// and appends the matching history entry. Returns the new quantity.
///
/// Must run inside a write transaction. Fails with `ConstraintViolation`
/// when the result would be negative.
pub(crate) fn apply_quantity_change(
    conn: &mut SqliteConnection,
    change: &QuantityChange<'_>,
) -> Result<Decimal> {
    let existing = virtual_stockpile::table
        .filter(virtual_stockpile::user_id.eq(change.user_id))
        .filter(virtual_stockpile::product_id.eq(change.product_id))
        .select(VirtualStockpileDB::as_select())
        .first::<VirtualStockpileDB>(conn)
        .optional()
        .map_err(StorageError::from)?;

    let available = match &existing {
        Some(row) => parse_decimal("virtual_stockpile.quantity_allocated", &row.quantity_allocated)?,
        None => Decimal::ZERO,
    };
    let quantity = available.checked_add(change.delta).ok_or_else(|| {
        Error::ConstraintViolation(format!(
            "Stockpile quantity for product '{}' is out of range",
            change.product_id
        ))
    })?;
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(Error::ConstraintViolation(format!(
            "Insufficient stockpile for product '{}': requested {}, available {}",
            change.product_id,
            -change.delta,
            available
        )));
    }

    let timestamp = format_timestamp(change.at);
    let row_id = match existing {
        Some(row) => {
            diesel::update(virtual_stockpile::table.find(&row.id))
                .set((
                    virtual_stockpile::quantity_allocated.eq(format_decimal(quantity)),
                    virtual_stockpile::updated_at.eq(&timestamp),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
            if let Some(target) = change.target_quantity {
                diesel::update(virtual_stockpile::table.find(&row.id))
                    .set(virtual_stockpile::target_quantity.eq(format_decimal(target)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
            }
            row.id
        }
        None => {
            let row = VirtualStockpileDB {
                id: Uuid::new_v4().to_string(),
                user_id: change.user_id.to_string(),
                product_id: change.product_id.to_string(),
                quantity_allocated: format_decimal(quantity),
                target_quantity: format_decimal(change.target_quantity.unwrap_or_default()),
                last_allocation_date: None,
                last_shipment_date: None,
                created_at: timestamp.clone(),
                updated_at: timestamp.clone(),
            };
            diesel::insert_into(virtual_stockpile::table)
                .values(&row)
                .execute(conn)
                .map_err(StorageError::from)?;
            row.id
        }
    };

    match change.change_type {
        HistoryChangeType::Allocation => {
            diesel::update(virtual_stockpile::table.find(&row_id))
                .set(virtual_stockpile::last_allocation_date.eq(&timestamp))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        HistoryChangeType::Shipment => {
            diesel::update(virtual_stockpile::table.find(&row_id))
                .set(virtual_stockpile::last_shipment_date.eq(&timestamp))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        HistoryChangeType::Adjustment => {}
    }

    diesel::insert_into(stockpile_history::table)
        .values(&StockpileHistoryDB {
            id: Uuid::new_v4().to_string(),
            user_id: change.user_id.to_string(),
            product_id: change.product_id.to_string(),
            change_type: change.change_type.as_str().to_string(),
            quantity_change: format_decimal(change.delta),
            reference_id: change.reference_id.clone(),
            notes: change.notes.clone(),
            created_at: timestamp,
        })
        .execute(conn)
        .map_err(StorageError::from)?;

    Ok(quantity)
}

fn products_by_id(
    conn: &mut SqliteConnection,
    product_ids: impl Iterator<Item = String>,
) -> Result<HashMap<String, Product>> {
    let unique: Vec<String> = product_ids.collect::<BTreeSet<_>>().into_iter().collect();
    Ok(load_products_by_ids(conn, &unique)?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect())
}

fn filtered_history<'a>(
    owner_id: &'a str,
    filter: &'a HistoryFilter,
) -> stockpile_history::BoxedQuery<'a, Sqlite> {
    let mut query = stockpile_history::table
        .filter(stockpile_history::user_id.eq(owner_id))
        .into_boxed();
    if let Some(product_id) = &filter.product_id {
        query = query.filter(stockpile_history::product_id.eq(product_id));
    }
    if let Some(change_type) = filter.change_type {
        query = query.filter(stockpile_history::change_type.eq(change_type.as_str()));
    }
    query
}

impl StockpileRepositoryTrait for StockpileRepository {
    fn get_stockpile_items(&self, user_id: &str) -> Result<Vec<StockpileItem>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = virtual_stockpile::table
            .filter(virtual_stockpile::user_id.eq(user_id))
            .order(virtual_stockpile::created_at.asc())
            .select(VirtualStockpileDB::as_select())
            .load::<VirtualStockpileDB>(&mut conn)
            .map_err(StorageError::from)?;

        let products = products_by_id(&mut conn, rows.iter().map(|r| r.product_id.clone()))?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let product = products.get(&row.product_id);
                row.into_item(product)
            })
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    fn get_history(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<StockpileHistoryEntry>, i64)> {
        let mut conn = get_connection(&self.pool)?;

        let total = filtered_history(user_id, filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;

        let rows = filtered_history(user_id, filter)
            .order((
                stockpile_history::created_at.desc(),
                stockpile_history::id.desc(),
            ))
            .limit(filter.limit)
            .offset(filter.offset)
            .select(StockpileHistoryDB::as_select())
            .load::<StockpileHistoryDB>(&mut conn)
            .map_err(StorageError::from)?;

        let products = products_by_id(&mut conn, rows.iter().map(|r| r.product_id.clone()))?;
        let entries = rows
            .into_iter()
            .map(|row| {
                let product = products.get(&row.product_id);
                row.into_entry(product)
            })
            .collect::<std::result::Result<Vec<_>, StorageError>>()?;

        Ok((entries, total))
    }
}
