use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use uuid::Uuid;

use stockpile_core::allocation::{AllocationRepositoryTrait, AllocationWrite, StockpileAllocation};
use stockpile_core::stockpile::HistoryChangeType;
use stockpile_core::Result;

use super::model::StockpileAllocationDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::stockpile_allocations;
use crate::stockpile::{apply_quantity_change, QuantityChange};
use crate::utils::{format_decimal, format_timestamp};

pub struct AllocationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AllocationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AllocationRepository { pool, writer }
    }
}

fn upsert_monthly_amount(
    conn: &mut SqliteConnection,
    subscription_id: &str,
    write: &AllocationWrite,
    timestamp: &str,
) -> Result<()> {
    let row = StockpileAllocationDB {
        id: Uuid::new_v4().to_string(),
        subscription_id: subscription_id.to_string(),
        product_id: write.product_id.clone(),
        monthly_amount: format_decimal(write.monthly_amount),
        target_quantity: write.target_quantity.map(format_decimal),
        created_at: timestamp.to_string(),
        updated_at: timestamp.to_string(),
    };
    let insert = diesel::insert_into(stockpile_allocations::table)
        .values(&row)
        .on_conflict((
            stockpile_allocations::subscription_id,
            stockpile_allocations::product_id,
        ))
        .do_update();

    // An absent target leaves the stored one alone.
    if write.target_quantity.is_some() {
        insert
            .set((
                stockpile_allocations::monthly_amount
                    .eq(excluded(stockpile_allocations::monthly_amount)),
                stockpile_allocations::target_quantity
                    .eq(excluded(stockpile_allocations::target_quantity)),
                stockpile_allocations::updated_at.eq(excluded(stockpile_allocations::updated_at)),
            ))
            .execute(conn)
            .map_err(StorageError::from)?;
    } else {
        insert
            .set((
                stockpile_allocations::monthly_amount
                    .eq(excluded(stockpile_allocations::monthly_amount)),
                stockpile_allocations::updated_at.eq(excluded(stockpile_allocations::updated_at)),
            ))
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    Ok(())
}

#[async_trait]
impl AllocationRepositoryTrait for AllocationRepository {
    fn get_allocations(&self, subscription_id: &str) -> Result<Vec<StockpileAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = stockpile_allocations::table
            .filter(stockpile_allocations::subscription_id.eq(subscription_id))
            .order(stockpile_allocations::product_id.asc())
            .select(StockpileAllocationDB::as_select())
            .load::<StockpileAllocationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(StockpileAllocation::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    async fn record_allocations(
        &self,
        user_id: &str,
        subscription_id: &str,
        writes: Vec<AllocationWrite>,
        allocated_at: DateTime<Utc>,
    ) -> Result<usize> {
        let user_id = user_id.to_string();
        let subscription_id = subscription_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let timestamp = format_timestamp(allocated_at);
                for write in &writes {
                    upsert_monthly_amount(conn, &subscription_id, write, &timestamp)?;
                    apply_quantity_change(
                        conn,
                        &QuantityChange {
                            user_id: &user_id,
                            product_id: &write.product_id,
                            delta: write.quantity_delta,
                            target_quantity: write.target_quantity,
                            change_type: HistoryChangeType::Allocation,
                            reference_id: Some(subscription_id.clone()),
                            notes: Some(format!("Monthly allocation of {}", write.monthly_amount)),
                            at: allocated_at,
                        },
                    )?;
                }
                Ok(writes.len())
            })
            .await
    }
}
