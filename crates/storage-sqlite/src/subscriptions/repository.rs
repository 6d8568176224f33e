use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use uuid::Uuid;

use stockpile_core::subscriptions::{
    OnboardingRecord, Subscription, SubscriptionRepositoryTrait, SubscriptionStatus,
};
use stockpile_core::Result;

use super::model::SubscriptionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{stockpile_allocations, subscriptions, virtual_stockpile};
use crate::utils::{format_decimal, format_timestamp};

pub struct SubscriptionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SubscriptionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SubscriptionRepository { pool, writer }
    }
}

pub(crate) fn find_subscription(
    conn: &mut SqliteConnection,
    owner_id: &str,
) -> Result<Option<Subscription>> {
    let row = subscriptions::table
        .filter(subscriptions::user_id.eq(owner_id))
        .select(SubscriptionDB::as_select())
        .first::<SubscriptionDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    Ok(row.map(Subscription::try_from).transpose()?)
}

/// Writes the subscription row, keyed by user, and returns its id.
fn upsert_subscription_row(conn: &mut SqliteConnection, record: &OnboardingRecord) -> Result<String> {
    let timestamp = format_timestamp(record.completed_at);
    let shipping_address =
        serde_json::to_string(&record.shipping_address).map_err(StorageError::from)?;
    let row = SubscriptionDB {
        id: Uuid::new_v4().to_string(),
        user_id: record.user_id.clone(),
        monthly_budget: format_decimal(record.monthly_budget),
        status: SubscriptionStatus::Active.as_str().to_string(),
        allocation_frequency: record.allocation_frequency.as_str().to_string(),
        next_allocation_date: Some(format_timestamp(record.next_allocation_date)),
        shipping_address: Some(shipping_address),
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };

    diesel::insert_into(subscriptions::table)
        .values(&row)
        .on_conflict(subscriptions::user_id)
        .do_update()
        .set((
            subscriptions::monthly_budget.eq(excluded(subscriptions::monthly_budget)),
            subscriptions::status.eq(excluded(subscriptions::status)),
            subscriptions::allocation_frequency.eq(excluded(subscriptions::allocation_frequency)),
            subscriptions::next_allocation_date.eq(excluded(subscriptions::next_allocation_date)),
            subscriptions::shipping_address.eq(excluded(subscriptions::shipping_address)),
            subscriptions::updated_at.eq(excluded(subscriptions::updated_at)),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;

    Ok(subscriptions::table
        .filter(subscriptions::user_id.eq(&record.user_id))
        .select(subscriptions::id)
        .first::<String>(conn)
        .map_err(StorageError::from)?)
}

#[async_trait]
impl SubscriptionRepositoryTrait for SubscriptionRepository {
    fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        let mut conn = get_connection(&self.pool)?;
        find_subscription(&mut conn, user_id)
    }

    fn get_due_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = subscriptions::table
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.as_str()))
            .filter(subscriptions::next_allocation_date.le(format_timestamp(now)))
            .order(subscriptions::next_allocation_date.asc())
            .select(SubscriptionDB::as_select())
            .load::<SubscriptionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(Subscription::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    async fn save_onboarding(&self, record: OnboardingRecord) -> Result<Subscription> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Subscription> {
                let subscription_id = upsert_subscription_row(conn, &record)?;
                let timestamp = format_timestamp(record.completed_at);

                for selection in &record.selections {
                    let target = selection.target_quantity.map(format_decimal);
                    diesel::insert_into(stockpile_allocations::table)
                        .values((
                            stockpile_allocations::id.eq(Uuid::new_v4().to_string()),
                            stockpile_allocations::subscription_id.eq(&subscription_id),
                            stockpile_allocations::product_id.eq(&selection.id),
                            stockpile_allocations::monthly_amount
                                .eq(format_decimal(selection.monthly_amount)),
                            stockpile_allocations::target_quantity.eq(target.clone()),
                            stockpile_allocations::created_at.eq(&timestamp),
                            stockpile_allocations::updated_at.eq(&timestamp),
                        ))
                        .on_conflict((
                            stockpile_allocations::subscription_id,
                            stockpile_allocations::product_id,
                        ))
                        .do_update()
                        .set((
                            stockpile_allocations::monthly_amount
                                .eq(excluded(stockpile_allocations::monthly_amount)),
                            stockpile_allocations::target_quantity
                                .eq(excluded(stockpile_allocations::target_quantity)),
                            stockpile_allocations::updated_at
                                .eq(excluded(stockpile_allocations::updated_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;

                    // A goal creates the stockpile row up front so progress shows from day one.
                    if let Some(target) = target {
                        diesel::insert_into(virtual_stockpile::table)
                            .values((
                                virtual_stockpile::id.eq(Uuid::new_v4().to_string()),
                                virtual_stockpile::user_id.eq(&record.user_id),
                                virtual_stockpile::product_id.eq(&selection.id),
                                virtual_stockpile::quantity_allocated.eq("0"),
                                virtual_stockpile::target_quantity.eq(&target),
                                virtual_stockpile::created_at.eq(&timestamp),
                                virtual_stockpile::updated_at.eq(&timestamp),
                            ))
                            .on_conflict((virtual_stockpile::user_id, virtual_stockpile::product_id))
                            .do_update()
                            .set((
                                virtual_stockpile::target_quantity
                                    .eq(excluded(virtual_stockpile::target_quantity)),
                                virtual_stockpile::updated_at
                                    .eq(excluded(virtual_stockpile::updated_at)),
                            ))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                }

                find_subscription(conn, &record.user_id)?.ok_or_else(|| {
                    StorageError::SerializationError(format!(
                        "Subscription for user {} vanished after onboarding",
                        record.user_id
                    ))
                    .into()
                })
            })
            .await
    }

    async fn update_next_allocation_date(
        &self,
        subscription_id: &str,
        next_allocation_date: DateTime<Utc>,
    ) -> Result<()> {
        let subscription_id = subscription_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let updated = diesel::update(subscriptions::table.find(&subscription_id))
                    .set((
                        subscriptions::next_allocation_date
                            .eq(format_timestamp(next_allocation_date)),
                        subscriptions::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(stockpile_core::Error::NotFound(format!(
                        "Subscription {} not found",
                        subscription_id
                    )));
                }
                Ok(())
            })
            .await
    }
}
