//! Database models for subscriptions.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_optional_timestamp, parse_timestamp};
use stockpile_core::subscriptions::{
    AllocationFrequency, ShippingAddress, Subscription, SubscriptionStatus,
};

/// Database model for subscriptions
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubscriptionDB {
    pub id: String,
    pub user_id: String,
    pub monthly_budget: String,
    pub status: String,
    pub allocation_frequency: String,
    pub next_allocation_date: Option<String>,
    /// JSON-encoded `ShippingAddress`
    pub shipping_address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SubscriptionDB> for Subscription {
    type Error = StorageError;

    fn try_from(db: SubscriptionDB) -> Result<Self, Self::Error> {
        let status = db
            .status
            .parse::<SubscriptionStatus>()
            .map_err(|e| StorageError::corrupt("subscriptions.status", &db.status, e))?;
        let shipping_address = db
            .shipping_address
            .as_deref()
            .map(serde_json::from_str::<ShippingAddress>)
            .transpose()?;

        Ok(Subscription {
            monthly_budget: parse_decimal("subscriptions.monthly_budget", &db.monthly_budget)?,
            allocation_frequency: AllocationFrequency::parse_or_default(Some(
                &db.allocation_frequency,
            )),
            next_allocation_date: parse_optional_timestamp(
                "subscriptions.next_allocation_date",
                db.next_allocation_date.as_deref(),
            )?,
            created_at: parse_timestamp("subscriptions.created_at", &db.created_at)?,
            updated_at: parse_timestamp("subscriptions.updated_at", &db.updated_at)?,
            id: db.id,
            user_id: db.user_id,
            status,
            shipping_address,
        })
    }
}
