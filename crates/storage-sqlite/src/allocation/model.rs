//! Database models for stockpile allocations.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_optional_decimal, parse_timestamp};
use stockpile_core::allocation::StockpileAllocation;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::stockpile_allocations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockpileAllocationDB {
    pub id: String,
    pub subscription_id: String,
    pub product_id: String,
    pub monthly_amount: String,
    pub target_quantity: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<StockpileAllocationDB> for StockpileAllocation {
    type Error = StorageError;

    fn try_from(db: StockpileAllocationDB) -> Result<Self, Self::Error> {
        Ok(StockpileAllocation {
            monthly_amount: parse_decimal(
                "stockpile_allocations.monthly_amount",
                &db.monthly_amount,
            )?,
            target_quantity: parse_optional_decimal(
                "stockpile_allocations.target_quantity",
                db.target_quantity.as_deref(),
            )?,
            created_at: parse_timestamp("stockpile_allocations.created_at", &db.created_at)?,
            updated_at: parse_timestamp("stockpile_allocations.updated_at", &db.updated_at)?,
            id: db.id,
            subscription_id: db.subscription_id,
            product_id: db.product_id,
        })
    }
}
