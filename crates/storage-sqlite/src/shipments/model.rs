//! Database models for shipments and their items.

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_timestamp};
use stockpile_core::shipments::{Shipment, ShipmentItem, ShipmentStatus};
use stockpile_core::subscriptions::ShippingAddress;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::shipments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ShipmentDB {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub tracking_number: Option<String>,
    /// JSON-encoded `ShippingAddress`
    pub shipping_address: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, Associations, PartialEq, Debug, Clone)]
#[diesel(belongs_to(ShipmentDB, foreign_key = shipment_id))]
#[diesel(table_name = crate::schema::shipment_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ShipmentItemDB {
    pub id: String,
    pub shipment_id: String,
    pub product_id: String,
    pub quantity: String,
    pub price_per_unit: String,
}

impl TryFrom<ShipmentItemDB> for ShipmentItem {
    type Error = StorageError;

    fn try_from(db: ShipmentItemDB) -> Result<Self, Self::Error> {
        Ok(ShipmentItem {
            quantity: parse_decimal("shipment_items.quantity", &db.quantity)?,
            price_per_unit: parse_decimal("shipment_items.price_per_unit", &db.price_per_unit)?,
            id: db.id,
            shipment_id: db.shipment_id,
            product_id: db.product_id,
        })
    }
}

impl ShipmentDB {
    /// Builds the domain shipment; totals are derived from `items`.
    pub fn into_shipment(self, items: Vec<ShipmentItemDB>) -> Result<Shipment, StorageError> {
        let status = self
            .status
            .parse::<ShipmentStatus>()
            .map_err(|e| StorageError::corrupt("shipments.status", &self.status, e))?;
        let shipping_address = serde_json::from_str::<ShippingAddress>(&self.shipping_address)?;
        let items = items
            .into_iter()
            .map(ShipmentItem::try_from)
            .collect::<Result<Vec<_>, StorageError>>()?;

        let total_rounds = items
            .iter()
            .fold(Decimal::ZERO, |total, i| total.saturating_add(i.quantity));
        let total_value = items.iter().fold(Decimal::ZERO, |total, i| {
            total.saturating_add(i.quantity.saturating_mul(i.price_per_unit))
        });

        Ok(Shipment {
            created_at: parse_timestamp("shipments.created_at", &self.created_at)?,
            updated_at: parse_timestamp("shipments.updated_at", &self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            status,
            tracking_number: self.tracking_number,
            shipping_address,
            notes: self.notes,
            total_rounds,
            total_value,
            items,
        })
    }
}
