//! Database models for stockpile rows and history entries.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_optional_timestamp, parse_timestamp};
use stockpile_core::catalog::Product;
use stockpile_core::stockpile::{HistoryChangeType, StockpileHistoryEntry, StockpileItem};

/// Database model for virtual stockpile rows
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::virtual_stockpile)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VirtualStockpileDB {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity_allocated: String,
    pub target_quantity: String,
    pub last_allocation_date: Option<String>,
    pub last_shipment_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl VirtualStockpileDB {
    /// Converts the row, joining in the product's labels and price.
    ///
    /// Rows whose product is missing from the catalog keep a zero price.
    pub fn into_item(self, product: Option<&Product>) -> Result<StockpileItem, StorageError> {
        Ok(StockpileItem {
            quantity_allocated: parse_decimal(
                "virtual_stockpile.quantity_allocated",
                &self.quantity_allocated,
            )?,
            target_quantity: parse_decimal(
                "virtual_stockpile.target_quantity",
                &self.target_quantity,
            )?,
            last_allocation_date: parse_optional_timestamp(
                "virtual_stockpile.last_allocation_date",
                self.last_allocation_date.as_deref(),
            )?,
            last_shipment_date: parse_optional_timestamp(
                "virtual_stockpile.last_shipment_date",
                self.last_shipment_date.as_deref(),
            )?,
            updated_at: parse_timestamp("virtual_stockpile.updated_at", &self.updated_at)?,
            unit_price: product.map(|p| p.price).unwrap_or_default(),
            product_name: product.map(|p| p.name.clone()),
            caliber: product.and_then(|p| p.caliber.clone()),
            image_url: product.and_then(|p| p.image_url.clone()),
            id: self.id,
            user_id: self.user_id,
            product_id: self.product_id,
        })
    }
}

/// Database model for stockpile history entries
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::stockpile_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockpileHistoryDB {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub change_type: String,
    pub quantity_change: String,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl StockpileHistoryDB {
    pub fn into_entry(self, product: Option<&Product>) -> Result<StockpileHistoryEntry, StorageError> {
        let change_type = self
            .change_type
            .parse::<HistoryChangeType>()
            .map_err(|e| StorageError::corrupt("stockpile_history.change_type", &self.change_type, e))?;
        Ok(StockpileHistoryEntry {
            quantity_change: parse_decimal(
                "stockpile_history.quantity_change",
                &self.quantity_change,
            )?,
            created_at: parse_timestamp("stockpile_history.created_at", &self.created_at)?,
            product_name: product.map(|p| p.name.clone()),
            caliber: product.and_then(|p| p.caliber.clone()),
            image_url: product.and_then(|p| p.image_url.clone()),
            id: self.id,
            product_id: self.product_id,
            change_type,
            reference_id: self.reference_id,
            notes: self.notes,
        })
    }
}
