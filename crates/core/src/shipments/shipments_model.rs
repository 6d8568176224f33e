//! Shipment domain models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::subscriptions::ShippingAddress;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Processing => "processing",
            ShipmentStatus::Shipped => "shipped",
            ShipmentStatus::Delivered => "delivered",
        }
    }
}

impl FromStr for ShipmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ShipmentStatus::Pending),
            "processing" => Ok(ShipmentStatus::Processing),
            "shipped" => Ok(ShipmentStatus::Shipped),
            "delivered" => Ok(ShipmentStatus::Delivered),
            other => Err(Error::invalid_input(format!(
                "Unknown shipment status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItemRequest {
    #[serde(default)]
    pub product_id: String,
    pub quantity: Decimal,
    /// Falls back to the catalog price when omitted.
    pub price_per_unit: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    #[serde(default)]
    pub items: Vec<ShipmentItemRequest>,
    pub shipping_address: Option<ShippingAddress>,
    pub notes: Option<String>,
}

/// Validated shipment handed to the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShipment {
    pub user_id: String,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub items: Vec<NewShipmentItem>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShipmentItem {
    pub product_id: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    pub id: String,
    pub shipment_id: String,
    pub product_id: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub user_id: String,
    pub status: ShipmentStatus,
    pub tracking_number: Option<String>,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub total_rounds: Decimal,
    pub total_value: Decimal,
    pub items: Vec<ShipmentItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
