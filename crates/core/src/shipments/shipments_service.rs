use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;

use super::shipments_model::{NewShipment, NewShipmentItem, Shipment, ShipmentRequest};
use super::shipments_traits::{ShipmentRepositoryTrait, ShipmentServiceTrait};
use crate::catalog::CatalogServiceTrait;
use crate::errors::{Error, Result};

pub struct ShipmentService {
    repository: Arc<dyn ShipmentRepositoryTrait>,
    catalog_service: Arc<dyn CatalogServiceTrait>,
}

impl ShipmentService {
    pub fn new(
        repository: Arc<dyn ShipmentRepositoryTrait>,
        catalog_service: Arc<dyn CatalogServiceTrait>,
    ) -> Self {
        ShipmentService {
            repository,
            catalog_service,
        }
    }

    fn build_shipment(
        &self,
        user_id: &str,
        request: ShipmentRequest,
        now: DateTime<Utc>,
    ) -> Result<NewShipment> {
        if request.items.is_empty() {
            return Err(Error::invalid_input(
                "At least one item is required for shipment",
            ));
        }
        let shipping_address = request
            .shipping_address
            .ok_or_else(|| Error::missing_field("shippingAddress"))?;
        shipping_address.validate()?;

        let mut seen = HashSet::new();
        for item in &request.items {
            let product_id = item.product_id.trim();
            if product_id.is_empty() {
                return Err(Error::missing_field("items.productId"));
            }
            if item.quantity <= Decimal::ZERO {
                return Err(Error::invalid_input(format!(
                    "Quantity for product '{}' must be greater than zero",
                    product_id
                )));
            }
            if item.price_per_unit.is_some_and(|p| p.is_sign_negative()) {
                return Err(Error::invalid_input(format!(
                    "Price per unit for product '{}' cannot be negative",
                    product_id
                )));
            }
            if !seen.insert(product_id.to_string()) {
                return Err(Error::invalid_input(format!(
                    "Product '{}' appears more than once in the shipment",
                    product_id
                )));
            }
        }

        let unpriced: Vec<String> = request
            .items
            .iter()
            .filter(|i| i.price_per_unit.is_none())
            .map(|i| i.product_id.trim().to_string())
            .collect();
        let catalog = self.catalog_service.price_catalog(&unpriced)?;

        let items = request
            .items
            .into_iter()
            .map(|item| {
                let product_id = item.product_id.trim().to_string();
                let price_per_unit = match item.price_per_unit {
                    Some(price) => price,
                    None => catalog.unit_price(&product_id).ok_or_else(|| {
                        Error::NotFound(format!("Product '{}' not found", product_id))
                    })?,
                };
                Ok(NewShipmentItem {
                    product_id,
                    quantity: item.quantity,
                    price_per_unit,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| {
                item.quantity
                    .checked_mul(item.price_per_unit)
                    .and_then(|value| total.checked_add(value))
            })
            .ok_or_else(|| Error::invalid_input("Shipment value is out of range"))?;

        Ok(NewShipment {
            user_id: user_id.to_string(),
            shipping_address,
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            items,
            requested_at: now,
        })
    }
}

#[async_trait]
impl ShipmentServiceTrait for ShipmentService {
    async fn request_shipment(
        &self,
        user_id: &str,
        request: ShipmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Shipment> {
        let new_shipment = self.build_shipment(user_id, request, now)?;
        let shipment = self.repository.create_shipment(new_shipment).await?;
        info!(
            "Created shipment {} for user {} ({} rounds, value {})",
            shipment.id, user_id, shipment.total_rounds, shipment.total_value
        );
        Ok(shipment)
    }

    fn get_shipments(&self, user_id: &str) -> Result<Vec<Shipment>> {
        self.repository.get_shipments(user_id)
    }
}
