use crate::errors::Result;
use crate::shipments::shipments_model::{NewShipment, Shipment, ShipmentRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for shipment repository operations
#[async_trait]
pub trait ShipmentRepositoryTrait: Send + Sync {
    /// Deducts every item from the user's stockpile and records a pending
    /// shipment, all or nothing.
    ///
    /// Fails with `ConstraintViolation` when any item asks for more than the
    /// stockpile holds.
    async fn create_shipment(&self, shipment: NewShipment) -> Result<Shipment>;

    /// The user's shipments, newest first.
    fn get_shipments(&self, user_id: &str) -> Result<Vec<Shipment>>;
}

/// Trait for shipment service operations
#[async_trait]
pub trait ShipmentServiceTrait: Send + Sync {
    async fn request_shipment(
        &self,
        user_id: &str,
        request: ShipmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Shipment>;
    fn get_shipments(&self, user_id: &str) -> Result<Vec<Shipment>>;
}
