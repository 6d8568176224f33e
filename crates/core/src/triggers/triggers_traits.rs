use crate::errors::Result;
use crate::triggers::triggers_model::{
    ShipmentReadiness, ShipmentTrigger, TriggerInput, TriggerType,
};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for shipment trigger repository operations
#[async_trait]
pub trait TriggerRepositoryTrait: Send + Sync {
    fn get_triggers(&self, user_id: &str) -> Result<Vec<ShipmentTrigger>>;

    /// Inserts or updates the user's single trigger of `trigger_type`.
    async fn upsert_trigger(
        &self,
        user_id: &str,
        trigger_type: TriggerType,
        threshold_value: Decimal,
        is_active: bool,
    ) -> Result<ShipmentTrigger>;

    /// Deletes the trigger when it belongs to `user_id`; `None` otherwise.
    async fn delete_trigger(
        &self,
        user_id: &str,
        trigger_id: &str,
    ) -> Result<Option<ShipmentTrigger>>;
}

/// Trait for shipment trigger service operations
#[async_trait]
pub trait TriggerServiceTrait: Send + Sync {
    fn get_triggers(&self, user_id: &str) -> Result<Vec<ShipmentTrigger>>;
    async fn upsert_trigger(&self, user_id: &str, input: TriggerInput) -> Result<ShipmentTrigger>;
    async fn delete_trigger(&self, user_id: &str, trigger_id: &str) -> Result<ShipmentTrigger>;
    fn evaluate_for_user(&self, user_id: &str) -> Result<ShipmentReadiness>;
}
