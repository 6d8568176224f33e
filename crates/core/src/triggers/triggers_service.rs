use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::trigger_evaluator;
use super::triggers_model::{ShipmentReadiness, ShipmentTrigger, TriggerInput};
use super::triggers_traits::{TriggerRepositoryTrait, TriggerServiceTrait};
use crate::errors::{Error, Result};
use crate::stockpile::StockpileServiceTrait;

pub struct TriggerService {
    repository: Arc<dyn TriggerRepositoryTrait>,
    stockpile_service: Arc<dyn StockpileServiceTrait>,
}

impl TriggerService {
    pub fn new(
        repository: Arc<dyn TriggerRepositoryTrait>,
        stockpile_service: Arc<dyn StockpileServiceTrait>,
    ) -> Self {
        TriggerService {
            repository,
            stockpile_service,
        }
    }
}

#[async_trait]
impl TriggerServiceTrait for TriggerService {
    fn get_triggers(&self, user_id: &str) -> Result<Vec<ShipmentTrigger>> {
        self.repository.get_triggers(user_id)
    }

    async fn upsert_trigger(&self, user_id: &str, input: TriggerInput) -> Result<ShipmentTrigger> {
        let (trigger_type, threshold, is_active) = input.normalize()?;
        let trigger = self
            .repository
            .upsert_trigger(user_id, trigger_type, threshold, is_active)
            .await?;
        info!(
            "Saved {} trigger for user {} (threshold {}, active {})",
            trigger_type, user_id, threshold, is_active
        );
        Ok(trigger)
    }

    async fn delete_trigger(&self, user_id: &str, trigger_id: &str) -> Result<ShipmentTrigger> {
        if trigger_id.trim().is_empty() {
            return Err(Error::missing_field("id"));
        }
        self.repository
            .delete_trigger(user_id, trigger_id)
            .await?
            .ok_or_else(|| Error::NotFound("Trigger not found or access denied".to_string()))
    }

    fn evaluate_for_user(&self, user_id: &str) -> Result<ShipmentReadiness> {
        let report = self.stockpile_service.get_progress(user_id)?;
        let triggers = self.repository.get_triggers(user_id)?;
        Ok(trigger_evaluator::evaluate(&triggers, &report.summary))
    }
}
