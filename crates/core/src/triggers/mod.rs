//! Triggers module - shipment rules and readiness evaluation.

mod trigger_evaluator;
mod triggers_model;
mod triggers_service;
mod triggers_traits;

pub use trigger_evaluator::evaluate;
pub use triggers_model::{ShipmentReadiness, ShipmentTrigger, TriggerInput, TriggerType};
pub use triggers_service::TriggerService;
pub use triggers_traits::{TriggerRepositoryTrait, TriggerServiceTrait};
