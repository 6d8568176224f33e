//! Shipment readiness from a set of trigger rules.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use super::triggers_model::{ShipmentReadiness, ShipmentTrigger, TriggerType};
use crate::stockpile::StockpileSummary;

/// Checks every active trigger against `summary`.
///
/// `reasons` holds each fired trigger type once, in a stable order. Manual
/// triggers never fire here.
pub fn evaluate(triggers: &[ShipmentTrigger], summary: &StockpileSummary) -> ShipmentReadiness {
    let reasons: BTreeSet<TriggerType> = triggers
        .iter()
        .filter(|t| t.is_active && fires(t, summary))
        .map(|t| t.trigger_type)
        .collect();

    ShipmentReadiness {
        ready: !reasons.is_empty(),
        reasons: reasons.into_iter().collect(),
    }
}

fn fires(trigger: &ShipmentTrigger, summary: &StockpileSummary) -> bool {
    let observed: Decimal = match trigger.trigger_type {
        TriggerType::Budget => summary.total_value,
        TriggerType::Quantity => summary.total_rounds,
        TriggerType::Manual => return false,
    };
    observed >= trigger.threshold_value
}
