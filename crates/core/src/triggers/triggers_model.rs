//! Shipment trigger domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    /// Fires when the stockpile value reaches the threshold.
    Budget,
    /// Fires when the number of rounds reaches the threshold.
    Quantity,
    /// Never fires on its own; recorded when the user asks for a shipment.
    Manual,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Budget => "budget",
            TriggerType::Quantity => "quantity",
            TriggerType::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "budget" => Ok(TriggerType::Budget),
            "quantity" => Ok(TriggerType::Quantity),
            "manual" => Ok(TriggerType::Manual),
            _ => Err(Error::invalid_input(
                "Invalid trigger type. Must be one of: budget, quantity, manual",
            )),
        }
    }
}

/// A user's shipment rule. At most one per `(user, trigger_type)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentTrigger {
    pub id: String,
    pub user_id: String,
    pub trigger_type: TriggerType,
    pub threshold_value: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trigger configuration as posted by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerInput {
    #[serde(default)]
    pub trigger_type: String,
    pub threshold_value: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl TriggerInput {
    /// Parses the type and normalizes the threshold.
    ///
    /// Manual triggers always store a zero threshold; other thresholds are
    /// floored at zero. A missing `is_active` means active.
    pub fn normalize(&self) -> Result<(TriggerType, Decimal, bool)> {
        let trigger_type: TriggerType = self.trigger_type.trim().parse()?;
        let threshold = match trigger_type {
            TriggerType::Manual => Decimal::ZERO,
            _ => self
                .threshold_value
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO),
        };
        Ok((trigger_type, threshold, self.is_active.unwrap_or(true)))
    }
}

/// Whether the stockpile should ship now, and which trigger types say so.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentReadiness {
    pub ready: bool,
    pub reasons: Vec<TriggerType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(trigger_type: &str, threshold: Option<Decimal>, active: Option<bool>) -> TriggerInput {
        TriggerInput {
            trigger_type: trigger_type.to_string(),
            threshold_value: threshold,
            is_active: active,
        }
    }

    #[test]
    fn test_manual_threshold_is_forced_to_zero() {
        let (kind, threshold, active) = input("manual", Some(dec!(250)), None)
            .normalize()
            .unwrap();
        assert_eq!(kind, TriggerType::Manual);
        assert_eq!(threshold, Decimal::ZERO);
        assert!(active);
    }

    #[test]
    fn test_negative_threshold_is_floored() {
        let (_, threshold, active) = input("quantity", Some(dec!(-5)), Some(false))
            .normalize()
            .unwrap();
        assert_eq!(threshold, Decimal::ZERO);
        assert!(!active);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = input("weekly", Some(dec!(1)), None).normalize().unwrap_err();
        assert!(err.to_string().contains("budget, quantity, manual"));
    }
}
