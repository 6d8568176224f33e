//! Virtual stockpile domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AVERAGE_ROUND_PRICE, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::errors::{Error, Result};
use crate::triggers::{ShipmentReadiness, ShipmentTrigger};

/// Accumulated quantity of one product for one user.
///
/// `unit_price` and the product labels are joined in from the catalog when
/// the row is read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockpileItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub caliber: Option<String>,
    pub image_url: Option<String>,
    pub quantity_allocated: Decimal,
    pub target_quantity: Decimal,
    pub unit_price: Decimal,
    pub last_allocation_date: Option<DateTime<Utc>>,
    pub last_shipment_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// One stockpile row with its computed value and progress.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockpileItemSummary {
    pub id: String,
    pub product_id: String,
    pub name: Option<String>,
    pub caliber: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Decimal,
    pub target: Decimal,
    pub price: Decimal,
    /// `quantity * price`
    pub value: Decimal,
    /// Percentage of `target` reached, within `[0, 100]`.
    pub progress: Decimal,
    pub last_allocation: Option<DateTime<Utc>>,
    pub last_shipment: Option<DateTime<Utc>>,
}

/// Aggregate over all of a user's stockpile rows. Recomputed on every read.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockpileSummary {
    pub total_value: Decimal,
    pub total_rounds: Decimal,
    pub total_target: Decimal,
    pub value_progress: Decimal,
    pub rounds_progress: Decimal,
    pub items: usize,
    pub last_updated: DateTime<Utc>,
}

impl StockpileSummary {
    pub fn empty(now: DateTime<Utc>) -> Self {
        StockpileSummary {
            total_value: Decimal::ZERO,
            total_rounds: Decimal::ZERO,
            total_target: Decimal::ZERO,
            value_progress: Decimal::ZERO,
            rounds_progress: Decimal::ZERO,
            items: 0,
            last_updated: now,
        }
    }
}

/// Summary together with the per-item breakdown it was built from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub summary: StockpileSummary,
    pub items: Vec<StockpileItemSummary>,
}

/// Basis for turning the total target into an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageRoundPrice {
    /// A flat price per round applied to the total target.
    Fixed(Decimal),
    /// Each item's target valued at its own unit price.
    TargetWeighted,
}

impl Default for AverageRoundPrice {
    fn default() -> Self {
        AverageRoundPrice::Fixed(DEFAULT_AVERAGE_ROUND_PRICE)
    }
}

impl FromStr for AverageRoundPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("weighted") {
            return Ok(AverageRoundPrice::TargetWeighted);
        }
        let price = Decimal::from_str(value).map_err(|_| {
            Error::invalid_input(format!(
                "Average round price must be a decimal or 'weighted', got '{}'",
                value
            ))
        })?;
        if price <= Decimal::ZERO {
            return Err(Error::invalid_input(
                "Average round price must be greater than zero",
            ));
        }
        Ok(AverageRoundPrice::Fixed(price))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressConfig {
    pub average_round_price: AverageRoundPrice,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryChangeType {
    Allocation,
    Shipment,
    Adjustment,
}

impl HistoryChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryChangeType::Allocation => "allocation",
            HistoryChangeType::Shipment => "shipment",
            HistoryChangeType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for HistoryChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryChangeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allocation" => Ok(HistoryChangeType::Allocation),
            "shipment" => Ok(HistoryChangeType::Shipment),
            "adjustment" => Ok(HistoryChangeType::Adjustment),
            other => Err(Error::invalid_input(format!(
                "Invalid change type '{}'. Must be one of: allocation, shipment, adjustment",
                other
            ))),
        }
    }
}

/// A single quantity movement in a user's stockpile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockpileHistoryEntry {
    pub id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub caliber: Option<String>,
    pub image_url: Option<String>,
    /// Positive for allocations, negative for shipments.
    pub quantity_change: Decimal,
    pub change_type: HistoryChangeType,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// History query as received from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub product_id: Option<String>,
    pub change_type: Option<String>,
}

impl HistoryQuery {
    /// Applies paging defaults and bounds and parses the change type filter.
    pub fn resolve(&self) -> Result<HistoryFilter> {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        let change_type = match self.change_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse()?),
        };
        let product_id = self
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(HistoryFilter {
            limit,
            offset,
            product_id,
            change_type,
        })
    }
}

/// Validated history filter handed to the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    pub limit: i64,
    pub offset: i64,
    pub product_id: Option<String>,
    pub change_type: Option<HistoryChangeType>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        Pagination {
            total,
            limit,
            offset,
            has_more: total > offset + limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub items: Vec<StockpileHistoryEntry>,
    pub pagination: Pagination,
}

/// Everything the dashboard shows about a stockpile in one payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockpileOverview {
    pub summary: StockpileSummary,
    pub items: Vec<StockpileItemSummary>,
    /// Active triggers only.
    pub triggers: Vec<ShipmentTrigger>,
    pub readiness: ShipmentReadiness,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_history_query_defaults_and_bounds() {
        let filter = HistoryQuery::default().resolve().unwrap();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert!(filter.change_type.is_none());

        let filter = HistoryQuery {
            limit: Some(500),
            offset: Some(-3),
            product_id: Some("  ".to_string()),
            change_type: Some("shipment".to_string()),
        }
        .resolve()
        .unwrap();
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.offset, 0);
        assert!(filter.product_id.is_none());
        assert_eq!(filter.change_type, Some(HistoryChangeType::Shipment));
    }

    #[test]
    fn test_history_query_rejects_unknown_change_type() {
        let query = HistoryQuery {
            change_type: Some("refund".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.resolve(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_pagination_has_more() {
        assert!(Pagination::new(120, 50, 50).has_more);
        assert!(!Pagination::new(100, 50, 50).has_more);
    }

    #[test]
    fn test_average_round_price_parsing() {
        assert_eq!(
            "weighted".parse::<AverageRoundPrice>().unwrap(),
            AverageRoundPrice::TargetWeighted
        );
        assert_eq!(
            "0.42".parse::<AverageRoundPrice>().unwrap(),
            AverageRoundPrice::Fixed(dec!(0.42))
        );
        assert!("0".parse::<AverageRoundPrice>().is_err());
        assert!("cheap".parse::<AverageRoundPrice>().is_err());
    }
}
