//! Allocation domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One caliber/accessory line of an allocation batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    #[serde(default)]
    pub product_id: String,
    pub amount: Option<Decimal>,
    /// Optional stockpile goal for the product, stored alongside the quantity.
    #[serde(default)]
    pub target_quantity: Option<Decimal>,
}

impl AllocationRequest {
    pub fn new(product_id: impl Into<String>, amount: Decimal) -> Self {
        AllocationRequest {
            product_id: product_id.into(),
            amount: Some(amount),
            target_quantity: None,
        }
    }

    /// The amount, if the line is well formed (non-empty product, amount >= 0).
    pub fn valid_amount(&self) -> Option<Decimal> {
        if self.product_id.trim().is_empty() {
            return None;
        }
        self.amount.filter(|amount| !amount.is_sign_negative())
    }
}

/// Outcome of one successfully processed allocation line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub product_id: String,
    pub amount: Decimal,
    /// `amount / unitPrice`
    pub quantity: Decimal,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub target_quantity: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AllocationErrorKind {
    /// No catalog entry for the product id.
    ProductNotFound,
    /// The product exists but its unit price cannot produce a quantity.
    InvalidProduct,
    /// Missing product id, missing amount, or negative amount.
    InvalidAllocation,
}

/// A per-item failure. Does not abort the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationItemError {
    pub product_id: String,
    pub kind: AllocationErrorKind,
    pub error: String,
}

impl AllocationItemError {
    pub fn new(product_id: &str, kind: AllocationErrorKind, error: impl Into<String>) -> Self {
        AllocationItemError {
            product_id: product_id.to_string(),
            kind,
            error: error.into(),
        }
    }
}

/// Result of running the allocation engine over a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub results: Vec<AllocationResult>,
    pub errors: Vec<AllocationItemError>,
    /// Sum of every well-formed requested amount.
    pub total_requested: Decimal,
    /// Sum of the amounts that produced a result.
    pub total_allocated: Decimal,
    /// `budget - total_allocated`
    pub remaining_budget: Decimal,
}

/// Envelope returned for an allocation batch.
///
/// `success` means the batch was processed; individual lines may still
/// appear in `errors`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationBatchResponse {
    pub success: bool,
    pub results: Vec<AllocationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<AllocationItemError>>,
    pub next_allocation_date: DateTime<Utc>,
    pub remaining_budget: Decimal,
}

/// Persisted monthly amount for one product of a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockpileAllocation {
    pub id: String,
    pub subscription_id: String,
    pub product_id: String,
    pub monthly_amount: Decimal,
    pub target_quantity: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage instruction derived from a successful allocation result.
///
/// The monthly amount replaces the stored allocation; the quantity is added
/// to the user's stockpile.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationWrite {
    pub product_id: String,
    pub monthly_amount: Decimal,
    pub quantity_delta: Decimal,
    pub target_quantity: Option<Decimal>,
}

impl From<&AllocationResult> for AllocationWrite {
    fn from(result: &AllocationResult) -> Self {
        AllocationWrite {
            product_id: result.product_id.clone(),
            monthly_amount: result.amount,
            quantity_delta: result.quantity,
            target_quantity: result.target_quantity,
        }
    }
}

/// Summary of one pass of the recurring allocation scheduler.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledAllocationSummary {
    pub subscriptions_processed: usize,
    pub items_allocated: usize,
    pub failures: usize,
}
