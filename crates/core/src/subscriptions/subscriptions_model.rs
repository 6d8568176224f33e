//! Subscription and onboarding domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(Error::invalid_input(format!(
                "Unknown subscription status '{}'",
                other
            ))),
        }
    }
}

/// How often a subscription's monthly allocations are replayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AllocationFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
}

impl AllocationFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationFrequency::Weekly => "weekly",
            AllocationFrequency::Biweekly => "biweekly",
            AllocationFrequency::Monthly => "monthly",
        }
    }

    /// Parses a stored frequency, falling back to monthly for anything unknown.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("weekly") => AllocationFrequency::Weekly,
            Some("biweekly") => AllocationFrequency::Biweekly,
            _ => AllocationFrequency::Monthly,
        }
    }

    /// Next evaluation date after `from`.
    ///
    /// Monthly steps land on the same day of the next calendar month, clamped
    /// to that month's last day (Jan 31 -> Feb 28/29).
    pub fn advance(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            AllocationFrequency::Weekly => from + Duration::days(7),
            AllocationFrequency::Biweekly => from + Duration::days(14),
            AllocationFrequency::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or_else(|| from + Duration::days(30)),
        }
    }
}

impl fmt::Display for AllocationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("street1", &self.street1),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::missing_field(format!("shippingAddress.{}", field)));
            }
        }
        Ok(())
    }
}

/// Domain model representing a user's subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub monthly_budget: Decimal,
    pub status: SubscriptionStatus,
    pub allocation_frequency: AllocationFrequency,
    pub next_allocation_date: Option<DateTime<Utc>>,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// A caliber or accessory picked during onboarding, with its share of the budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaliberSelection {
    /// Product identifier
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub monthly_amount: Decimal,
    pub target_quantity: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub calibers: Vec<CaliberSelection>,
    pub monthly_budget: Option<Decimal>,
    #[serde(default)]
    pub accessories: Vec<CaliberSelection>,
    pub shipping_address: Option<ShippingAddress>,
    pub allocation_frequency: Option<AllocationFrequency>,
}

/// Validated onboarding data handed to the repository in one piece.
#[derive(Debug, Clone)]
pub struct OnboardingRecord {
    pub user_id: String,
    pub monthly_budget: Decimal,
    pub allocation_frequency: AllocationFrequency,
    pub next_allocation_date: DateTime<Utc>,
    pub shipping_address: ShippingAddress,
    pub selections: Vec<CaliberSelection>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResult {
    pub subscription: Subscription,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_weekly_and_biweekly_advance() {
        let from = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(
            AllocationFrequency::Weekly.advance(from),
            Utc.with_ymd_and_hms(2024, 3, 17, 12, 0, 0).unwrap()
        );
        assert_eq!(
            AllocationFrequency::Biweekly.advance(from),
            Utc.with_ymd_and_hms(2024, 3, 24, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_monthly_advance_clamps_to_month_end() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 0).unwrap();
        assert_eq!(
            AllocationFrequency::Monthly.advance(from),
            Utc.with_ymd_and_hms(2024, 2, 29, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_unknown_frequency_defaults_to_monthly() {
        assert_eq!(
            AllocationFrequency::parse_or_default(Some("fortnightly")),
            AllocationFrequency::Monthly
        );
        assert_eq!(
            AllocationFrequency::parse_or_default(None),
            AllocationFrequency::Monthly
        );
        assert_eq!(
            AllocationFrequency::parse_or_default(Some("Weekly")),
            AllocationFrequency::Weekly
        );
    }

    #[test]
    fn test_shipping_address_requires_core_fields() {
        let mut address = ShippingAddress {
            street1: "1 Range Rd".to_string(),
            street2: None,
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "78701".to_string(),
            country: "US".to_string(),
        };
        assert!(address.validate().is_ok());

        address.postal_code = "  ".to_string();
        let err = address.validate().unwrap_err();
        assert!(err.to_string().contains("shippingAddress.postalCode"));
    }
}
