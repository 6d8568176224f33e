//! Stockpile value and progress-to-target computation.
//!
//! Every percentage produced here is clamped to `[0, 100]`. Arithmetic
//! saturates instead of overflowing so extreme quantities still yield a
//! bounded summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::stockpile_model::{
    AverageRoundPrice, ProgressConfig, ProgressReport, StockpileItem, StockpileItemSummary,
    StockpileSummary,
};
use crate::constants::PROGRESS_CAP;

const PROGRESS_SCALE: u32 = 2;

/// Summarizes a user's stockpile rows.
pub fn summarize(
    items: &[StockpileItem],
    config: &ProgressConfig,
    now: DateTime<Utc>,
) -> ProgressReport {
    let mut summary = StockpileSummary::empty(now);
    let mut weighted_target_value = Decimal::ZERO;
    let mut item_summaries = Vec::with_capacity(items.len());

    for item in items {
        let item_summary = summarize_item(item);

        summary.total_value = summary.total_value.saturating_add(item_summary.value);
        summary.total_rounds = summary.total_rounds.saturating_add(item.quantity_allocated);
        summary.total_target = summary.total_target.saturating_add(item.target_quantity);
        weighted_target_value = weighted_target_value.saturating_add(
            non_negative(item.target_quantity).saturating_mul(non_negative(item.unit_price)),
        );

        item_summaries.push(item_summary);
    }

    summary.items = items.len();
    summary.rounds_progress = progress(summary.total_rounds, summary.total_target);

    let expected_value = match config.average_round_price {
        AverageRoundPrice::Fixed(price) => summary.total_target.saturating_mul(price),
        AverageRoundPrice::TargetWeighted => weighted_target_value,
    };
    summary.value_progress = if summary.total_target > Decimal::ZERO {
        progress(summary.total_value, expected_value)
    } else {
        Decimal::ZERO
    };

    ProgressReport {
        summary,
        items: item_summaries,
    }
}

pub fn summarize_item(item: &StockpileItem) -> StockpileItemSummary {
    StockpileItemSummary {
        id: item.id.clone(),
        product_id: item.product_id.clone(),
        name: item.product_name.clone(),
        caliber: item.caliber.clone(),
        image_url: item.image_url.clone(),
        quantity: item.quantity_allocated,
        target: item.target_quantity,
        price: item.unit_price,
        value: item.quantity_allocated.saturating_mul(item.unit_price),
        progress: progress(item.quantity_allocated, item.target_quantity),
        last_allocation: item.last_allocation_date,
        last_shipment: item.last_shipment_date,
    }
}

/// `min(100, current / target * 100)`, or zero when there is no positive target.
pub fn progress(current: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO || current <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let percent = current
        .checked_div(target)
        .and_then(|ratio| ratio.checked_mul(PROGRESS_CAP))
        // Only a ratio too large to represent can fail here
        .unwrap_or(PROGRESS_CAP);

    percent
        .clamp(Decimal::ZERO, PROGRESS_CAP)
        .round_dp(PROGRESS_SCALE)
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn item(product_id: &str, quantity: Decimal, target: Decimal, price: Decimal) -> StockpileItem {
        StockpileItem {
            id: format!("vs-{}", product_id),
            user_id: "user-1".to_string(),
            product_id: product_id.to_string(),
            product_name: None,
            caliber: None,
            image_url: None,
            quantity_allocated: quantity,
            target_quantity: target,
            unit_price: price,
            last_allocation_date: None,
            last_shipment_date: None,
            updated_at: now(),
        }
    }

    #[test]
    fn test_single_item_half_way() {
        let report = summarize(
            &[item("9mm", dec!(50), dec!(100), dec!(0.5))],
            &ProgressConfig::default(),
            now(),
        );

        assert_eq!(report.items[0].value, dec!(25));
        assert_eq!(report.items[0].progress, dec!(50));
        assert_eq!(report.summary.total_value, dec!(25));
        assert_eq!(report.summary.rounds_progress, dec!(50));
        assert_eq!(report.summary.value_progress, dec!(50));
        assert_eq!(report.summary.items, 1);
    }

    #[test]
    fn test_progress_is_capped_at_one_hundred() {
        let report = summarize(
            &[item("556", dec!(3000), dec!(1000), dec!(0.45))],
            &ProgressConfig::default(),
            now(),
        );
        assert_eq!(report.items[0].progress, dec!(100));
        assert_eq!(report.summary.rounds_progress, dec!(100));
        assert_eq!(report.summary.value_progress, dec!(100));
    }

    #[test]
    fn test_progress_is_rounded_to_two_places() {
        let report = summarize(
            &[item("9mm", dec!(1), dec!(3), dec!(0.5))],
            &ProgressConfig::default(),
            now(),
        );
        assert_eq!(report.items[0].progress, dec!(33.33));
        assert_eq!(report.summary.rounds_progress, dec!(33.33));
        // 0.5 / (3 * 0.5)
        assert_eq!(report.summary.value_progress, dec!(33.33));
    }

    #[test]
    fn test_zero_target_means_zero_progress() {
        let report = summarize(
            &[item("308", dec!(200), Decimal::ZERO, dec!(1.2))],
            &ProgressConfig::default(),
            now(),
        );
        assert_eq!(report.items[0].progress, Decimal::ZERO);
        assert_eq!(report.summary.rounds_progress, Decimal::ZERO);
        assert_eq!(report.summary.value_progress, Decimal::ZERO);
        assert_eq!(report.summary.total_value, dec!(240));
    }

    #[test]
    fn test_negative_inputs_do_not_produce_negative_progress() {
        let report = summarize(
            &[item("bad", dec!(-10), dec!(100), dec!(1))],
            &ProgressConfig::default(),
            now(),
        );
        assert_eq!(report.items[0].progress, Decimal::ZERO);
        assert_eq!(report.summary.rounds_progress, Decimal::ZERO);
        assert_eq!(report.summary.value_progress, Decimal::ZERO);
    }

    #[test]
    fn test_target_weighted_value_basis() {
        let items = [
            item("9mm", dec!(500), dec!(1000), dec!(0.30)),
            item("308", dec!(100), dec!(200), dec!(1.50)),
        ];
        let weighted = ProgressConfig {
            average_round_price: AverageRoundPrice::TargetWeighted,
        };

        let report = summarize(&items, &weighted, now());

        // value = 150 + 150, expected = 300 + 300
        assert_eq!(report.summary.total_value, dec!(300));
        assert_eq!(report.summary.value_progress, dec!(50));

        // The flat basis prices 1200 target rounds at 0.5 each
        let flat = summarize(&items, &ProgressConfig::default(), now());
        assert_eq!(flat.summary.value_progress, dec!(50));
        let cheap = summarize(
            &items,
            &ProgressConfig {
                average_round_price: AverageRoundPrice::Fixed(dec!(0.25)),
            },
            now(),
        );
        assert_eq!(cheap.summary.value_progress, dec!(100));
    }

    #[test]
    fn test_empty_stockpile() {
        let report = summarize(&[], &ProgressConfig::default(), now());
        assert_eq!(report.summary, StockpileSummary::empty(now()));
        assert!(report.items.is_empty());
    }

    #[test]
    fn test_progress_rounds_to_two_places() {
        assert_eq!(progress(dec!(1), dec!(3)), dec!(33.33));
    }
}
