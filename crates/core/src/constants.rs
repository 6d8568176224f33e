use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Upper bound of every progress percentage.
pub const PROGRESS_CAP: Decimal = dec!(100);

/// Average price per round used to normalise value progress when no
/// other basis is configured.
pub const DEFAULT_AVERAGE_ROUND_PRICE: Decimal = dec!(0.5);

/// Page size for stockpile history when the caller does not ask for one.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Largest page of stockpile history served in one request.
pub const MAX_HISTORY_LIMIT: i64 = 100;
