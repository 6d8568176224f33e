//! Utility functions for SQLite storage operations.
//!
//! Decimals are stored as TEXT to keep their exact representation, and
//! timestamps as fixed-width RFC 3339 TEXT so that string comparison in SQL
//! orders them chronologically.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite's default SQLITE_MAX_VARIABLE_NUMBER is 999; 500 leaves room for
/// the other parameters of the statement.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::corrupt(column, value, e))
}

pub fn parse_optional_timestamp(
    column: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    value.map(|v| parse_timestamp(column, v)).transpose()
}

pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn parse_decimal(column: &str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value).map_err(|e| StorageError::corrupt(column, value, e))
}

pub fn parse_optional_decimal(
    column: &str,
    value: Option<&str>,
) -> Result<Option<Decimal>, StorageError> {
    value.map(|v| parse_decimal(column, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = format_timestamp(Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap());
        let later = format_timestamp(Utc.with_ymd_and_hms(2024, 10, 1, 8, 0, 0).unwrap());
        assert!(earlier < later);
        assert_eq!(earlier, "2024-09-01T08:00:00.000000Z");
        assert_eq!(
            parse_timestamp("created_at", &earlier).unwrap(),
            Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_decimal_text_is_exact() {
        assert_eq!(format_decimal(dec!(20.500)), "20.5");
        assert_eq!(parse_decimal("price", "0.3333").unwrap(), dec!(0.3333));
        assert!(parse_decimal("price", "abc").is_err());
    }
}
