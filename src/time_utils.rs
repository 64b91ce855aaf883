// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::SecondsFormat;

/// Format a stored BSON timestamp as RFC3339 (millisecond precision, `Z` suffix).
pub fn format_bson_datetime(date: bson::DateTime) -> String {
    date.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bson_datetime() {
        let date = bson::DateTime::from_millis(1_704_103_200_123);
        assert_eq!(format_bson_datetime(date), "2024-01-01T10:00:00.123Z");
    }
}
