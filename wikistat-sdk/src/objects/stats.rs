//! Daily counter lookup types.

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use super::language::LanguageCode;

/// `GET /api/v1/stats/{date}` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatsResponse {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    pub language: LanguageCode,
    pub change_count: i64,
    /// Unix seconds of the last committed increment.
    pub last_updated: i64,
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, time::error::Parse> {
    Date::parse(input, format_description!("[year]-[month]-[day]"))
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-09").unwrap(), date!(2024 - 03 - 09));
        assert!(parse_date("2024-3-9").is_err());
        assert!(parse_date("09.03.2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date!(2024 - 03 - 09)), "2024-03-09");
    }
}
