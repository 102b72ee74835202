//! Aggregation granularity for grouped travel queries.

use serde::Serialize;
use std::str::FromStr;

/// Closed set of grouping granularities. Each variant maps to a fixed SQL
/// template in the repository; user input never reaches the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Year,
    Month,
    Week,
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(Period::Year),
            "month" => Ok(Period::Month),
            "week" => Ok(Period::Week),
            _ => Err(()),
        }
    }
}

/// One aggregated row: count and sum of amounts for a single period bucket.
///
/// `year` is present for month/week grouping and absent for year grouping.
/// `total_amount` stays `null` if the datastore returns a NULL sum; it is
/// never defaulted to 0.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupedPeriodRow {
    pub period_key: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    pub travel_count: i64,
    pub total_amount: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_periods() {
        assert_eq!("year".parse::<Period>(), Ok(Period::Year));
        assert_eq!("month".parse::<Period>(), Ok(Period::Month));
        assert_eq!("week".parse::<Period>(), Ok(Period::Week));
    }

    #[test]
    fn rejects_unknown_periods() {
        assert!("day".parse::<Period>().is_err());
        assert!("YEAR".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn year_row_serializes_without_year_field() {
        let row = GroupedPeriodRow {
            period_key: 2024,
            year: None,
            travel_count: 3,
            total_amount: Some(450),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("year").is_none());
        assert_eq!(json["period_key"], 2024);
        assert_eq!(json["travel_count"], 3);
        assert_eq!(json["total_amount"], 450);
    }

    #[test]
    fn null_total_amount_is_preserved() {
        let row = GroupedPeriodRow {
            period_key: 5,
            year: Some(2024),
            travel_count: 0,
            total_amount: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["total_amount"].is_null());
        assert_eq!(json["year"], 2024);
    }
}
