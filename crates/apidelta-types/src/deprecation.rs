//! Deprecation metadata and sunset dates.
//!
//! The sunset date of a deprecated operation or property is carried as the
//! raw `x-sunset` extension value. It is interpreted here, not by the diff
//! engine, which only records value transitions.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::TypeError;

/// Extension key holding the sunset date.
pub const SUNSET_EXTENSION: &str = "x-sunset";

/// Deprecation state of an operation or property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeprecationState {
    NotDeprecated,
    WithoutSunset,
    WithSunset(NaiveDate),
    /// Deprecated with a sunset value that is not a date.
    InvalidSunset(String),
}

impl DeprecationState {
    pub fn of(deprecated: bool, sunset: Option<&Value>) -> Self {
        if !deprecated {
            return Self::NotDeprecated;
        }
        match sunset {
            None => Self::WithoutSunset,
            Some(value) => match parse_sunset(value) {
                Ok(date) => Self::WithSunset(date),
                Err(_) => Self::InvalidSunset(raw_string(value)),
            },
        }
    }

    pub fn is_deprecated(&self) -> bool {
        !matches!(self, Self::NotDeprecated)
    }

    /// Returns `true` if the element is deprecated and its sunset date is on
    /// or before `today`, so removing it no longer breaks anyone.
    pub fn sunset_passed(&self, today: NaiveDate) -> bool {
        matches!(self, Self::WithSunset(date) if *date <= today)
    }
}

/// Parse a sunset value: a `YYYY-MM-DD` date or an RFC 3339 timestamp.
pub fn parse_sunset(value: &Value) -> Result<NaiveDate, TypeError> {
    let raw = value.as_str().ok_or_else(|| TypeError::InvalidSunset {
        value: value.to_string(),
        reason: "expected a string".into(),
    })?;

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| TypeError::InvalidSunset {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn raw_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_date() {
        assert_eq!(parse_sunset(&json!("2031-04-05")).unwrap(), date(2031, 4, 5));
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        assert_eq!(
            parse_sunset(&json!("2031-04-05T10:00:00Z")).unwrap(),
            date(2031, 4, 5)
        );
    }

    #[test]
    fn rejects_non_dates() {
        assert!(parse_sunset(&json!("next week")).is_err());
        assert!(parse_sunset(&json!(20310405)).is_err());
    }

    #[test]
    fn states() {
        assert_eq!(DeprecationState::of(false, Some(&json!("2030-01-01"))), DeprecationState::NotDeprecated);
        assert_eq!(DeprecationState::of(true, None), DeprecationState::WithoutSunset);
        assert_eq!(
            DeprecationState::of(true, Some(&json!("2030-01-01"))),
            DeprecationState::WithSunset(date(2030, 1, 1))
        );
        assert_eq!(
            DeprecationState::of(true, Some(&json!("soon"))),
            DeprecationState::InvalidSunset("soon".into())
        );
    }

    #[test]
    fn sunset_passed_is_inclusive() {
        let today = date(2030, 1, 1);
        assert!(DeprecationState::WithSunset(date(2029, 12, 31)).sunset_passed(today));
        assert!(DeprecationState::WithSunset(today).sunset_passed(today));
        assert!(!DeprecationState::WithSunset(date(2030, 1, 2)).sunset_passed(today));
        assert!(!DeprecationState::WithoutSunset.sunset_passed(today));
        assert!(!DeprecationState::NotDeprecated.sunset_passed(today));
    }
}
