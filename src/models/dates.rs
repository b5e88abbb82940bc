//! Calendar date helpers shared by the borrowing and user models
//!
//! Optional dates are `Option<NaiveDate>` everywhere inside the server. The
//! legacy zero date `0000-00-00` only exists on the JSON boundary, where older
//! clients send it (or an empty string) to mean "no date" and expect it back
//! for dates that were never set.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::{AppError, AppResult};

/// Placeholder rendered for unset dates
pub const ZERO_DATE: &str = "0000-00-00";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a client supplied date, treating `""` and the zero date as "no date".
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// RFC 3339 timestamps; the time part is dropped.
pub fn parse_optional_date(field: &str, value: &str) -> AppResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() || value == ZERO_DATE {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(Some(date));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(datetime.date()));
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(datetime.date_naive()));
    }

    Err(AppError::Validation(format!(
        "Invalid date for {}: '{}' (expected YYYY-MM-DD)",
        field, value
    )))
}

/// Parse a date that must be present and non-empty
pub fn parse_required_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    parse_optional_date(field, value)?
        .ok_or_else(|| AppError::Validation(format!("{} must be a date", field)))
}

/// Count dates per calendar month, all years collapsed. Index 0 is January.
pub fn monthly_counts<I>(dates: I) -> [i64; 12]
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut buckets = [0i64; 12];
    for date in dates {
        buckets[date.month0() as usize] += 1;
    }
    buckets
}

/// Serde adapter writing `None` as the legacy zero date
pub mod legacy_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_optional_date, DATE_FORMAT, ZERO_DATE};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_str(ZERO_DATE),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) => parse_optional_date("date", &value)
                .map_err(|e| serde::de::Error::custom(e.to_string())),
        }
    }
}
