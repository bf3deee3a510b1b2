// models/src/util.rs

// Date helpers shared by the record types. Appointment times are local
// wall-clock values with no zone attached, so everything here works on
// chrono's naive types.

use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::{ValidationError, ValidationResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// Accepted on input; browsers' datetime-local fields omit the seconds.
const DATE_TIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn parse_date(value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDateFormat(value.to_string()))
}

pub fn parse_date_time(value: &str) -> ValidationResult<NaiveDateTime> {
    let trimmed = value.trim();
    DATE_TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidDateFormat(value.to_string()))
}

pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Serde adapter for appointment timestamps.
pub mod local_date_time {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date_time(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date_time(&raw).map_err(D::Error::custom)
    }
}

/// Like [`local_date_time`], but an absent or empty string means `None`.
pub mod optional_local_date_time {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&super::format_date_time(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_date_time(s).map(Some).map_err(D::Error::custom),
        }
    }
}

/// Costs typed into the incident form arrive as text; older records may hold
/// `""` or `"80"` instead of a number. Empty means zero.
pub mod lenient_cost {
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null(()),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let cost = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Null(()) => 0.0,
            Raw::Text(s) if s.trim().is_empty() => 0.0,
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("cost '{}' is not a number", s)))?,
        };
        if !cost.is_finite() || cost < 0.0 {
            return Err(D::Error::custom(format!("cost {} is not a finite non-negative amount", cost)));
        }
        Ok(cost)
    }
}
