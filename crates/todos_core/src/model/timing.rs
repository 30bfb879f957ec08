use crate::error::AppError;
use std::fmt::Write as _;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_due_date(input: &str) -> Result<Date, AppError> {
    Date::parse(input.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid_input(format!("invalid date: {input} (expected YYYY-MM-DD)")))
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Calendar date of `timestamp` in the local timezone, UTC when unknown.
pub fn local_date(timestamp: OffsetDateTime) -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    timestamp.to_offset(offset).date()
}

/// Parse `1h30m`, `45m`, `90s` style durations. Units may repeat and appear
/// in any order; every number needs a unit.
pub fn parse_duration(input: &str) -> Result<Duration, AppError> {
    let invalid = || {
        AppError::invalid_input(format!(
            "invalid duration: {input} (expected e.g. 1h30m, 45m, 90s)"
        ))
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();

    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();

        let unit_seconds = match ch.to_ascii_lowercase() {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        let seconds = amount.checked_mul(unit_seconds).ok_or_else(invalid)?;
        total = total
            .checked_add(Duration::seconds(seconds))
            .ok_or_else(invalid)?;
    }

    if !digits.is_empty() {
        return Err(invalid());
    }
    if !is_storable(total) {
        return Err(AppError::invalid_input(format!(
            "duration too large: {input}"
        )));
    }

    Ok(total)
}

/// Durations are persisted as i64 nanoseconds.
pub(crate) fn is_storable(duration: Duration) -> bool {
    i64::try_from(duration.whole_nanoseconds()).is_ok()
}

pub fn format_duration(duration: Duration) -> String {
    let total = duration.whole_seconds();
    if total == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }

    let total = total.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    if seconds > 0 {
        let _ = write!(out, "{seconds}s");
    }
    out
}

/// `Option<Date>` as `"YYYY-MM-DD"`.
pub(crate) mod date_option {
    use super::DATE_FORMAT;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => {
                let text = date.format(DATE_FORMAT).map_err(S::Error::custom)?;
                serializer.serialize_some(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| Date::parse(&text, DATE_FORMAT).map_err(D::Error::custom))
            .transpose()
    }
}

/// `Option<Duration>` as integer nanoseconds.
pub(crate) mod duration_option {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                let nanos = i64::try_from(duration.whole_nanoseconds())
                    .map_err(|_| S::Error::custom("duration out of range"))?;
                serializer.serialize_some(&nanos)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let raw: Option<i64> = Option::deserialize(deserializer)?;
        Ok(raw.map(Duration::nanoseconds))
    }
}
