use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

pub(crate) const TIME_FORMAT: &str = "%H:%M";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a wall-clock time written as `HH:MM` (seconds are tolerated and dropped).
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(truncate_seconds)
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Adds `minutes` to a same-day start time, wrapping past midnight.
pub fn add_minutes(start: NaiveTime, minutes: u16) -> NaiveTime {
    let (end, _) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    end
}

fn truncate_seconds(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Serde adapter storing [`NaiveTime`] as `HH:MM`.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}
