use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use super::types::RowValue;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar granularity used by date transforms.
///
/// Variants are declared from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl DateUnit {
    /// Next coarser unit, `None` for `Year`.
    #[must_use]
    pub fn coarser(self) -> Option<Self> {
        match self {
            Self::Year => None,
            Self::Month => Some(Self::Year),
            Self::Day => Some(Self::Month),
            Self::Hour => Some(Self::Day),
            Self::Minute => Some(Self::Hour),
        }
    }

    fn key_format(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y-%m",
            Self::Day => "%Y-%m-%d",
            Self::Hour => "%Y-%m-%d %H",
            Self::Minute => "%Y-%m-%d %H:%M",
        }
    }
}

/// Parsed wall-clock date of a row cell.
///
/// Offsets present in the source text are dropped: the local fields written
/// in the value are what the chart buckets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartDate(NaiveDateTime);

impl ChartDate {
    #[must_use]
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|date| Self(date.and_time(NaiveTime::MIN)))
    }

    #[must_use]
    pub fn datetime(self) -> NaiveDateTime {
        self.0
    }

    /// Start of the `unit` period containing this date.
    #[must_use]
    pub fn truncate(self, unit: DateUnit) -> Self {
        let date = self.0.date();
        let truncated = match unit {
            DateUnit::Year => date.with_day(1).and_then(|d| d.with_month(1)),
            DateUnit::Month => date.with_day(1),
            DateUnit::Day | DateUnit::Hour | DateUnit::Minute => Some(date),
        }
        .unwrap_or(date);
        let time = match unit {
            DateUnit::Year | DateUnit::Month | DateUnit::Day => NaiveTime::MIN,
            DateUnit::Hour => NaiveTime::from_hms_opt(self.0.hour(), 0, 0).unwrap_or(NaiveTime::MIN),
            DateUnit::Minute => {
                NaiveTime::from_hms_opt(self.0.hour(), self.0.minute(), 0).unwrap_or(NaiveTime::MIN)
            }
        };
        Self(truncated.and_time(time))
    }

    /// Bucket key text; keys of one unit sort lexicographically in time order.
    #[must_use]
    pub fn bucket_key(self, unit: DateUnit) -> String {
        self.0.format(unit.key_format()).to_string()
    }

    /// Reads back a key produced by [`ChartDate::bucket_key`].
    #[must_use]
    pub fn from_bucket_key(key: &str, unit: DateUnit) -> Option<Self> {
        let parsed = match unit {
            DateUnit::Year => {
                let year = key.parse::<i32>().ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)?.and_time(NaiveTime::MIN)
            }
            DateUnit::Month => NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
                .ok()?
                .and_time(NaiveTime::MIN),
            DateUnit::Day => NaiveDate::parse_from_str(key, "%Y-%m-%d")
                .ok()?
                .and_time(NaiveTime::MIN),
            DateUnit::Hour => {
                NaiveDateTime::parse_from_str(&format!("{key}:00"), "%Y-%m-%d %H:%M").ok()?
            }
            DateUnit::Minute => NaiveDateTime::parse_from_str(key, "%Y-%m-%d %H:%M").ok()?,
        };
        Some(Self(parsed))
    }

    /// Start of the following `unit` period.
    #[must_use]
    pub fn step(self, unit: DateUnit) -> Option<Self> {
        let start = self.truncate(unit).0;
        let next = match unit {
            DateUnit::Year => start.checked_add_months(Months::new(12)),
            DateUnit::Month => start.checked_add_months(Months::new(1)),
            DateUnit::Day => start.checked_add_days(Days::new(1)),
            DateUnit::Hour => start.checked_add_signed(TimeDelta::hours(1)),
            DateUnit::Minute => start.checked_add_signed(TimeDelta::minutes(1)),
        }?;
        Some(Self(next))
    }

    /// Number of whole `unit` periods from `self` to `end` (negative if `end` is earlier).
    #[must_use]
    pub fn units_until(self, end: Self, unit: DateUnit) -> i64 {
        let start = self.truncate(unit).0;
        let end = end.truncate(unit).0;
        match unit {
            DateUnit::Year => i64::from(end.year() - start.year()),
            DateUnit::Month => {
                let months = |d: NaiveDateTime| i64::from(d.year()) * 12 + i64::from(d.month0());
                months(end) - months(start)
            }
            DateUnit::Day => (end.date() - start.date()).num_days(),
            DateUnit::Hour => (end - start).num_hours(),
            DateUnit::Minute => (end - start).num_minutes(),
        }
    }
}

/// Date reading of a row cell.
///
/// Accepts native dates and ISO-8601 style strings (`YYYY-MM`, `YYYY-MM-DD`,
/// optional `T`/space separated time, fraction and offset). Numbers are never dates.
#[must_use]
pub fn parse_chart_date(value: &RowValue) -> Option<ChartDate> {
    match value {
        RowValue::Date(datetime) => Some(ChartDate(*datetime)),
        RowValue::String(text) => parse_date_text(text.trim()),
        RowValue::Null | RowValue::Number(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<ChartDate> {
    let bytes = text.as_bytes();
    if bytes.len() < 7 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return None;
    }

    match bytes.len() {
        7 => {
            return NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
                .ok()
                .map(|date| ChartDate(date.and_time(NaiveTime::MIN)));
        }
        10 => {
            return NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| ChartDate(date.and_time(NaiveTime::MIN)));
        }
        _ => {}
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ChartDate(datetime));
        }
    }

    let normalized = if bytes.len() > 10 && bytes[10] == b' ' {
        format!("{}T{}", &text[..10], &text[11..])
    } else {
        text.to_owned()
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|datetime| ChartDate(datetime.naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> Option<ChartDate> {
        parse_chart_date(&RowValue::from(text))
    }

    #[test]
    fn parses_iso_shapes() {
        assert_eq!(date("2024-03-05"), ChartDate::from_ymd(2024, 3, 5));
        assert_eq!(date("2024-03"), ChartDate::from_ymd(2024, 3, 1));
        assert_eq!(
            date("2024-03-05T10:20:30.125").map(|d| d.bucket_key(DateUnit::Minute)),
            Some("2024-03-05 10:20".to_owned())
        );
        assert_eq!(
            date("2024-03-05 23:59:00+02:00").map(|d| d.bucket_key(DateUnit::Hour)),
            Some("2024-03-05 23".to_owned())
        );
        assert_eq!(
            date("2024-03-05T01:00:00Z").map(|d| d.bucket_key(DateUnit::Day)),
            Some("2024-03-05".to_owned())
        );
    }

    #[test]
    fn rejects_non_dates() {
        assert!(date("2024").is_none());
        assert!(date("hello world").is_none());
        assert!(date("2024-13-01").is_none());
        assert!(parse_chart_date(&RowValue::Number(20240101.0)).is_none());
        assert!(parse_chart_date(&RowValue::Null).is_none());
    }

    #[test]
    fn bucket_keys_read_back_per_unit() {
        let value = date("2023-12-31T22:45:10").expect("date");
        for unit in [
            DateUnit::Year,
            DateUnit::Month,
            DateUnit::Day,
            DateUnit::Hour,
            DateUnit::Minute,
        ] {
            let key = value.bucket_key(unit);
            assert_eq!(ChartDate::from_bucket_key(&key, unit), Some(value.truncate(unit)));
        }
    }

    #[test]
    fn step_and_distance_cross_period_boundaries() {
        let value = ChartDate::from_ymd(2023, 12, 31).expect("date");
        assert_eq!(
            value.step(DateUnit::Day).map(|d| d.bucket_key(DateUnit::Day)),
            Some("2024-01-01".to_owned())
        );
        assert_eq!(
            value.step(DateUnit::Month).map(|d| d.bucket_key(DateUnit::Month)),
            Some("2024-01".to_owned())
        );
        let end = ChartDate::from_ymd(2025, 2, 1).expect("date");
        assert_eq!(value.units_until(end, DateUnit::Month), 14);
        assert_eq!(value.units_until(end, DateUnit::Year), 2);
        assert_eq!(end.units_until(value, DateUnit::Day), -398);
    }
}
