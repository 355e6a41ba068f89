use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::domain::DrivingClass;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("period must be 'all' or YYYY-MM, got '{0}'")]
pub struct PeriodParseError(pub String);

/// Calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days(self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.map(|next| (next - self.first_day()).num_days() as u32)
            .unwrap_or(31)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodParseError(raw.to_string());
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reporting window: everything on record, or one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    AllTime,
    Month(YearMonth),
}

impl Period {
    pub fn contains(self, date: NaiveDate) -> bool {
        match self {
            Self::AllTime => true,
            Self::Month(month) => month.contains(date),
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::AllTime => "All time".to_string(),
            Self::Month(month) => format!("Month: {month}"),
        }
    }

    /// Value used in query strings and file names.
    pub fn slug(self) -> String {
        match self {
            Self::AllTime => "all".to_string(),
            Self::Month(month) => month.to_string(),
        }
    }

    /// Column header of the time-series table.
    pub const fn bucket_header(self) -> &'static str {
        match self {
            Self::AllTime => "Month",
            Self::Month(_) => "Day",
        }
    }

    /// Sort key and display label of the bucket a date falls into.
    pub(crate) fn bucket(self, date: NaiveDate) -> (String, String) {
        match self {
            Self::AllTime => {
                let month = YearMonth::of(date).to_string();
                (month.clone(), month)
            }
            Self::Month(_) => (
                date.format("%Y-%m-%d").to_string(),
                format!("{:02}", date.day()),
            ),
        }
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::AllTime);
        }
        raw.parse().map(Self::Month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.slug())
    }
}

/// Months that have classes, newest first. The current month is always offered.
pub fn available_months(classes: &[DrivingClass], current: YearMonth) -> Vec<YearMonth> {
    let mut months: BTreeSet<YearMonth> = classes.iter().map(|class| YearMonth::of(class.date)).collect();
    months.insert(current);
    months.into_iter().rev().collect()
}
