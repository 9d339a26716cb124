//! Date ranges and range filtering
//!
//! Ranges are inclusive calendar-date intervals. A range whose start falls
//! after its end is valid and simply contains no dates.

use chrono::{Datelike, Duration, FixedOffset, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::timeseries::TimeSeries;

/// An inclusive `[start, end]` date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range. `start > end` gives an empty range rather than an error.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse a range string relative to `today`
    ///
    /// Supported formats:
    /// - Relative: `7d`, `30d`, `12w`, `3m`, `1y`
    /// - Predefined: `today`, `yesterday`, `wtd`, `mtd`, `ytd`
    /// - Custom: `2024-01-01,2024-01-31`
    pub fn parse(s: &str, today: NaiveDate) -> Result<Self> {
        let s = s.trim().to_lowercase();

        if let Some(range) = Self::parse_predefined(&s, today) {
            return Ok(range);
        }

        if let Some(range) = Self::parse_relative(&s, today) {
            return Ok(range);
        }

        if let Some(range) = Self::parse_custom(&s)? {
            return Ok(range);
        }

        Err(AnalyticsError::InvalidDateRange(format!(
            "unknown range format: {}",
            s
        )))
    }

    /// True when the range contains no dates
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Check whether a date falls inside the range (both bounds inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days in the range (inclusive), 0 when empty
    pub fn days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    /// Every date in the range, ascending
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// This range with its start moved back to `start` if that is earlier
    pub fn extended_back_to(&self, start: NaiveDate) -> Self {
        Self {
            start: self.start.min(start),
            end: self.end,
        }
    }
}

impl DateRange {
    fn parse_predefined(s: &str, today: NaiveDate) -> Option<Self> {
        let start = match s {
            "today" => today,
            "yesterday" => {
                let day = today - Duration::days(1);
                return Some(Self::new(day, day));
            }
            // Weeks start on Sunday, matching weekly buckets
            "wtd" => today - Duration::days(i64::from(today.weekday().num_days_from_sunday())),
            "mtd" => today.with_day(1)?,
            "ytd" => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            _ => return None,
        };
        Some(Self::new(start, today))
    }

    fn parse_relative(s: &str, today: NaiveDate) -> Option<Self> {
        let (num, unit) = extract_num_unit(s)?;

        // Out-of-range counts yield None rather than overflowing
        let start = match unit {
            // 7d = today + 6 previous days
            'd' => today.checked_sub_signed(Duration::try_days(num - 1)?)?,
            'w' => today
                .checked_sub_signed(Duration::try_weeks(num)?)?
                .checked_add_signed(Duration::try_days(1)?)?,
            // Calendar months, clamped to month end by chrono
            'm' => today.checked_sub_months(Months::new(u32::try_from(num).ok()?))?,
            'y' => {
                let months = u32::try_from(num.checked_mul(12)?).ok()?;
                today.checked_sub_months(Months::new(months))?
            }
            _ => return None,
        };

        Some(Self::new(start, today))
    }

    fn parse_custom(s: &str) -> Result<Option<Self>> {
        let Some((start, end)) = s.split_once(',') else {
            return Ok(None);
        };

        let start = parse_date(start.trim())?;
        let end = parse_date(end.trim())?;
        Ok(Some(Self::new(start, end)))
    }
}

/// Current calendar date at a fixed UTC offset
///
/// Offsets chrono cannot represent fall back to UTC.
pub fn today_at_offset(utc_offset_hours: i32) -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        AnalyticsError::InvalidDateRange(format!("invalid date format: {} (use YYYY-MM-DD)", s))
    })
}

fn extract_num_unit(s: &str) -> Option<(i64, char)> {
    let unit = s.chars().last()?;
    if !unit.is_ascii_alphabetic() {
        return None;
    }

    let num: i64 = s[..s.len() - 1].parse().ok()?;
    if num <= 0 {
        return None;
    }

    Some((num, unit))
}

/// Keep the points of `series` that fall inside `range`, in their original order
pub fn filter_range(series: &TimeSeries, range: &DateRange) -> TimeSeries {
    let points = series
        .points
        .iter()
        .filter(|p| range.contains(p.date))
        .copied()
        .collect();
    TimeSeries::new(series.title.clone(), points)
}

/// Filter several series independently against one range
pub fn filter_all(series: &[TimeSeries], range: &DateRange) -> Vec<TimeSeries> {
    series.iter().map(|s| filter_range(s, range)).collect()
}
