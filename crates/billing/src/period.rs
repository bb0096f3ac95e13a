use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use osdesk_core::{DomainError, DomainResult};

/// A calendar month: `[first day 00:00 UTC, first day of next month)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation("month must be between 1 and 12"));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DomainError::validation("year is out of range"))?;
        // The following month must be representable too.
        let period = Self { year, month };
        let (ny, nm) = period.next_month();
        NaiveDate::from_ymd_opt(ny, nm, 1).ok_or_else(|| DomainError::validation("year is out of range"))?;
        Ok(period)
    }

    /// Month containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    fn next_month(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }

    fn first_instant(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn start(&self) -> DateTime<Utc> {
        Self::first_instant(self.year, self.month)
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        let (y, m) = self.next_month();
        Self::first_instant(y, m)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at < self.end()
    }
}
