//! Half-open booking windows.
//!
//! A [`BookingWindow`] is the interval `[start, end)` over which a resource
//! is claimed, expressed in hotel-local time. Room stays use whole days
//! (check-in and check-out at midnight); leisure slots use date + time.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Granularity at which "not in the past" is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowGranularity {
    /// Date-only comparison (room nights): a stay starting today is allowed.
    Date,
    /// Date and time comparison (leisure slots).
    DateTime,
}

/// A validated half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct BookingWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawWindow> for BookingWindow {
    type Error = AppError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl BookingWindow {
    /// Build a window, rejecting `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> AppResult<Self> {
        if start >= end {
            return Err(
                AppError::validation("Window end must be after its start").with_field("window")
            );
        }
        Ok(Self { start, end })
    }

    /// A room stay from the check-in date to the check-out date.
    pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<Self> {
        if check_out <= check_in {
            return Err(AppError::validation("Check-out must be after check-in")
                .with_field("check_out"));
        }
        Self::new(
            check_in.and_time(NaiveTime::MIN),
            check_out.and_time(NaiveTime::MIN),
        )
    }

    /// A same-day leisure slot.
    pub fn slot(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::validation("End time must be after start time")
                .with_field("end_time"));
        }
        Self::new(date.and_time(start), date.and_time(end))
    }

    /// Inclusive start.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap: `[s1,e1)` and `[s2,e2)` share an instant iff
    /// `s1 < e2 && s2 < e1`. Covers partial overlap and full containment.
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of nights covered, rounded up to whole days.
    pub fn nights_spanned(&self) -> i64 {
        let seconds = self.duration().num_seconds();
        let day = Duration::days(1).num_seconds();
        (seconds + day - 1) / day
    }

    /// Reject windows that start before `now` at the given granularity.
    pub fn ensure_not_past(
        &self,
        granularity: WindowGranularity,
        now: NaiveDateTime,
    ) -> AppResult<()> {
        let in_past = match granularity {
            WindowGranularity::Date => self.start.date() < now.date(),
            WindowGranularity::DateTime => self.start < now,
        };
        if in_past {
            return Err(AppError::validation("The requested window starts in the past")
                .with_field("start"));
        }
        Ok(())
    }

    /// Reject windows that start more than `max_days` after `now`.
    pub fn ensure_within_horizon(&self, now: NaiveDateTime, max_days: u32) -> AppResult<()> {
        let horizon = now.date() + Duration::days(i64::from(max_days));
        if self.start.date() > horizon {
            return Err(AppError::validation(format!(
                "Bookings can be made at most {max_days} days in advance"
            ))
            .with_field("start"));
        }
        Ok(())
    }
}

impl fmt::Display for BookingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
