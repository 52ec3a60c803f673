//! Calendar instants the converter can operate on.
//!
//! The converter never does calendar arithmetic on a host type itself. It
//! asks the type to truncate to local midnight, measure elapsed milliseconds
//! and add whole calendar days, so day offsets computed here roll over months
//! and years exactly like any other day offset of that type.

use crate::civil::CivilDate;
use crate::consts::{JANUARY, MIN_DAY, MS_PER_DAY};
use crate::CalendarError;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

/// A point in time with a local calendar.
pub trait CalendarInstant: Sized {
    /// Year in the instant's own reckoning.
    fn year(&self) -> i32;

    /// Day of the week, Sunday = 0 through Saturday = 6.
    fn weekday_from_sunday(&self) -> u8;

    /// Local midnight starting the instant's day.
    ///
    /// # Errors
    /// Returns an error if midnight cannot be represented.
    fn start_of_day(&self) -> Result<Self, CalendarError>;

    /// Local midnight starting January 1 of the instant's year.
    ///
    /// # Errors
    /// Returns an error if midnight cannot be represented.
    fn start_of_year(&self) -> Result<Self, CalendarError>;

    /// Signed milliseconds elapsed from `earlier` to `self`.
    fn millis_since(&self, earlier: &Self) -> i64;

    /// Adds `days` calendar days, keeping the local time of day.
    ///
    /// # Errors
    /// Returns an error if the result is not representable.
    fn add_days(&self, days: i64) -> Result<Self, CalendarError>;
}

impl CalendarInstant for CivilDate {
    fn year(&self) -> i32 {
        Self::year(*self)
    }

    fn weekday_from_sunday(&self) -> u8 {
        Self::weekday_from_sunday(*self)
    }

    fn start_of_day(&self) -> Result<Self, CalendarError> {
        Ok(*self)
    }

    fn start_of_year(&self) -> Result<Self, CalendarError> {
        Self::first_of_year(Self::year(*self))
    }

    fn millis_since(&self, earlier: &Self) -> i64 {
        (self.to_epoch_day() - earlier.to_epoch_day()).saturating_mul(MS_PER_DAY)
    }

    fn add_days(&self, days: i64) -> Result<Self, CalendarError> {
        self.checked_add_days(days)
    }
}

impl CalendarInstant for NaiveDate {
    fn year(&self) -> i32 {
        Datelike::year(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn weekday_from_sunday(&self) -> u8 {
        self.weekday().num_days_from_sunday() as u8
    }

    fn start_of_day(&self) -> Result<Self, CalendarError> {
        Ok(*self)
    }

    fn start_of_year(&self) -> Result<Self, CalendarError> {
        first_of_year(Datelike::year(self))
    }

    fn millis_since(&self, earlier: &Self) -> i64 {
        self.signed_duration_since(*earlier).num_milliseconds()
    }

    fn add_days(&self, days: i64) -> Result<Self, CalendarError> {
        shift_days(*self, days, |date, d| date.checked_add_days(d), |date, d| date.checked_sub_days(d))
            .ok_or_else(|| CalendarError::OutOfRange(format!("{self} + {days} days")))
    }
}

impl CalendarInstant for NaiveDateTime {
    fn year(&self) -> i32 {
        Datelike::year(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn weekday_from_sunday(&self) -> u8 {
        self.weekday().num_days_from_sunday() as u8
    }

    fn start_of_day(&self) -> Result<Self, CalendarError> {
        Ok(self.date().and_time(NaiveTime::MIN))
    }

    fn start_of_year(&self) -> Result<Self, CalendarError> {
        Ok(first_of_year(Datelike::year(self))?.and_time(NaiveTime::MIN))
    }

    fn millis_since(&self, earlier: &Self) -> i64 {
        self.signed_duration_since(*earlier).num_milliseconds()
    }

    fn add_days(&self, days: i64) -> Result<Self, CalendarError> {
        shift_days(*self, days, |dt, d| dt.checked_add_days(d), |dt, d| dt.checked_sub_days(d))
            .ok_or_else(|| CalendarError::OutOfRange(format!("{self} + {days} days")))
    }
}

/// Zoned instants work on the local wall clock of their zone, so a day that
/// spans a DST transition is 23 or 25 hours long.
impl<Tz: TimeZone> CalendarInstant for DateTime<Tz> {
    fn year(&self) -> i32 {
        Datelike::year(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn weekday_from_sunday(&self) -> u8 {
        self.weekday().num_days_from_sunday() as u8
    }

    fn start_of_day(&self) -> Result<Self, CalendarError> {
        let midnight = self.date_naive().and_time(NaiveTime::MIN);
        resolve_local(&self.timezone(), midnight)
    }

    fn start_of_year(&self) -> Result<Self, CalendarError> {
        let midnight = first_of_year(Datelike::year(self))?.and_time(NaiveTime::MIN);
        resolve_local(&self.timezone(), midnight)
    }

    fn millis_since(&self, earlier: &Self) -> i64 {
        self.timestamp_millis() - earlier.timestamp_millis()
    }

    fn add_days(&self, days: i64) -> Result<Self, CalendarError> {
        let local = shift_days(
            self.naive_local(),
            days,
            |dt, d| dt.checked_add_days(d),
            |dt, d| dt.checked_sub_days(d),
        )
        .ok_or_else(|| CalendarError::OutOfRange(format!("{} + {days} days", self.naive_local())))?;
        resolve_local(&self.timezone(), local)
    }
}

fn first_of_year(year: i32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, u32::from(JANUARY), u32::from(MIN_DAY))
        .ok_or_else(|| CalendarError::OutOfRange(format!("year {year}")))
}

/// Applies a signed day offset through chrono's unsigned `Days` API.
fn shift_days<T>(
    value: T,
    days: i64,
    add: impl FnOnce(T, Days) -> Option<T>,
    sub: impl FnOnce(T, Days) -> Option<T>,
) -> Option<T> {
    if days >= 0 {
        add(value, Days::new(days.unsigned_abs()))
    } else {
        sub(value, Days::new(days.unsigned_abs()))
    }
}

/// Longest run of skipped wall-clock time, in minutes, that is stepped over
const MAX_GAP_MINUTES: i64 = 2 * 24 * 60;

/// Maps a local wall-clock time to an instant in `tz`.
///
/// An ambiguous time resolves to the earlier instant. A time inside a gap
/// moves forward in whole minutes to the first reading that exists, so a
/// midnight skipped by a DST change or by a zone dropping a whole day resolves
/// to the instant the gap ends.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, CalendarError> {
    if let Some(instant) = tz.from_local_datetime(&local).earliest() {
        return Ok(instant);
    }

    for minutes in 1..=MAX_GAP_MINUTES {
        let shifted = local
            .checked_add_signed(TimeDelta::minutes(minutes))
            .ok_or_else(|| CalendarError::OutOfRange(local.to_string()))?;
        if let Some(instant) = tz.from_local_datetime(&shifted).earliest() {
            tracing::debug!(%local, %shifted, "local time falls in a gap, moving past it");
            return Ok(instant);
        }
    }
    Err(CalendarError::NonexistentLocalTime(local.to_string()))
}
