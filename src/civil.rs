//! Proleptic Gregorian calendar dates.
//!
//! [`CivilDate`] is a plain year/month/day triple with no time zone. It is
//! convertible to and from a signed count of days since 1970-01-01, which is
//! what every other operation in this module is built on.

use crate::consts::{
    DATE_SEPARATOR, DAYS_FROM_0000_03_01_TO_EPOCH, DAYS_IN_ERA, DAYS_IN_WEEK, EPOCH_WEEKDAY_FROM_SUNDAY,
    GREGORIAN_CYCLE, JANUARY, MAX_MONTH, MIN_DAY,
};
use crate::prelude::*;
use crate::types::days_in_month;
use crate::CalendarError;
use std::str::FromStr;

/// A date in the proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{year:04}-{month:02}-{day:02}")]
pub struct CivilDate {
    year:  i32,
    month: u8,
    day:   u8,
}

impl CivilDate {
    /// Creates a date, validating month and day.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonth` if `month` is not in `1..=12`
    /// and `CalendarError::InvalidDay` if `day` does not exist in that month.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, CalendarError> {
        if !(JANUARY..=MAX_MONTH).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        match days_in_month(year, month) {
            Some(last) if (MIN_DAY..=last).contains(&day) => {},
            _ => return Err(CalendarError::InvalidDay { year, month, day }),
        }
        Ok(Self { year, month, day })
    }

    #[inline]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[inline]
    pub const fn month(self) -> u8 {
        self.month
    }

    #[inline]
    pub const fn day(self) -> u8 {
        self.day
    }

    /// First day of `year`.
    ///
    /// # Errors
    /// Never fails for an `i32` year; the `Result` keeps the signature in line
    /// with the other constructors.
    pub fn first_of_year(year: i32) -> Result<Self, CalendarError> {
        Self::new(year, JANUARY, MIN_DAY)
    }

    /// Days since 1970-01-01 (negative before it).
    pub const fn to_epoch_day(self) -> i64 {
        days_from_civil(self.year as i64, self.month as i64, self.day as i64)
    }

    /// Days since 1970-01-01 of January 1 of `year`, for any `i64` year
    /// whose result fits.
    pub(crate) const fn epoch_day_of_jan1(year: i64) -> i64 {
        days_from_civil(year, JANUARY as i64, MIN_DAY as i64)
    }

    /// Builds the date `epoch_day` days after 1970-01-01.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` if the year does not fit an `i32`.
    pub fn from_epoch_day(epoch_day: i64) -> Result<Self, CalendarError> {
        // ref: http://howardhinnant.github.io/date_algorithms.html
        let days = epoch_day
            .checked_add(DAYS_FROM_0000_03_01_TO_EPOCH)
            .ok_or_else(|| CalendarError::OutOfRange(format!("epoch day {epoch_day}")))?;
        let era = days.div_euclid(DAYS_IN_ERA);
        let day_of_era = days.rem_euclid(DAYS_IN_ERA);
        let year_of_era =
            (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / (DAYS_IN_ERA - 1)) / 365;
        let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
        let shifted_month = (5 * day_of_year + 2) / 153;
        let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
        let month = if shifted_month < 10 { shifted_month + 3 } else { shifted_month - 9 };
        let year = year_of_era + era * GREGORIAN_CYCLE + i64::from(month <= 2);

        let year = i32::try_from(year).map_err(|_| CalendarError::OutOfRange(format!("epoch day {epoch_day}")))?;
        // month and day are bounded by the algorithm above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (month, day) = (month as u8, day as u8);
        Ok(Self { year, month, day })
    }

    /// 1-based ordinal of this date within its year.
    pub const fn day_of_year(self) -> i64 {
        self.to_epoch_day() - Self::epoch_day_of_jan1(self.year as i64) + 1
    }

    /// Day of the week, Sunday = 0 through Saturday = 6.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn weekday_from_sunday(self) -> u8 {
        weekday_from_sunday(self.to_epoch_day()) as u8
    }

    /// ISO day of the week, Monday = 1 through Sunday = 7.
    pub const fn iso_weekday(self) -> u8 {
        match self.weekday_from_sunday() {
            0 => 7,
            d => d,
        }
    }

    /// Adds `days` calendar days, rolling over months and years.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` if the result is not representable.
    pub fn checked_add_days(self, days: i64) -> Result<Self, CalendarError> {
        let epoch_day = self
            .to_epoch_day()
            .checked_add(days)
            .ok_or_else(|| CalendarError::OutOfRange(format!("{self} + {days} days")))?;
        Self::from_epoch_day(epoch_day)
    }
}

impl FromStr for CivilDate {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CalendarError::EmptyInput);
        }

        // A leading separator is the sign of the year
        let (negative, unsigned) = match trimmed.strip_prefix(DATE_SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let parts: Vec<&str> = unsigned.split(DATE_SEPARATOR).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(CalendarError::InvalidFormat(format!(
                "Expected YYYY{DATE_SEPARATOR}MM{DATE_SEPARATOR}DD, found {trimmed}"
            )));
        };

        let invalid = || CalendarError::InvalidFormat(trimmed.to_owned());
        // Parsed wider than i32 so the magnitude of i32::MIN fits before negation
        let year = year.parse::<i64>().map_err(|_| invalid())?;
        let year = i32::try_from(if negative { -year } else { year }).map_err(|_| invalid())?;
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        let day = day.parse::<u8>().map_err(|_| invalid())?;

        Self::new(year, month, day)
    }
}

impl serde::Serialize for CivilDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CivilDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub(crate) const fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    // ref: http://howardhinnant.github.io/date_algorithms.html
    let year = if month <= 2 { year - 1 } else { year };
    let shifted_month = if month > 2 { month - 3 } else { month + 9 };
    let era = year.div_euclid(GREGORIAN_CYCLE);
    let year_of_era = year.rem_euclid(GREGORIAN_CYCLE);
    let day_of_year = (153 * shifted_month + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_IN_ERA + day_of_era - DAYS_FROM_0000_03_01_TO_EPOCH
}

/// Sunday = 0 through Saturday = 6.
pub(crate) const fn weekday_from_sunday(epoch_day: i64) -> i64 {
    (epoch_day + EPOCH_WEEKDAY_FROM_SUNDAY).rem_euclid(DAYS_IN_WEEK)
}

#[cfg(test)]
impl quickcheck::Arbitrary for CivilDate {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let year = i32::from(i16::arbitrary(g)) % 4_000 + 2_000;
        let month = u8::arbitrary(g) % MAX_MONTH + 1;
        let day = u8::arbitrary(g) % days_in_month(year, month).unwrap_or(28) + 1;
        Self { year, month, day }
    }
}
