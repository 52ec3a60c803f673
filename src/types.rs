use crate::civil::CivilDate;
use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_COMMON_YEAR, DAYS_IN_LEAP_YEAR, DAYS_IN_MONTH, DAYS_IN_WEEK, FEBRUARY,
    FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE, MAX_FIRST_DAY_OF_WEEK,
    MAX_FIRST_DAY_OF_WEEK_OF_YEAR, MAX_MONTH, MIN_FIRST_DAY_OF_WEEK_OF_YEAR,
};
use crate::convert::weeks_in_year;
use crate::prelude::*;
use crate::CalendarError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parameters of a week numbering convention.
///
/// `first_day_of_week` is the day a week starts on, Sunday = 0 or Monday = 1.
/// `first_day_of_week_of_year` is the locale "doy" value that anchors week 1:
/// ISO 8601 uses `(1, 4)`, so week 1 is the week holding the year's first
/// Thursday, and the US convention `(0, 6)` makes week 1 the week holding
/// January 1.
///
/// Weeks starting later in the week are rejected: for those the week date
/// arithmetic of [`week_date_to_day_of_year`](crate::week_date_to_day_of_year)
/// does not invert [`week_of_year`](crate::week_of_year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{first_day_of_week}/{first_day_of_week_of_year}")]
#[serde(try_from = "RawWeekRule")]
pub struct WeekRule {
    first_day_of_week:         i32,
    first_day_of_week_of_year: i32,
}

#[derive(Deserialize)]
struct RawWeekRule {
    first_day_of_week:         i32,
    first_day_of_week_of_year: i32,
}

impl TryFrom<RawWeekRule> for WeekRule {
    type Error = CalendarError;

    fn try_from(raw: RawWeekRule) -> Result<Self, Self::Error> {
        Self::new(raw.first_day_of_week, raw.first_day_of_week_of_year)
    }
}

impl WeekRule {
    /// ISO 8601: weeks start on Monday, week 1 holds the first Thursday.
    pub const ISO: Self = Self {
        first_day_of_week:         1,
        first_day_of_week_of_year: 4,
    };

    /// US: weeks start on Sunday, week 1 holds January 1.
    pub const US: Self = Self {
        first_day_of_week:         0,
        first_day_of_week_of_year: 6,
    };

    /// Creates a rule, validating both fields.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidFirstDayOfWeek` if `first_day_of_week`
    /// is outside `0..=1` and `CalendarError::InvalidFirstDayOfWeekOfYear` if
    /// `first_day_of_week_of_year` is outside `1..=7`.
    pub fn new(first_day_of_week: i32, first_day_of_week_of_year: i32) -> Result<Self, CalendarError> {
        if !(0..=MAX_FIRST_DAY_OF_WEEK).contains(&first_day_of_week) {
            return Err(CalendarError::InvalidFirstDayOfWeek(first_day_of_week));
        }
        if !(MIN_FIRST_DAY_OF_WEEK_OF_YEAR..=MAX_FIRST_DAY_OF_WEEK_OF_YEAR).contains(&first_day_of_week_of_year) {
            return Err(CalendarError::InvalidFirstDayOfWeekOfYear(first_day_of_week_of_year));
        }
        Ok(Self {
            first_day_of_week,
            first_day_of_week_of_year,
        })
    }

    #[inline]
    pub const fn first_day_of_week(self) -> i32 {
        self.first_day_of_week
    }

    #[inline]
    pub const fn first_day_of_week_of_year(self) -> i32 {
        self.first_day_of_week_of_year
    }

    /// Smallest weekday number valid under this rule
    #[inline]
    pub const fn min_weekday(self) -> i32 {
        self.first_day_of_week
    }

    /// Largest weekday number valid under this rule
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_weekday(self) -> i32 {
        self.first_day_of_week + DAYS_IN_WEEK as i32 - 1
    }
}

impl Default for WeekRule {
    fn default() -> Self {
        Self::ISO
    }
}

impl FromStr for WeekRule {
    type Err = CalendarError;

    /// Accepts `iso`, `us`, or an explicit `first_day_of_week/first_day_of_week_of_year` pair.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CalendarError::EmptyInput);
        }
        if trimmed.eq_ignore_ascii_case("iso") {
            return Ok(Self::ISO);
        }
        if trimmed.eq_ignore_ascii_case("us") {
            return Ok(Self::US);
        }

        let (dow, doy) = trimmed
            .split_once('/')
            .ok_or_else(|| CalendarError::InvalidFormat(trimmed.to_owned()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| CalendarError::InvalidFormat(trimmed.to_owned()))
        };
        Self::new(parse(dow)?, parse(doy)?)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for WeekRule {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let first_day_of_week = i32::from(u8::arbitrary(g) % 2);
        let first_day_of_week_of_year = i32::from(u8::arbitrary(g) % 7) + MIN_FIRST_DAY_OF_WEEK_OF_YEAR;
        Self {
            first_day_of_week,
            first_day_of_week_of_year,
        }
    }
}

/// A year paired with a 1-based ordinal day.
///
/// Values built with [`CalendarDate::new`] are always within the year. The
/// converter may hand out a `day_of_year` past the end of `year` when a week
/// date lands in the head of the following year; [`CalendarDate::normalized`]
/// folds such values into the adjacent year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{year:04}-{day_of_year:03}")]
pub struct CalendarDate {
    year:        i64,
    day_of_year: i64,
}

impl CalendarDate {
    /// Creates a date, validating that the day falls inside the year.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDayOfYear` if `day_of_year` is not in
    /// `1..=days_in_year(year)`.
    pub fn new(year: i64, day_of_year: i64) -> Result<Self, CalendarError> {
        if !(1..=days_in_year(year)).contains(&day_of_year) {
            return Err(CalendarError::InvalidDayOfYear { year, day_of_year });
        }
        Ok(Self { year, day_of_year })
    }

    pub(crate) const fn new_unchecked(year: i64, day_of_year: i64) -> Self {
        Self { year, day_of_year }
    }

    #[inline]
    pub const fn year(self) -> i64 {
        self.year
    }

    #[inline]
    pub const fn day_of_year(self) -> i64 {
        self.day_of_year
    }

    /// Returns true if the day falls inside `year`
    pub const fn is_normalized(self) -> bool {
        self.day_of_year >= 1 && self.day_of_year <= days_in_year(self.year)
    }

    /// Resolves the date to a civil date, rolling days outside the year into
    /// the neighbouring years.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` if the resulting year does not fit
    /// a `CivilDate`.
    pub fn to_civil(self) -> Result<CivilDate, CalendarError> {
        if i32::try_from(self.year).is_err() {
            return Err(CalendarError::OutOfRange(self.to_string()));
        }
        let jan1 = CivilDate::epoch_day_of_jan1(self.year);
        let epoch_day = jan1
            .checked_add(self.day_of_year - 1)
            .ok_or_else(|| CalendarError::OutOfRange(self.to_string()))?;
        CivilDate::from_epoch_day(epoch_day)
    }

    /// Returns the same day expressed inside its own year.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` if the day cannot be represented.
    pub fn normalized(self) -> Result<Self, CalendarError> {
        if self.is_normalized() {
            return Ok(self);
        }
        let civil = self.to_civil()?;
        Ok(Self::new_unchecked(i64::from(civil.year()), civil.day_of_year()))
    }
}

impl From<CivilDate> for CalendarDate {
    fn from(date: CivilDate) -> Self {
        Self::new_unchecked(i64::from(date.year()), date.day_of_year())
    }
}

/// A (year, week, weekday) triple.
///
/// `weekday` uses the numbering of the rule the week date was produced
/// under: `first_day_of_week` is the first day of each week and
/// `first_day_of_week + 6` the last (ISO: Monday = 1 through Sunday = 7).
///
/// Week dates only come from [`WeekDate::new`] or
/// [`week_of_year`](crate::week_of_year), so they always name a week that
/// exists. They serialize as plain structs but are not deserializable: the
/// rule they were numbered under is not part of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[display(fmt = "{year:04}-W{week:02}-{weekday}")]
pub struct WeekDate {
    year:    i32,
    week:    i32,
    weekday: i32,
}

impl WeekDate {
    /// Creates a week date that is valid under `rule`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidWeek` if `week` is not in
    /// `1..=weeks_in_year(year, rule)` and `CalendarError::InvalidWeekday` if
    /// `weekday` lies outside the rule's weekday numbering.
    pub fn new(year: i32, week: i32, weekday: i32, rule: WeekRule) -> Result<Self, CalendarError> {
        let max_week = weeks_in_year(year, rule)?;
        if !(1..=max_week).contains(&week) {
            return Err(CalendarError::InvalidWeek { year, week, max_week });
        }
        if !(rule.min_weekday()..=rule.max_weekday()).contains(&weekday) {
            return Err(CalendarError::InvalidWeekday {
                weekday,
                min: rule.min_weekday(),
                max: rule.max_weekday(),
            });
        }
        Ok(Self { year, week, weekday })
    }

    pub(crate) const fn new_unchecked(year: i32, week: i32, weekday: i32) -> Self {
        Self { year, week, weekday }
    }

    /// Week-numbering year
    #[inline]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[inline]
    pub const fn week(self) -> i32 {
        self.week
    }

    #[inline]
    pub const fn weekday(self) -> i32 {
        self.weekday
    }

    /// Ordinal date of this week date under `rule`.
    pub fn to_calendar_date(self, rule: WeekRule) -> CalendarDate {
        crate::convert::week_date_to_day_of_year(self.year, self.week, Some(self.weekday), rule)
    }
}

// Helper functions

pub const fn is_leap_year(year: i64) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

pub const fn days_in_year(year: i64) -> i64 {
    if is_leap_year(year) {
        DAYS_IN_LEAP_YEAR
    } else {
        DAYS_IN_COMMON_YEAR
    }
}

/// Days in `month` of `year`, or `None` if `month` is not in `1..=12`.
pub(crate) const fn days_in_month(year: i32, month: u8) -> Option<u8> {
    if month == 0 || month > MAX_MONTH {
        return None;
    }
    if month == FEBRUARY && is_leap_year(year as i64) {
        Some(FEBRUARY_DAYS_LEAP)
    } else {
        Some(DAYS_IN_MONTH[month as usize])
    }
}
