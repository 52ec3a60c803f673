//! Day-of-year and week-date conversions for the proleptic Gregorian calendar.
//!
//! The crate converts between three views of a day:
//!
//! - a week date, `(year, week, weekday)`, numbered under a [`WeekRule`],
//! - an ordinal date, [`CalendarDate`], `(year, day_of_year)`,
//! - a calendar instant of some host date type implementing
//!   [`CalendarInstant`] (the crate's own [`CivilDate`] or a `chrono` type).
//!
//! ```
//! use calendar_day::{week_date_to_day_of_year, week_of_year, CivilDate, WeekRule};
//!
//! let ordinal = week_date_to_day_of_year(2016, 1, Some(1), WeekRule::ISO);
//! assert_eq!((ordinal.year(), ordinal.day_of_year()), (2016, 4));
//!
//! let date: CivilDate = "2016-01-01".parse().unwrap();
//! let week = week_of_year(&date, WeekRule::ISO).unwrap();
//! assert_eq!(week.to_string(), "2015-W53-5");
//! ```

mod civil;
mod consts;
mod convert;
mod instant;
mod prelude;
mod types;

pub use civil::CivilDate;
pub use consts::*;
pub use convert::{date_to_day_of_year, day_of_year_to_date, week_date_to_day_of_year, week_of_year, weeks_in_year};
pub use instant::CalendarInstant;
pub use types::{days_in_year, is_leap_year, CalendarDate, WeekDate, WeekRule};

/// Error type for calendar operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Week rule starts its weeks on a day other than Sunday or Monday.
    #[error("Invalid first day of week: {0} (must be 0-1)")]
    InvalidFirstDayOfWeek(i32),

    /// Week rule anchors week 1 with an out of range value.
    #[error("Invalid first day of week of year: {0} (must be 1-7)")]
    InvalidFirstDayOfWeekOfYear(i32),

    #[error("Invalid month: {0} (must be 1-12)")]
    InvalidMonth(u8),

    #[error("Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: i32, month: u8, day: u8 },

    #[error("Invalid day of year {day_of_year} for year {year}")]
    InvalidDayOfYear { year: i64, day_of_year: i64 },

    #[error("Invalid week {week} for year {year} (must be 1-{max_week})")]
    InvalidWeek { year: i32, week: i32, max_week: i32 },

    #[error("Invalid weekday {weekday} (must be {min}-{max})")]
    InvalidWeekday { weekday: i32, min: i32, max: i32 },

    #[error("Invalid date format: {0}")]
    InvalidFormat(String),

    #[error("Empty date string")]
    EmptyInput,

    /// Result does not fit the target date type.
    #[error("Date out of range: {0}")]
    OutOfRange(String),

    /// Local wall-clock time has no instant in the time zone.
    #[error("Local time {0} does not exist in this time zone")]
    NonexistentLocalTime(String),
}
