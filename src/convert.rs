//! Conversions between week dates, ordinal dates and calendar instants.
//!
//! Week numbering is parameterised by a [`WeekRule`]. Everything here is a
//! pure function of its arguments; day arithmetic on host types goes through
//! [`CalendarInstant`].

use crate::civil::{self, CivilDate};
use crate::consts::{DAYS_IN_WEEK, DECEMBER, MS_PER_DAY};
use crate::instant::CalendarInstant;
use crate::types::{days_in_year, CalendarDate, WeekDate, WeekRule};
use crate::CalendarError;

/// Converts a week date to an ordinal date.
///
/// `weekday` is numbered per `rule` (ISO: Monday = 1 through Sunday = 7) and
/// defaults to the rule's first day of the week. A result that falls before
/// January 1 of `year` is moved into the tail of the previous year. A result
/// past the end of `year` keeps `year` and an out-of-range `day_of_year`; see
/// [`CalendarDate::normalized`].
///
/// Out-of-range `week` and `weekday` values are extrapolated rather than
/// rejected. Use [`WeekDate::new`] to validate them first.
pub fn week_date_to_day_of_year(year: i32, week: i32, weekday: Option<i32>, rule: WeekRule) -> CalendarDate {
    let year = i64::from(year);
    let first_day_of_week = i64::from(rule.first_day_of_week());
    let first_day_of_week_of_year = i64::from(rule.first_day_of_week_of_year());
    let weekday = weekday.map_or(first_day_of_week, i64::from);

    let jan1 = jan1_iso_weekday(year);
    let days_to_add = first_day_of_week - jan1 + if jan1 > first_day_of_week_of_year { DAYS_IN_WEEK } else { 0 }
        - if jan1 < first_day_of_week { DAYS_IN_WEEK } else { 0 };
    let day_of_year = DAYS_IN_WEEK * (i64::from(week) - 1) + (weekday - first_day_of_week) + days_to_add + 1;

    if day_of_year > 0 {
        CalendarDate::new_unchecked(year, day_of_year)
    } else {
        let previous = year - 1;
        tracing::trace!(year, week, day_of_year, "week date falls in the previous year");
        CalendarDate::new_unchecked(previous, days_in_year(previous) + day_of_year)
    }
}

/// ISO weekday (Monday = 1 through Sunday = 7) of January 1 of `year`.
fn jan1_iso_weekday(year: i64) -> i64 {
    match civil::weekday_from_sunday(CivilDate::epoch_day_of_jan1(year)) {
        0 => DAYS_IN_WEEK,
        d => d,
    }
}

/// 1-based ordinal day of `date` within its year.
///
/// Measured as whole days between local midnights, rounded so a year that
/// crossed a DST transition still yields an integer.
///
/// # Errors
/// Propagates errors from truncating `date` to midnight.
pub fn date_to_day_of_year<T: CalendarInstant>(date: &T) -> Result<i64, CalendarError> {
    let start_of_day = date.start_of_day()?;
    let start_of_year = date.start_of_year()?;
    let elapsed = start_of_day.millis_since(&start_of_year);
    if elapsed % MS_PER_DAY != 0 {
        tracing::debug!(elapsed, "day boundaries are not a whole number of days apart");
    }
    Ok(round_days(elapsed) + 1)
}

/// Rounds a millisecond span to whole days, halves towards positive infinity.
const fn round_days(millis: i64) -> i64 {
    (millis + MS_PER_DAY / 2).div_euclid(MS_PER_DAY)
}

/// Returns the start of day `day_of_year` of `date`'s year.
///
/// The offset from `date`'s own day is applied with the host type's day
/// addition, so values outside the year roll into the neighbouring years.
///
/// # Errors
/// Propagates errors from the host type's day arithmetic.
pub fn day_of_year_to_date<T: CalendarInstant>(date: &T, day_of_year: i64) -> Result<T, CalendarError> {
    let current = date_to_day_of_year(date)?;
    let offset = day_of_year
        .checked_sub(current)
        .ok_or_else(|| CalendarError::OutOfRange(format!("day of year {day_of_year}")))?;
    date.start_of_day()?.add_days(offset)
}

/// Week date of `date` under `rule`.
///
/// Fed back into [`week_date_to_day_of_year`] under the same rule, the result
/// names `date` again (after [`CalendarDate::normalized`]).
///
/// The returned year is the week-numbering year, which differs from the
/// calendar year for days in the first or last week of a year.
///
/// # Errors
/// Propagates errors from the host type's day arithmetic.
pub fn week_of_year<T: CalendarInstant>(date: &T, rule: WeekRule) -> Result<WeekDate, CalendarError> {
    let first_day_of_week = i64::from(rule.first_day_of_week());
    let first_day_of_week_of_year = i64::from(rule.first_day_of_week_of_year());
    let weekday = i64::from(date.weekday_from_sunday());

    // Move to the day of this week that decides which year the week belongs to
    let end = first_day_of_week_of_year - first_day_of_week;
    let mut shift = first_day_of_week_of_year - weekday;
    if shift > end {
        shift -= DAYS_IN_WEEK;
    }
    if shift < end - DAYS_IN_WEEK {
        shift += DAYS_IN_WEEK;
    }

    let anchor = date.start_of_day()?.add_days(shift)?;
    let week = (date_to_day_of_year(&anchor)? + DAYS_IN_WEEK - 1) / DAYS_IN_WEEK;
    let weekday = first_day_of_week + (weekday - first_day_of_week).rem_euclid(DAYS_IN_WEEK);

    // week is at most 53 and weekday at most 12
    #[allow(clippy::cast_possible_truncation)]
    let (week, weekday) = (week as i32, weekday as i32);
    Ok(WeekDate::new_unchecked(anchor.year(), week, weekday))
}

/// Number of weeks (52 or 53) in the week-numbering `year` under `rule`.
///
/// # Errors
/// Returns `CalendarError::OutOfRange` for years at the edge of the `i32`
/// range whose last week cannot be represented.
pub fn weeks_in_year(year: i32, rule: WeekRule) -> Result<i32, CalendarError> {
    // This day always lies in the last week of the week-numbering year
    let offset = i64::from(rule.first_day_of_week() - rule.first_day_of_week_of_year());
    let dec31 = CivilDate::new(year, DECEMBER, 31)?;
    let probe = dec31.checked_add_days(offset)?;
    Ok(week_of_year(&probe, rule)?.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, TimeZone, Utc};

    fn civil(s: &str) -> CivilDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_iso_week_one_2016() {
        // 2016-01-01 is a Friday, so ISO week 1 starts on Monday 2016-01-04
        let got = week_date_to_day_of_year(2016, 1, Some(1), WeekRule::ISO);
        assert_eq!((got.year(), got.day_of_year()), (2016, 4));
    }

    #[test]
    fn test_weekday_defaults_to_first_day_of_week() {
        assert_eq!(
            week_date_to_day_of_year(2016, 1, None, WeekRule::ISO),
            week_date_to_day_of_year(2016, 1, Some(1), WeekRule::ISO)
        );
        assert_eq!(
            week_date_to_day_of_year(2016, 1, None, WeekRule::US),
            week_date_to_day_of_year(2016, 1, Some(0), WeekRule::US)
        );
    }

    #[test]
    fn test_week_date_to_day_of_year_cases() {
        struct TestCase {
            year:        i32,
            week:        i32,
            weekday:     i32,
            rule:        WeekRule,
            expected:    (i64, i64),
            description: &'static str,
        }

        let cases = [
            TestCase {
                year:        2021,
                week:        1,
                weekday:     1,
                rule:        WeekRule::ISO,
                expected:    (2021, 4),
                description: "2021-01-01 is a Friday, week 1 starts on the 4th",
            },
            TestCase {
                year:        2020,
                week:        1,
                weekday:     1,
                rule:        WeekRule::ISO,
                expected:    (2019, 364),
                description: "2020-W01-1 is 2019-12-30",
            },
            TestCase {
                year:        2021,
                week:        0,
                weekday:     4,
                rule:        WeekRule::ISO,
                expected:    (2020, 366),
                description: "week zero rolls into a leap year's last day",
            },
            TestCase {
                year:        2018,
                week:        1,
                weekday:     1,
                rule:        WeekRule::ISO,
                expected:    (2018, 1),
                description: "2018-01-01 is a Monday",
            },
            TestCase {
                year:        2015,
                week:        53,
                weekday:     5,
                rule:        WeekRule::ISO,
                expected:    (2015, 366),
                description: "2015-W53-5 is 2016-01-01, left past the end of 2015",
            },
            TestCase {
                year:        2016,
                week:        1,
                weekday:     0,
                rule:        WeekRule::US,
                expected:    (2015, 361),
                description: "US week 1 of 2016 starts on Sunday 2015-12-27",
            },
            TestCase {
                year:        2016,
                week:        1,
                weekday:     5,
                rule:        WeekRule::US,
                expected:    (2016, 1),
                description: "US week 1 of 2016 holds Friday January 1",
            },
            TestCase {
                year:        2017,
                week:        1,
                weekday:     0,
                rule:        WeekRule::US,
                expected:    (2017, 1),
                description: "2017-01-01 is a Sunday",
            },
        ];

        for case in &cases {
            let got = week_date_to_day_of_year(case.year, case.week, Some(case.weekday), case.rule);
            assert_eq!((got.year(), got.day_of_year()), case.expected, "{}", case.description);
        }
    }

    #[test]
    fn test_negative_rollover_uses_previous_year_length() {
        // Raw day -1 of 2020 and of 2021: previous years 2019 (365) and 2020 (366)
        let got = week_date_to_day_of_year(2020, 1, Some(1), WeekRule::ISO);
        assert_eq!((got.year(), got.day_of_year()), (2019, 365 - 1));

        let got = week_date_to_day_of_year(2021, 0, Some(3), WeekRule::ISO);
        assert_eq!((got.year(), got.day_of_year()), (2020, 366 - 1));
        assert_eq!(got.to_civil().unwrap(), civil("2020-12-30"));
    }

    #[test]
    fn test_out_of_range_inputs_are_extrapolated() {
        let got = week_date_to_day_of_year(2016, 99, Some(1), WeekRule::ISO);
        assert_eq!((got.year(), got.day_of_year()), (2016, 4 + 98 * 7));
        assert!(!got.is_normalized());

        // Only a single year of rollover is applied
        let got = week_date_to_day_of_year(i32::MIN, i32::MIN, Some(i32::MIN), WeekRule::ISO);
        assert_eq!(got.year(), i64::from(i32::MIN) - 1);
        assert!(!got.is_normalized());
    }

    #[test]
    fn test_date_to_day_of_year() {
        struct TestCase {
            date:     &'static str,
            expected: i64,
        }

        let cases = [
            TestCase {
                date:     "2021-01-01",
                expected: 1,
            },
            TestCase {
                date:     "2021-12-31",
                expected: 365,
            },
            TestCase {
                date:     "2020-12-31",
                expected: 366,
            },
            TestCase {
                date:     "2020-02-29",
                expected: 60,
            },
            TestCase {
                date:     "1900-03-01",
                expected: 60,
            },
        ];

        for case in &cases {
            assert_eq!(date_to_day_of_year(&civil(case.date)).unwrap(), case.expected, "{}", case.date);
        }
    }

    #[test]
    fn test_date_to_day_of_year_ignores_time_of_day() {
        let dt = Utc.with_ymd_and_hms(2021, 2, 1, 23, 59, 59).unwrap();
        assert_eq!(date_to_day_of_year(&dt).unwrap(), 32);

        let naive = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap().and_hms_opt(0, 0, 1).unwrap();
        assert_eq!(date_to_day_of_year(&naive).unwrap(), 32);
    }

    #[test]
    fn test_round_days() {
        assert_eq!(round_days(0), 0);
        assert_eq!(round_days(MS_PER_DAY * 164 + MS_PER_DAY - 3_600_000), 165);
        assert_eq!(round_days(MS_PER_DAY * 300 + 3_600_000), 300);
        assert_eq!(round_days(MS_PER_DAY / 2), 1);
        assert_eq!(round_days(-MS_PER_DAY / 2), 0);
    }

    #[test]
    fn test_day_of_year_to_date() {
        let base = civil("2020-05-17");
        assert_eq!(day_of_year_to_date(&base, 366).unwrap(), civil("2020-12-31"));
        assert_eq!(day_of_year_to_date(&base, 1).unwrap(), civil("2020-01-01"));
        assert_eq!(day_of_year_to_date(&base, 60).unwrap(), civil("2020-02-29"));
        assert_eq!(day_of_year_to_date(&base, 367).unwrap(), civil("2021-01-01"));
        assert_eq!(day_of_year_to_date(&base, 0).unwrap(), civil("2019-12-31"));
        assert_eq!(day_of_year_to_date(&base, -364).unwrap(), civil("2019-01-01"));
    }

    #[test]
    fn test_day_of_year_to_date_truncates_to_midnight() {
        let dt = Utc.with_ymd_and_hms(2020, 7, 4, 15, 45, 0).unwrap();
        assert_eq!(
            day_of_year_to_date(&dt, 366).unwrap(),
            Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_day_of_year_to_date_overflow() {
        let base = civil("2020-05-17");
        assert!(matches!(
            day_of_year_to_date(&base, i64::MAX),
            Err(CalendarError::OutOfRange(_))
        ));
        assert!(day_of_year_to_date(&base, i64::MIN).is_err());
    }

    #[test]
    fn test_week_of_year_iso() {
        struct TestCase {
            date:     &'static str,
            expected: (i32, i32, i32),
        }

        let cases = [
            TestCase {
                date:     "2016-01-01",
                expected: (2015, 53, 5),
            },
            TestCase {
                date:     "2016-01-03",
                expected: (2015, 53, 7),
            },
            TestCase {
                date:     "2016-01-04",
                expected: (2016, 1, 1),
            },
            TestCase {
                date:     "2016-01-10",
                expected: (2016, 1, 7),
            },
            TestCase {
                date:     "2019-12-30",
                expected: (2020, 1, 1),
            },
            TestCase {
                date:     "2020-12-31",
                expected: (2020, 53, 4),
            },
            TestCase {
                date:     "2021-01-03",
                expected: (2020, 53, 7),
            },
        ];

        for case in &cases {
            let got = week_of_year(&civil(case.date), WeekRule::ISO).unwrap();
            assert_eq!((got.year(), got.week(), got.weekday()), case.expected, "{}", case.date);
        }
    }

    #[test]
    fn test_week_of_year_matches_chrono_iso_week() {
        let mut date = NaiveDate::from_ymd_opt(1999, 12, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2030, 2, 1).unwrap();
        while date < end {
            let iso = date.iso_week();
            let got = week_of_year(&date, WeekRule::ISO).unwrap();
            let expected_weekday = i32::try_from(date.weekday().number_from_monday()).unwrap();
            assert_eq!(got.year(), iso.year(), "{date}");
            assert_eq!(got.week(), i32::try_from(iso.week()).unwrap(), "{date}");
            assert_eq!(got.weekday(), expected_weekday, "{date}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_week_of_year_us() {
        let got = week_of_year(&civil("2016-01-02"), WeekRule::US).unwrap();
        assert_eq!((got.year(), got.week(), got.weekday()), (2016, 1, 6));

        let got = week_of_year(&civil("2016-01-03"), WeekRule::US).unwrap();
        assert_eq!((got.year(), got.week(), got.weekday()), (2016, 2, 0));

        let got = week_of_year(&civil("2015-12-27"), WeekRule::US).unwrap();
        assert_eq!((got.year(), got.week(), got.weekday()), (2016, 1, 0));
    }

    #[test]
    fn test_weeks_in_year() {
        struct TestCase {
            year:     i32,
            rule:     WeekRule,
            expected: i32,
        }

        let cases = [
            TestCase {
                year:     2015,
                rule:     WeekRule::ISO,
                expected: 53,
            },
            TestCase {
                year:     2016,
                rule:     WeekRule::ISO,
                expected: 52,
            },
            TestCase {
                year:     2020,
                rule:     WeekRule::ISO,
                expected: 53,
            },
            TestCase {
                year:     2021,
                rule:     WeekRule::ISO,
                expected: 52,
            },
            TestCase {
                year:     2016,
                rule:     WeekRule::US,
                expected: 53,
            },
            TestCase {
                year:     2011,
                rule:     WeekRule::US,
                expected: 53,
            },
            TestCase {
                year:     2017,
                rule:     WeekRule::US,
                expected: 52,
            },
            TestCase {
                year:     2018,
                rule:     WeekRule::US,
                expected: 52,
            },
        ];

        for case in &cases {
            assert_eq!(
                weeks_in_year(case.year, case.rule).unwrap(),
                case.expected,
                "{} under {}",
                case.year,
                case.rule
            );
        }
    }

    /// A zoned clock whose UTC offset moves from -05:00 to -04:00 at
    /// 2021-03-14T07:00Z, enough to exercise day lengths of 23 hours.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct DstClock {
        utc_ms: i64,
    }

    impl DstClock {
        const HOUR_MS: i64 = 3_600_000;
        const TRANSITION_MS: i64 = 1_615_705_200_000;

        const fn offset_ms(utc_ms: i64) -> i64 {
            if utc_ms < Self::TRANSITION_MS {
                -5 * Self::HOUR_MS
            } else {
                -4 * Self::HOUR_MS
            }
        }

        fn from_local_ms(local_ms: i64) -> Self {
            let after = local_ms + 4 * Self::HOUR_MS;
            if after >= Self::TRANSITION_MS {
                Self { utc_ms: after }
            } else {
                Self {
                    utc_ms: local_ms + 5 * Self::HOUR_MS,
                }
            }
        }

        fn at(date: &str, hour: i64) -> Self {
            Self::from_local_ms(civil(date).to_epoch_day() * MS_PER_DAY + hour * Self::HOUR_MS)
        }

        const fn local_ms(self) -> i64 {
            self.utc_ms + Self::offset_ms(self.utc_ms)
        }

        fn local_date(self) -> CivilDate {
            CivilDate::from_epoch_day(self.local_ms().div_euclid(MS_PER_DAY)).unwrap()
        }
    }

    impl CalendarInstant for DstClock {
        fn year(&self) -> i32 {
            self.local_date().year()
        }

        fn weekday_from_sunday(&self) -> u8 {
            self.local_date().weekday_from_sunday()
        }

        fn start_of_day(&self) -> Result<Self, CalendarError> {
            Ok(Self::from_local_ms(self.local_ms().div_euclid(MS_PER_DAY) * MS_PER_DAY))
        }

        fn start_of_year(&self) -> Result<Self, CalendarError> {
            let jan1 = CivilDate::first_of_year(self.year())?;
            Ok(Self::from_local_ms(jan1.to_epoch_day() * MS_PER_DAY))
        }

        fn millis_since(&self, earlier: &Self) -> i64 {
            self.utc_ms - earlier.utc_ms
        }

        fn add_days(&self, days: i64) -> Result<Self, CalendarError> {
            Ok(Self::from_local_ms(self.local_ms() + days * MS_PER_DAY))
        }
    }

    #[test]
    fn test_date_to_day_of_year_rounds_across_dst() {
        // Local midnights of Jan 1 and Jun 15 are 165 days less one hour apart
        let clock = DstClock::at("2021-06-15", 12);
        let start = clock.start_of_day().unwrap();
        let jan1 = clock.start_of_year().unwrap();
        assert_eq!(start.millis_since(&jan1), 165 * MS_PER_DAY - DstClock::HOUR_MS);
        assert_eq!(date_to_day_of_year(&clock).unwrap(), 166);
    }

    #[test]
    fn test_day_of_year_to_date_across_dst() {
        let clock = DstClock::at("2021-06-15", 12);
        let got = day_of_year_to_date(&clock, 1).unwrap();
        assert_eq!(got, DstClock::at("2021-01-01", 0));
        assert_eq!(got.local_date(), civil("2021-01-01"));

        let back = day_of_year_to_date(&got, 166).unwrap();
        assert_eq!(back, DstClock::at("2021-06-15", 0));
    }

    #[test]
    fn test_week_of_year_across_dst() {
        let clock = DstClock::at("2021-03-14", 12);
        let got = week_of_year(&clock, WeekRule::ISO).unwrap();
        assert_eq!((got.year(), got.week(), got.weekday()), (2021, 10, 7));
    }

    #[test]
    fn test_week_date_round_trip_for_every_rule() {
        let start = civil("2010-01-01");
        let end = civil("2021-12-31");
        for first_day_of_week in 0..=1 {
            for first_day_of_week_of_year in 1..=7 {
                let rule = WeekRule::new(first_day_of_week, first_day_of_week_of_year).unwrap();
                let mut date = start;
                while date <= end {
                    let week_date = week_of_year(&date, rule).unwrap();
                    let ordinal = week_date.to_calendar_date(rule).normalized().unwrap();
                    assert_eq!(ordinal, CalendarDate::from(date), "{rule} {date} -> {week_date}");
                    date = date.checked_add_days(1).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_week_of_year_monday_start_late_anchor() {
        // 2018-01-02 is a Tuesday; under 1/1 week 1 holds January 1
        let rule = WeekRule::new(1, 1).unwrap();
        let got = week_of_year(&civil("2018-01-02"), rule).unwrap();
        assert_eq!((got.year(), got.week(), got.weekday()), (2018, 1, 2));
        assert_eq!(got.to_calendar_date(rule), CalendarDate::new(2018, 2).unwrap());
    }

    quickcheck::quickcheck! {
        fn prop_week_date_round_trip(date: CivilDate, rule: WeekRule) -> bool {
            let week_date = week_of_year(&date, rule).unwrap();
            let ordinal = week_date.to_calendar_date(rule).normalized().unwrap();
            ordinal == CalendarDate::from(date)
                && ordinal.day_of_year() == date_to_day_of_year(&date).unwrap()
        }

        fn prop_day_of_year_to_date_is_idempotent(date: CivilDate) -> bool {
            let day_of_year = date_to_day_of_year(&date).unwrap();
            day_of_year_to_date(&date, day_of_year).unwrap() == date.start_of_day().unwrap()
        }

        fn prop_day_of_year_matches_chrono(date: CivilDate) -> bool {
            let Some(naive) = NaiveDate::from_ymd_opt(date.year(), u32::from(date.month()), u32::from(date.day()))
            else {
                return false;
            };
            date_to_day_of_year(&naive).unwrap() == i64::from(naive.ordinal())
                && date_to_day_of_year(&date).unwrap() == i64::from(naive.ordinal())
        }

        fn prop_week_is_within_year(date: CivilDate, rule: WeekRule) -> bool {
            let week_date = week_of_year(&date, rule).unwrap();
            let max = weeks_in_year(week_date.year(), rule).unwrap();
            (1..=max).contains(&week_date.week())
                && (rule.min_weekday()..=rule.max_weekday()).contains(&week_date.weekday())
        }
    }
}
