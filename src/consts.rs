/// Milliseconds in a calendar day (leap seconds are not modelled)
pub const MS_PER_DAY: i64 = 86_400_000;

/// Days in a common year
pub const DAYS_IN_COMMON_YEAR: i64 = 365;
/// Days in a leap year
pub const DAYS_IN_LEAP_YEAR: i64 = 366;
/// Days in a week
pub const DAYS_IN_WEEK: i64 = 7;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;

/// Month number for January
pub const JANUARY: u8 = 1;
/// Month number for February
pub const FEBRUARY: u8 = 2;
/// Month number for December
pub const DECEMBER: u8 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i64 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i64 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i64 = 400;

/// Days in one 400 year Gregorian cycle
pub(crate) const DAYS_IN_ERA: i64 = 146_097;
/// Days from 0000-03-01 to 1970-01-01
pub(crate) const DAYS_FROM_0000_03_01_TO_EPOCH: i64 = 719_468;
/// 1970-01-01 was a Thursday (Sunday = 0)
pub(crate) const EPOCH_WEEKDAY_FROM_SUNDAY: i64 = 4;

/// Highest day number of the week a rule may start on (Monday). Week dates
/// only round-trip for weeks starting on Sunday or Monday.
pub const MAX_FIRST_DAY_OF_WEEK: i32 = 1;
/// Lowest accepted `first_day_of_week_of_year`
pub const MIN_FIRST_DAY_OF_WEEK_OF_YEAR: i32 = 1;
/// Highest accepted `first_day_of_week_of_year`
pub const MAX_FIRST_DAY_OF_WEEK_OF_YEAR: i32 = 7;

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';
