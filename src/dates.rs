use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local wall-clock time, the "now" streaks are evaluated against.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn day_string(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Truncates an instant to the day-string of its local calendar date.
pub fn to_day_string<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    day_string(instant.with_timezone(&Local).date_naive())
}

pub fn parse_day(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Whole days elapsed from `earlier` to `later`, rounding any partial day up.
///
/// Twelve hours count as one day, exactly one day counts as one, and a
/// negative span rounds towards zero the same way.
pub fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    let millis = (later - earlier).num_milliseconds();
    let whole = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        whole
    } else {
        whole + 1
    }
}
