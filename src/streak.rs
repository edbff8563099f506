use crate::dates::{self, days_between, start_of_day};
use chrono::{NaiveDate, NaiveDateTime};

pub fn compute_streak<'a>(days: impl IntoIterator<Item = &'a NaiveDate>) -> u32 {
    compute_streak_at(days, dates::now())
}

/// Walks completion days from most recent to oldest, starting at `now`.
///
/// A day extends the chain while its distance from the previous accepted
/// point (rounded up to whole days) is at most `streak + 1`. That tolerance
/// lets the first completion sit up to a day behind `now`, and lets a
/// single skipped day still extend a chain once it has started. Known edge
/// case: do not tighten it without a product decision.
pub fn compute_streak_at<'a>(
    days: impl IntoIterator<Item = &'a NaiveDate>,
    now: NaiveDateTime,
) -> u32 {
    let mut sorted: Vec<NaiveDate> = days.into_iter().copied().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut streak = 0u32;
    let mut cursor = now;
    for day in sorted {
        let point = start_of_day(day);
        if days_between(cursor, point) <= i64::from(streak) + 1 {
            streak += 1;
            cursor = point;
        } else {
            break;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn noon() -> NaiveDateTime {
        today().and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
    }

    fn ago(days: i64) -> NaiveDate {
        today() - Duration::days(days)
    }

    #[test]
    fn empty_set_has_no_streak() {
        let none: [NaiveDate; 0] = [];
        assert_eq!(compute_streak_at(&none, noon()), 0);
    }

    #[test]
    fn today_alone_is_one() {
        assert_eq!(compute_streak_at(&[today()], noon()), 1);
    }

    #[test]
    fn consecutive_days_chain() {
        let days = [today(), ago(1), ago(2)];
        assert_eq!(compute_streak_at(&days, noon()), 3);
    }

    #[test]
    fn input_order_does_not_matter() {
        let days = [ago(2), today(), ago(1)];
        assert_eq!(compute_streak_at(&days, noon()), 3);
    }

    #[test]
    fn three_day_gap_breaks_chain() {
        let days = [today(), ago(3)];
        assert_eq!(compute_streak_at(&days, noon()), 1);
    }

    #[test]
    fn single_skipped_day_is_tolerated_after_first_completion() {
        let days = [today(), ago(2)];
        assert_eq!(compute_streak_at(&days, noon()), 2);
    }

    #[test]
    fn yesterday_only_counts_at_midnight_but_not_later() {
        let midnight = start_of_day(today());
        assert_eq!(compute_streak_at(&[ago(1)], midnight), 1);
        assert_eq!(compute_streak_at(&[ago(1)], noon()), 0);
    }

    #[test]
    fn old_completions_do_not_count() {
        let days = [ago(10), ago(11), ago(12)];
        assert_eq!(compute_streak_at(&days, noon()), 0);
    }

    #[test]
    fn future_days_are_accepted_as_current() {
        let days = [today() + Duration::days(1), today()];
        assert_eq!(compute_streak_at(&days, noon()), 2);
    }
}
