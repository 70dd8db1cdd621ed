use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Parses an "HH:mm" schedule string into minutes since midnight.
pub fn parse_hhmm(value: &str) -> Option<i64> {
    let (h, m) = value.split_once(':')?;
    let hours: i64 = h.parse().ok()?;
    let minutes: i64 = m.parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

pub fn time_minutes(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Minutes late after the grace period; never negative.
pub fn late_minutes(actual_min: i64, scheduled_start_min: i64, grace_minutes: i64) -> i64 {
    (actual_min - scheduled_start_min - grace_minutes).max(0)
}

/// Minutes of early departure before the scheduled end, after grace.
pub fn early_minutes(actual_min: i64, scheduled_end_min: i64, grace_minutes: i64) -> i64 {
    (scheduled_end_min - actual_min - grace_minutes).max(0)
}

/// A flexible-arrival band suppresses lateness entirely when the actual
/// time falls inside [earliest, latest].
pub fn within_flex_window(
    actual_min: i64,
    flex_earliest: Option<&str>,
    flex_latest: Option<&str>,
) -> bool {
    match (
        flex_earliest.and_then(parse_hhmm),
        flex_latest.and_then(parse_hhmm),
    ) {
        (Some(earliest), Some(latest)) => actual_min >= earliest && actual_min <= latest,
        _ => false,
    }
}

/// Hours between clock-in and clock-out net of break time, rounded to 2 dp.
pub fn worked_hours(clock_in: NaiveDateTime, clock_out: NaiveDateTime, break_minutes: i64) -> f64 {
    let span_minutes = (clock_out - clock_in).num_minutes();
    round2((span_minutes - break_minutes) as f64 / 60.0)
}

pub fn overtime_hours(worked: f64, standard_hours: f64) -> f64 {
    round2((worked - standard_hours).max(0.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn minute_of(hhmm: &str) -> i64 {
        parse_hhmm(hhmm).unwrap()
    }

    #[test]
    fn parse_hhmm_accepts_valid_and_rejects_garbage() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("09:60"), None);
        assert_eq!(parse_hhmm("0900"), None);
        assert_eq!(parse_hhmm("nine"), None);
    }

    #[test]
    fn clock_in_at_0920_with_5_grace_is_15_minutes_late() {
        let minutes = late_minutes(minute_of("09:20"), minute_of("09:00"), 5);
        assert_eq!(minutes, 15);
        // 15-minute threshold: flagged.
        assert!(minutes >= 15);
    }

    #[test]
    fn clock_in_at_0910_with_5_grace_is_below_the_threshold() {
        let minutes = late_minutes(minute_of("09:10"), minute_of("09:00"), 5);
        assert_eq!(minutes, 5);
        assert!(minutes < 15);
    }

    #[test]
    fn lateness_is_zero_up_to_schedule_plus_grace() {
        let start = minute_of("09:00");
        for actual in [minute_of("07:30"), start, start + 1, start + 5] {
            assert_eq!(late_minutes(actual, start, 5), 0);
        }
    }

    #[test]
    fn lateness_is_monotonically_non_decreasing_in_actual_time() {
        let start = minute_of("09:00");
        let mut previous = 0;
        for actual in start - 30..start + 120 {
            let current = late_minutes(actual, start, 5);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn early_leave_mirrors_lateness() {
        let end = minute_of("18:00");
        assert_eq!(early_minutes(minute_of("17:30"), end, 5), 25);
        assert_eq!(early_minutes(minute_of("17:56"), end, 5), 0);
        assert_eq!(early_minutes(minute_of("18:10"), end, 5), 0);
    }

    #[test]
    fn flex_window_suppresses_lateness() {
        assert!(within_flex_window(
            minute_of("09:45"),
            Some("08:00"),
            Some("10:00")
        ));
        assert!(!within_flex_window(
            minute_of("10:01"),
            Some("08:00"),
            Some("10:00")
        ));
        // No band configured means no suppression.
        assert!(!within_flex_window(minute_of("09:45"), None, None));
        assert!(!within_flex_window(minute_of("09:45"), Some("08:00"), None));
    }

    #[test]
    fn worked_hours_excludes_breaks_and_rounds() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let clock_in = date.and_hms_opt(9, 0, 0).unwrap();
        let clock_out = date.and_hms_opt(18, 0, 0).unwrap();

        assert_eq!(worked_hours(clock_in, clock_out, 60), 8.0);
        assert_eq!(worked_hours(clock_in, clock_out, 0), 9.0);
        // 8h35m after a 25-minute break.
        assert_eq!(worked_hours(clock_in, clock_out, 25), 8.58);
    }

    #[test]
    fn overtime_is_never_negative() {
        assert_eq!(overtime_hours(9.5, 8.0), 1.5);
        assert_eq!(overtime_hours(7.0, 8.0), 0.0);
    }
}
