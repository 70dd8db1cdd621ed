use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, BreakRecord, BreakType};

/// Opens a new break on the record. One break at a time per employee.
pub fn start_break(
    record: &mut AttendanceRecord,
    break_type: BreakType,
    now: NaiveDateTime,
) -> DomainResult<BreakRecord> {
    if record.status != AttendanceStatus::ClockedIn {
        return Err(DomainError::StateConflict(
            "Cannot start a break after clocking out".into(),
        ));
    }

    if record.open_break().is_some() {
        return Err(DomainError::StateConflict(
            "A break is already in progress".into(),
        ));
    }

    let entry = BreakRecord {
        id: Uuid::new_v4().to_string(),
        break_type,
        start_time: now,
        end_time: None,
        duration_minutes: None,
        scheduled_minutes: break_type.default_scheduled_minutes(),
        is_paid: break_type.default_paid(),
    };

    record.breaks.push(entry.clone());
    Ok(entry)
}

/// Closes the break with the given id and recomputes the break totals.
pub fn end_break(
    record: &mut AttendanceRecord,
    break_id: &str,
    now: NaiveDateTime,
) -> DomainResult<BreakRecord> {
    let entry = record
        .breaks
        .iter_mut()
        .find(|b| b.id == break_id)
        .ok_or_else(|| DomainError::NotFound("Break".into()))?;

    if entry.end_time.is_some() {
        return Err(DomainError::StateConflict("Break is already ended".into()));
    }

    entry.end_time = Some(now);
    entry.duration_minutes = Some((now - entry.start_time).num_minutes());
    let closed = entry.clone();

    recompute_totals(record);
    Ok(closed)
}

/// Sums closed break durations into the denormalized totals.
pub fn recompute_totals(record: &mut AttendanceRecord) {
    record.total_break_minutes = record
        .breaks
        .iter()
        .filter_map(|b| b.duration_minutes)
        .sum();
    record.unpaid_break_minutes = record
        .breaks
        .iter()
        .filter(|b| !b.is_paid)
        .filter_map(|b| b.duration_minutes)
        .sum();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn open_record() -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            employee_id: 1001,
            date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            clock_in_time: at(9, 0),
            clock_out_time: None,
            status: AttendanceStatus::ClockedIn,
            schedule_start: "09:00".into(),
            schedule_end: "18:00".into(),
            minutes_late: 0,
            minutes_early: 0,
            is_late: false,
            is_excused_late: false,
            is_early_leave: false,
            is_approved_early_leave: false,
            breaks: Vec::new(),
            total_break_minutes: 0,
            unpaid_break_minutes: 0,
            clock_in_location: None,
            clock_out_location: None,
            duration_hours: None,
            penalties: Vec::new(),
            requires_approval: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn lunch_defaults_to_unpaid_sixty_minutes() {
        let mut record = open_record();
        let lunch = start_break(&mut record, BreakType::Lunch, at(12, 0)).unwrap();
        assert!(!lunch.is_paid);
        assert_eq!(lunch.scheduled_minutes, 60);

        let mut record = open_record();
        let rest = start_break(&mut record, BreakType::Rest, at(15, 0)).unwrap();
        assert!(rest.is_paid);
        assert_eq!(rest.scheduled_minutes, 15);
    }

    #[test]
    fn second_concurrent_break_is_rejected() {
        let mut record = open_record();
        start_break(&mut record, BreakType::Lunch, at(12, 0)).unwrap();

        let err = start_break(&mut record, BreakType::Rest, at(12, 10)).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn ending_twice_fails_the_second_call() {
        let mut record = open_record();
        let lunch = start_break(&mut record, BreakType::Lunch, at(12, 0)).unwrap();

        end_break(&mut record, &lunch.id, at(12, 45)).unwrap();
        let err = end_break(&mut record, &lunch.id, at(12, 50)).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn ending_an_unknown_break_is_not_found() {
        let mut record = open_record();
        let err = end_break(&mut record, "no-such-id", at(12, 45)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn totals_split_paid_and_unpaid_minutes() {
        let mut record = open_record();

        let lunch = start_break(&mut record, BreakType::Lunch, at(12, 0)).unwrap();
        end_break(&mut record, &lunch.id, at(12, 45)).unwrap();

        let rest = start_break(&mut record, BreakType::Rest, at(15, 0)).unwrap();
        end_break(&mut record, &rest.id, at(15, 10)).unwrap();

        assert_eq!(record.total_break_minutes, 55);
        assert_eq!(record.unpaid_break_minutes, 45);
    }

    #[test]
    fn break_after_clock_out_is_rejected() {
        let mut record = open_record();
        record.status = AttendanceStatus::ClockedOut;

        let err = start_break(&mut record, BreakType::Rest, at(18, 30)).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }
}
