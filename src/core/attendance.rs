use chrono::{NaiveDateTime, Utc};

use crate::core::geofence::{self, GeofenceCheck};
use crate::core::time_rules;
use crate::error::{DomainError, DomainResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, LocationSnapshot};
use crate::model::location::WorkLocation;
use crate::model::schedule::DaySchedule;

/// Late or early departures at or beyond this many minutes flag the record
/// for supervisor approval.
pub const APPROVAL_THRESHOLD_MINUTES: i64 = 30;

/// Pre-fetched inputs for a clock-in decision. The builders are pure; every
/// repository read happens before they run.
#[derive(Debug, Clone)]
pub struct ClockInContext {
    pub employee_id: u64,
    pub now: NaiveDateTime,
    pub has_open_record_today: bool,
    pub on_approved_leave: bool,
    pub schedule: DaySchedule,
    pub position: Option<(f64, f64)>,
    pub remote_work: bool,
    pub locations: Vec<WorkLocation>,
}

#[derive(Debug, Clone)]
pub struct ClockOutContext {
    pub now: NaiveDateTime,
    pub position: Option<(f64, f64)>,
    pub remote_work: bool,
    pub locations: Vec<WorkLocation>,
    pub grace_minutes: i64,
    pub early_threshold_minutes: i64,
}

fn geofence_gate(
    position: Option<(f64, f64)>,
    remote_work: bool,
    locations: &[WorkLocation],
) -> DomainResult<Option<LocationSnapshot>> {
    let Some((lat, lon)) = position else {
        return Ok(None);
    };

    let check = geofence::check_position(lat, lon, locations);

    if remote_work {
        // Remote work keeps the snapshot for audit but skips the gate.
        return Ok(Some(geofence::snapshot(lat, lon, &check)));
    }

    match &check {
        GeofenceCheck::NoCandidates => Err(DomainError::Boundary(
            "No active work locations are configured".into(),
        )),
        GeofenceCheck::Resolved {
            location_name,
            distance_m,
            within,
            ..
        } => {
            if !within {
                return Err(DomainError::Boundary(format!(
                    "Outside the geofence: {:.0}m from {}",
                    distance_m, location_name
                )));
            }
            Ok(Some(geofence::snapshot(lat, lon, &check)))
        }
    }
}

/// Builds the day's attendance record for a clock-in event.
pub fn build_clock_in(ctx: ClockInContext) -> DomainResult<AttendanceRecord> {
    if ctx.has_open_record_today {
        return Err(DomainError::StateConflict("Already clocked in today".into()));
    }

    if ctx.on_approved_leave {
        return Err(DomainError::Boundary(
            "Cannot clock in while on approved leave".into(),
        ));
    }

    ctx.schedule.warn_if_inconsistent("clock-in");

    let start_min = time_rules::parse_hhmm(&ctx.schedule.start)
        .ok_or_else(|| DomainError::Validation("Invalid schedule start time".into()))?;
    let actual_min = time_rules::time_minutes(ctx.now.time());

    let minutes_late = if time_rules::within_flex_window(
        actual_min,
        ctx.schedule.flex_earliest.as_deref(),
        ctx.schedule.flex_latest.as_deref(),
    ) {
        0
    } else {
        time_rules::late_minutes(actual_min, start_min, ctx.schedule.grace_minutes)
    };
    let is_late = minutes_late >= ctx.schedule.late_threshold_minutes && minutes_late > 0;

    let clock_in_location = geofence_gate(ctx.position, ctx.remote_work, &ctx.locations)?;

    Ok(AttendanceRecord {
        id: 0, // assigned on insert
        employee_id: ctx.employee_id,
        date: ctx.now.date(),
        clock_in_time: ctx.now,
        clock_out_time: None,
        status: AttendanceStatus::ClockedIn,
        schedule_start: ctx.schedule.start,
        schedule_end: ctx.schedule.end,
        minutes_late,
        minutes_early: 0,
        is_late,
        is_excused_late: false,
        is_early_leave: false,
        is_approved_early_leave: false,
        breaks: Vec::new(),
        total_break_minutes: 0,
        unpaid_break_minutes: 0,
        clock_in_location,
        clock_out_location: None,
        duration_hours: None,
        penalties: Vec::new(),
        requires_approval: is_late && minutes_late >= APPROVAL_THRESHOLD_MINUTES,
        created_at: Utc::now(),
    })
}

/// Finalizes the record for a clock-out event. Uses the schedule end carried
/// on the record since clock-in rather than re-resolving it.
pub fn build_clock_out(
    record: &AttendanceRecord,
    ctx: ClockOutContext,
) -> DomainResult<AttendanceRecord> {
    if record.status != AttendanceStatus::ClockedIn {
        return Err(DomainError::StateConflict("Already clocked out today".into()));
    }

    let end_min = time_rules::parse_hhmm(&record.schedule_end)
        .ok_or_else(|| DomainError::Validation("Invalid schedule end time".into()))?;
    let actual_min = time_rules::time_minutes(ctx.now.time());

    let minutes_early = time_rules::early_minutes(actual_min, end_min, ctx.grace_minutes);
    let is_early_leave = minutes_early >= ctx.early_threshold_minutes && minutes_early > 0;

    let clock_out_location = geofence_gate(ctx.position, ctx.remote_work, &ctx.locations)?;

    let mut updated = record.clone();
    updated.clock_out_time = Some(ctx.now);
    updated.status = AttendanceStatus::ClockedOut;
    updated.minutes_early = minutes_early;
    updated.is_early_leave = is_early_leave;
    updated.clock_out_location = clock_out_location;
    updated.duration_hours = Some(time_rules::worked_hours(
        record.clock_in_time,
        ctx.now,
        record.total_break_minutes,
    ));
    updated.requires_approval = record.requires_approval
        || (is_early_leave && minutes_early >= APPROVAL_THRESHOLD_MINUTES);

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn default_schedule() -> DaySchedule {
        DaySchedule {
            start: "09:00".into(),
            end: "18:00".into(),
            grace_minutes: 5,
            late_threshold_minutes: 15,
            early_threshold_minutes: 15,
            flex_earliest: None,
            flex_latest: None,
            standard_hours: 8.0,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn clock_in_ctx(now: NaiveDateTime) -> ClockInContext {
        ClockInContext {
            employee_id: 1001,
            now,
            has_open_record_today: false,
            on_approved_leave: false,
            schedule: default_schedule(),
            position: None,
            remote_work: false,
            locations: Vec::new(),
        }
    }

    #[test]
    fn on_time_clock_in_is_clean() {
        let record = build_clock_in(clock_in_ctx(at(8, 58))).unwrap();
        assert_eq!(record.status, AttendanceStatus::ClockedIn);
        assert_eq!(record.minutes_late, 0);
        assert!(!record.is_late);
        assert!(!record.requires_approval);
    }

    #[test]
    fn twenty_past_with_five_grace_flags_late() {
        let record = build_clock_in(clock_in_ctx(at(9, 20))).unwrap();
        assert_eq!(record.minutes_late, 15);
        assert!(record.is_late);
        // 15 < 30: no approval needed yet.
        assert!(!record.requires_approval);
    }

    #[test]
    fn ten_past_stays_below_the_threshold() {
        let record = build_clock_in(clock_in_ctx(at(9, 10))).unwrap();
        assert_eq!(record.minutes_late, 5);
        assert!(!record.is_late);
    }

    #[test]
    fn forty_minutes_late_requires_approval() {
        let record = build_clock_in(clock_in_ctx(at(9, 45))).unwrap();
        assert_eq!(record.minutes_late, 40);
        assert!(record.is_late);
        assert!(record.requires_approval);
    }

    #[test]
    fn flex_window_suppresses_lateness_entirely() {
        let mut ctx = clock_in_ctx(at(9, 45));
        ctx.schedule.flex_earliest = Some("08:00".into());
        ctx.schedule.flex_latest = Some("10:00".into());

        let record = build_clock_in(ctx).unwrap();
        assert_eq!(record.minutes_late, 0);
        assert!(!record.is_late);
    }

    #[test]
    fn open_record_blocks_second_clock_in() {
        let mut ctx = clock_in_ctx(at(9, 0));
        ctx.has_open_record_today = true;

        let err = build_clock_in(ctx).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn approved_leave_blocks_clock_in() {
        let mut ctx = clock_in_ctx(at(9, 0));
        ctx.on_approved_leave = true;

        let err = build_clock_in(ctx).unwrap_err();
        assert!(matches!(err, DomainError::Boundary(_)));
    }

    #[test]
    fn reported_position_with_no_sites_is_a_distinct_failure() {
        let mut ctx = clock_in_ctx(at(9, 0));
        ctx.position = Some((13.7563, 100.5018));

        let err = build_clock_in(ctx).unwrap_err();
        assert!(matches!(err, DomainError::Boundary(ref m) if m.contains("No active work locations")));
    }

    #[test]
    fn remote_work_bypasses_the_geofence_gate() {
        let mut ctx = clock_in_ctx(at(9, 0));
        ctx.position = Some((13.7563, 100.5018));
        ctx.remote_work = true;

        let record = build_clock_in(ctx).unwrap();
        let snapshot = record.clock_in_location.unwrap();
        assert!(!snapshot.within_geofence);
        assert!(snapshot.location_id.is_none());
    }

    #[test]
    fn clock_out_computes_duration_net_of_breaks() {
        let record = build_clock_in(clock_in_ctx(at(9, 0))).unwrap();
        let mut record = record;
        record.total_break_minutes = 60;

        let out = build_clock_out(
            &record,
            ClockOutContext {
                now: at(18, 0),
                position: None,
                remote_work: false,
                locations: Vec::new(),
                grace_minutes: 5,
                early_threshold_minutes: 15,
            },
        )
        .unwrap();

        assert_eq!(out.status, AttendanceStatus::ClockedOut);
        assert_eq!(out.duration_hours, Some(8.0));
        assert_eq!(out.minutes_early, 0);
        assert!(!out.is_early_leave);
    }

    #[test]
    fn leaving_an_hour_early_flags_and_requires_approval() {
        let record = build_clock_in(clock_in_ctx(at(9, 0))).unwrap();

        let out = build_clock_out(
            &record,
            ClockOutContext {
                now: at(17, 0),
                position: None,
                remote_work: false,
                locations: Vec::new(),
                grace_minutes: 5,
                early_threshold_minutes: 15,
            },
        )
        .unwrap();

        assert_eq!(out.minutes_early, 55);
        assert!(out.is_early_leave);
        assert!(out.requires_approval);
    }

    #[test]
    fn double_clock_out_is_rejected() {
        let record = build_clock_in(clock_in_ctx(at(9, 0))).unwrap();
        let ctx = ClockOutContext {
            now: at(18, 0),
            position: None,
            remote_work: false,
            locations: Vec::new(),
            grace_minutes: 5,
            early_threshold_minutes: 15,
        };

        let closed = build_clock_out(&record, ctx.clone()).unwrap();
        let err = build_clock_out(&closed, ctx).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }
}
