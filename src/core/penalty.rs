use uuid::Uuid;

use crate::core::time_rules::round2;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::EmployeeProfile;
use crate::model::penalty::{AttendancePenalty, CalculationMode, PenaltyPolicy, ViolationType};

/// Violations present on a finalized record, with the accrued minutes.
fn violations(record: &AttendanceRecord) -> Vec<(ViolationType, i64)> {
    let mut found = Vec::new();

    if record.is_late && !record.is_excused_late {
        found.push((ViolationType::Late, record.minutes_late));
    }

    if record.is_early_leave && !record.is_approved_early_leave {
        found.push((ViolationType::EarlyLeave, record.minutes_early));
    }

    // A record still open at evaluation time is a missed clock-out; the
    // stats/payroll sweep feeds past-day records through here.
    if record.status == AttendanceStatus::ClockedIn && record.clock_out_time.is_none() {
        found.push((ViolationType::NoClockOut, 0));
    }

    found
}

fn scope_matches(policy: &PenaltyPolicy, profile: &EmployeeProfile) -> bool {
    if policy.department_id.is_some_and(|d| d != profile.department_id) {
        return false;
    }
    if policy.job_title_id.is_some_and(|j| j != profile.job_title_id) {
        return false;
    }
    if policy
        .employment_type
        .as_deref()
        .is_some_and(|t| t != profile.employment_type)
    {
        return false;
    }
    true
}

fn amount_for(policy: &PenaltyPolicy, minutes: i64, base_salary: f64) -> f64 {
    let amount = match policy.calculation_mode {
        CalculationMode::FixedAmount => policy.amount.unwrap_or(0.0),
        CalculationMode::RatePerMinute => policy.amount.unwrap_or(0.0) * minutes as f64,
        CalculationMode::PercentOfSalary => base_salary * policy.percent.unwrap_or(0.0) / 100.0,
    };
    round2(amount)
}

fn describe(policy: &PenaltyPolicy, violation: ViolationType, minutes: i64) -> String {
    match violation {
        ViolationType::Late => format!("{}: {} minutes late", policy.name, minutes),
        ViolationType::EarlyLeave => format!("{}: left {} minutes early", policy.name, minutes),
        ViolationType::NoClockOut => format!("{}: missed clock-out", policy.name),
    }
}

/// Matches active auto-apply policies against the record's violations.
/// Every matching policy produces an independent penalty.
pub fn evaluate(
    record: &AttendanceRecord,
    profile: &EmployeeProfile,
    policies: &[PenaltyPolicy],
) -> Vec<AttendancePenalty> {
    let mut penalties = Vec::new();

    for (violation, minutes) in violations(record) {
        for policy in policies {
            if !policy.is_active || !policy.auto_apply {
                continue;
            }
            if policy.violation_type != violation {
                continue;
            }
            if !scope_matches(policy, profile) {
                continue;
            }
            if policy.threshold_minutes.is_some_and(|t| minutes < t) {
                continue;
            }

            penalties.push(AttendancePenalty {
                id: Uuid::new_v4().to_string(),
                policy_id: policy.id,
                violation_type: violation,
                amount: amount_for(policy, minutes, profile.base_salary),
                description: describe(policy, violation, minutes),
            });
        }
    }

    penalties
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile() -> EmployeeProfile {
        EmployeeProfile {
            id: 1001,
            department_id: 10,
            job_title_id: 3,
            employment_type: "full_time".into(),
            base_salary: 30_000.0,
        }
    }

    fn late_record(minutes_late: i64) -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        AttendanceRecord {
            id: 1,
            employee_id: 1001,
            date,
            clock_in_time: date.and_hms_opt(9, 30, 0).unwrap(),
            clock_out_time: Some(date.and_hms_opt(18, 0, 0).unwrap()),
            status: AttendanceStatus::ClockedOut,
            schedule_start: "09:00".into(),
            schedule_end: "18:00".into(),
            minutes_late,
            minutes_early: 0,
            is_late: minutes_late > 0,
            is_excused_late: false,
            is_early_leave: false,
            is_approved_early_leave: false,
            breaks: Vec::new(),
            total_break_minutes: 0,
            unpaid_break_minutes: 0,
            clock_in_location: None,
            clock_out_location: None,
            duration_hours: Some(8.5),
            penalties: Vec::new(),
            requires_approval: false,
            created_at: chrono::Utc::now(),
        }
    }

    fn late_policy(mode: CalculationMode) -> PenaltyPolicy {
        PenaltyPolicy {
            id: 1,
            name: "Late arrival deduction".into(),
            violation_type: ViolationType::Late,
            threshold_minutes: Some(15),
            calculation_mode: mode,
            amount: Some(100.0),
            percent: Some(1.0),
            department_id: None,
            job_title_id: None,
            employment_type: None,
            auto_apply: true,
            is_active: true,
        }
    }

    #[test]
    fn fixed_amount_penalty_applies_beyond_the_threshold() {
        let penalties = evaluate(
            &late_record(20),
            &profile(),
            &[late_policy(CalculationMode::FixedAmount)],
        );
        assert_eq!(penalties.len(), 1);
        assert_eq!(penalties[0].amount, 100.0);
        assert_eq!(penalties[0].violation_type, ViolationType::Late);
        assert!(penalties[0].description.contains("20 minutes late"));
    }

    #[test]
    fn rate_per_minute_multiplies_accrued_minutes() {
        let mut policy = late_policy(CalculationMode::RatePerMinute);
        policy.amount = Some(5.0);

        let penalties = evaluate(&late_record(20), &profile(), &[policy]);
        assert_eq!(penalties[0].amount, 100.0);
    }

    #[test]
    fn percent_of_salary_uses_the_employee_base() {
        let penalties = evaluate(
            &late_record(20),
            &profile(),
            &[late_policy(CalculationMode::PercentOfSalary)],
        );
        assert_eq!(penalties[0].amount, 300.0);
    }

    #[test]
    fn below_threshold_minutes_do_not_fire() {
        let penalties = evaluate(
            &late_record(10),
            &profile(),
            &[late_policy(CalculationMode::FixedAmount)],
        );
        assert!(penalties.is_empty());
    }

    #[test]
    fn excused_lateness_is_skipped() {
        let mut record = late_record(20);
        record.is_excused_late = true;

        let penalties = evaluate(
            &record,
            &profile(),
            &[late_policy(CalculationMode::FixedAmount)],
        );
        assert!(penalties.is_empty());
    }

    #[test]
    fn scope_filters_exclude_other_departments() {
        let mut policy = late_policy(CalculationMode::FixedAmount);
        policy.department_id = Some(99);

        let penalties = evaluate(&late_record(20), &profile(), &[policy]);
        assert!(penalties.is_empty());
    }

    #[test]
    fn inactive_or_manual_policies_never_fire() {
        let mut inactive = late_policy(CalculationMode::FixedAmount);
        inactive.is_active = false;
        let mut manual = late_policy(CalculationMode::FixedAmount);
        manual.auto_apply = false;

        let penalties = evaluate(&late_record(20), &profile(), &[inactive, manual]);
        assert!(penalties.is_empty());
    }

    #[test]
    fn matching_policies_accumulate_independently() {
        let fixed = late_policy(CalculationMode::FixedAmount);
        let mut percent = late_policy(CalculationMode::PercentOfSalary);
        percent.id = 2;

        let penalties = evaluate(&late_record(20), &profile(), &[fixed, percent]);
        assert_eq!(penalties.len(), 2);
    }

    #[test]
    fn missed_clock_out_fires_no_clock_out_policies() {
        let mut record = late_record(0);
        record.status = AttendanceStatus::ClockedIn;
        record.clock_out_time = None;

        let mut policy = late_policy(CalculationMode::FixedAmount);
        policy.violation_type = ViolationType::NoClockOut;
        policy.threshold_minutes = None;

        let penalties = evaluate(&record, &profile(), &[policy]);
        assert_eq!(penalties.len(), 1);
        assert_eq!(penalties[0].violation_type, ViolationType::NoClockOut);
    }
}
