use chrono::{Datelike, NaiveDate, Weekday};

use crate::core::time_rules::{overtime_hours, round2};
use crate::model::attendance::{AttendanceRecord, AttendanceStats};
use crate::model::payroll::{Deductions, PayrollBreakdown, PayrollInput};

/// Annual progressive withholding brackets: upper bound, marginal rate.
/// Applied to annualized income after the exemption.
const TAX_BRACKETS: [(f64, f64); 8] = [
    (150_000.0, 0.00),
    (300_000.0, 0.05),
    (500_000.0, 0.10),
    (750_000.0, 0.15),
    (1_000_000.0, 0.20),
    (2_000_000.0, 0.25),
    (5_000_000.0, 0.30),
    (f64::INFINITY, 0.35),
];

/// Statutory and company-wide knobs, filled from `Config`.
#[derive(Debug, Clone)]
pub struct PayrollRules {
    pub hours_per_day: f64,
    pub default_overtime_rate: f64,
    pub late_penalty_per_day: f64,
    pub social_security_rate: f64,
    pub social_security_cap: f64,
    pub tax_exemption: f64,
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self {
            hours_per_day: 8.0,
            default_overtime_rate: 1.5,
            late_penalty_per_day: 100.0,
            social_security_rate: 0.05,
            social_security_cap: 750.0,
            tax_exemption: 150_000.0,
        }
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Non-weekend calendar days in the month.
pub fn working_days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };

    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| !is_weekend(d.weekday()))
        .count() as u32
}

/// Non-weekend days in [start, end], inclusive.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !is_weekend(d.weekday()))
        .count() as u32
}

/// Marginal tax over the annualized taxable amount.
pub fn progressive_tax(annual_taxable: f64) -> f64 {
    let taxable = annual_taxable.max(0.0);
    let mut tax = 0.0;
    let mut lower = 0.0;

    for (upper, rate) in TAX_BRACKETS {
        if taxable <= lower {
            break;
        }
        tax += (taxable.min(upper) - lower) * rate;
        lower = upper;
    }

    tax
}

/// Computes one pay period. Pure: validation happened upstream, repository
/// reads happened before the call.
pub fn calculate(input: &PayrollInput, rules: &PayrollRules) -> PayrollBreakdown {
    let working_days = working_days_in_month(input.year, input.month).max(1);

    let daily_rate = input.base_salary / working_days as f64;
    let hourly_rate = daily_rate / rules.hours_per_day;

    let overtime_rate = input.overtime_rate.unwrap_or(rules.default_overtime_rate);
    let overtime_pay = round2(input.stats.overtime_hours * hourly_rate * overtime_rate);

    let total_allowances = round2(input.allowances.total());
    let gross_income =
        round2(input.base_salary + overtime_pay + input.bonus + total_allowances);

    let absence_penalty = round2(input.stats.absent_days as f64 * daily_rate);
    let late_penalty = round2(input.stats.late_days as f64 * rules.late_penalty_per_day);

    let social_security = match input.social_security_rate {
        Some(rate) => round2(gross_income * rate),
        None => round2((gross_income * rules.social_security_rate).min(rules.social_security_cap)),
    };

    let tax = match input.tax_rate {
        Some(rate) => round2(gross_income * rate),
        None => {
            let annual_taxable = gross_income * 12.0 - rules.tax_exemption;
            round2(progressive_tax(annual_taxable) / 12.0)
        }
    };

    let provident_fund = input
        .provident_fund_rate
        .map(|rate| round2(gross_income * rate))
        .unwrap_or(0.0);

    let deductions = Deductions {
        tax,
        social_security,
        provident_fund,
        loan: round2(input.loan_deduction),
        advance: round2(input.advance_deduction),
        late_penalty,
        absence_penalty,
        other: round2(input.other_deduction),
    };

    let total_deductions = round2(deductions.total());
    let net_pay = round2(gross_income - total_deductions);

    if net_pay < 0.0 {
        tracing::warn!(
            gross_income,
            total_deductions,
            net_pay,
            "Deductions exceed gross income; net pay is negative"
        );
    }

    PayrollBreakdown {
        working_days,
        daily_rate: round2(daily_rate),
        hourly_rate: round2(hourly_rate),
        overtime_pay,
        total_allowances,
        gross_income,
        deductions,
        total_deductions,
        net_pay,
    }
}

/// Folds a period's attendance records into the stats payroll consumes.
/// Absence is derived: working days not covered by attendance or leave.
pub fn build_stats(
    records: &[AttendanceRecord],
    on_leave_days: u32,
    start: NaiveDate,
    end: NaiveDate,
    standard_hours: f64,
) -> AttendanceStats {
    let actual_work_days = records.len() as u32;

    let late_days = records
        .iter()
        .filter(|r| r.is_late && !r.is_excused_late)
        .count() as u32;

    let total_overtime = records
        .iter()
        .filter_map(|r| r.duration_hours)
        .map(|worked| overtime_hours(worked, standard_hours))
        .sum::<f64>();

    let period_working_days = working_days_between(start, end);
    let absent_days = period_working_days.saturating_sub(actual_work_days + on_leave_days);

    AttendanceStats {
        actual_work_days,
        absent_days,
        late_days,
        on_leave_days,
        overtime_hours: round2(total_overtime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll::Allowances;

    fn base_input(base_salary: f64) -> PayrollInput {
        PayrollInput {
            base_salary,
            // June 2026 has 22 working days.
            month: 6,
            year: 2026,
            stats: AttendanceStats::default(),
            allowances: Allowances::default(),
            bonus: 0.0,
            overtime_rate: None,
            tax_rate: None,
            social_security_rate: None,
            provident_fund_rate: None,
            loan_deduction: 0.0,
            advance_deduction: 0.0,
            other_deduction: 0.0,
        }
    }

    #[test]
    fn working_day_counts() {
        assert_eq!(working_days_in_month(2026, 6), 22);
        // August 2026 starts on a Saturday: 10 weekend days out of 31.
        assert_eq!(working_days_in_month(2026, 8), 21);
        assert_eq!(working_days_in_month(2026, 2), 20);
        assert_eq!(working_days_in_month(2026, 13), 0);
    }

    #[test]
    fn working_days_between_is_inclusive() {
        let mon = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let fri = NaiveDate::from_ymd_opt(2026, 6, 5).unwrap();
        let sun = NaiveDate::from_ymd_opt(2026, 6, 7).unwrap();

        assert_eq!(working_days_between(mon, fri), 5);
        assert_eq!(working_days_between(mon, sun), 5);
        assert_eq!(working_days_between(fri, mon), 0);
    }

    #[test]
    fn progressive_tax_per_bracket_boundary() {
        assert_eq!(progressive_tax(0.0), 0.0);
        assert_eq!(progressive_tax(150_000.0), 0.0);
        assert_eq!(progressive_tax(210_000.0), 3_000.0);
        assert_eq!(progressive_tax(300_000.0), 7_500.0);
        assert_eq!(progressive_tax(500_000.0), 27_500.0);
        assert_eq!(progressive_tax(750_000.0), 65_000.0);
        assert_eq!(progressive_tax(1_000_000.0), 115_000.0);
        assert_eq!(progressive_tax(2_000_000.0), 365_000.0);
        assert_eq!(progressive_tax(5_000_000.0), 1_265_000.0);
        assert_eq!(progressive_tax(6_000_000.0), 1_615_000.0);
        // Negative taxable collapses to zero.
        assert_eq!(progressive_tax(-50_000.0), 0.0);
    }

    #[test]
    fn thirty_thousand_salary_worked_example() {
        let breakdown = calculate(&base_input(30_000.0), &PayrollRules::default());

        assert_eq!(breakdown.working_days, 22);
        assert_eq!(breakdown.daily_rate, 1363.64);
        assert_eq!(breakdown.gross_income, 30_000.0);
        // min(30000 * 0.05, 750) hits the cap.
        assert_eq!(breakdown.deductions.social_security, 750.0);
        // (30000*12 - 150000) = 210000 -> 3000 annual -> 250 monthly.
        assert_eq!(breakdown.deductions.tax, 250.0);
        assert_eq!(breakdown.total_deductions, 1_000.0);
        assert_eq!(breakdown.net_pay, 29_000.0);
    }

    #[test]
    fn social_security_never_exceeds_the_cap_without_an_explicit_rate() {
        for salary in [10_000.0, 30_000.0, 100_000.0, 1_000_000.0] {
            let breakdown = calculate(&base_input(salary), &PayrollRules::default());
            assert!(breakdown.deductions.social_security <= 750.0);
        }

        // Below the cap the plain 5% applies.
        let breakdown = calculate(&base_input(10_000.0), &PayrollRules::default());
        assert_eq!(breakdown.deductions.social_security, 500.0);
    }

    #[test]
    fn explicit_rates_override_the_defaults() {
        let mut input = base_input(30_000.0);
        input.social_security_rate = Some(0.03);
        input.tax_rate = Some(0.10);
        input.provident_fund_rate = Some(0.05);

        let breakdown = calculate(&input, &PayrollRules::default());
        assert_eq!(breakdown.deductions.social_security, 900.0);
        assert_eq!(breakdown.deductions.tax, 3_000.0);
        assert_eq!(breakdown.deductions.provident_fund, 1_500.0);
    }

    #[test]
    fn overtime_and_allowances_feed_gross() {
        let mut input = base_input(30_000.0);
        input.stats.overtime_hours = 2.0;
        input.overtime_rate = Some(1.5);
        input.bonus = 1_000.0;
        input.allowances = Allowances {
            transportation: 500.0,
            housing: 1_000.0,
            meal: 300.0,
            position: 0.0,
            other: 0.0,
        };

        let breakdown = calculate(&input, &PayrollRules::default());

        // hourly = 30000/22/8 = 170.4545..; 2h * 1.5x = 511.36
        assert_eq!(breakdown.overtime_pay, 511.36);
        assert_eq!(breakdown.total_allowances, 1_800.0);
        assert_eq!(breakdown.gross_income, 33_311.36);
        // Identity: gross = base + overtime + bonus + allowances.
        assert_eq!(
            breakdown.gross_income,
            round2(30_000.0 + breakdown.overtime_pay + 1_000.0 + breakdown.total_allowances)
        );
        // Identity: net = gross - total deductions.
        assert_eq!(
            breakdown.net_pay,
            round2(breakdown.gross_income - breakdown.total_deductions)
        );
    }

    #[test]
    fn absence_and_lateness_penalties() {
        let mut input = base_input(30_000.0);
        input.stats.absent_days = 2;
        input.stats.late_days = 3;

        let breakdown = calculate(&input, &PayrollRules::default());
        // 2 * 30000/22 = 2727.27
        assert_eq!(breakdown.deductions.absence_penalty, 2_727.27);
        assert_eq!(breakdown.deductions.late_penalty, 300.0);
    }

    #[test]
    fn net_pay_goes_negative_when_deductions_exceed_gross() {
        let mut input = base_input(1_000.0);
        input.loan_deduction = 5_000.0;

        let breakdown = calculate(&input, &PayrollRules::default());
        assert!(breakdown.net_pay < 0.0);
        assert_eq!(
            breakdown.net_pay,
            round2(breakdown.gross_income - breakdown.total_deductions)
        );
    }

    #[test]
    fn stats_fold_counts_late_and_absent_days() {
        use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
        use chrono::NaiveDate;

        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let make = |late: bool, excused: bool, hours: f64| AttendanceRecord {
            id: 0,
            employee_id: 1001,
            date,
            clock_in_time: date.and_hms_opt(9, 0, 0).unwrap(),
            clock_out_time: Some(date.and_hms_opt(18, 0, 0).unwrap()),
            status: AttendanceStatus::ClockedOut,
            schedule_start: "09:00".into(),
            schedule_end: "18:00".into(),
            minutes_late: if late { 20 } else { 0 },
            minutes_early: 0,
            is_late: late,
            is_excused_late: excused,
            is_early_leave: false,
            is_approved_early_leave: false,
            breaks: Vec::new(),
            total_break_minutes: 0,
            unpaid_break_minutes: 0,
            clock_in_location: None,
            clock_out_location: None,
            duration_hours: Some(hours),
            penalties: Vec::new(),
            requires_approval: false,
            created_at: chrono::Utc::now(),
        };

        let records = vec![
            make(false, false, 8.0),
            make(true, false, 9.5),
            make(true, true, 8.0),
        ];

        // Mon Jun 1 .. Fri Jun 5: 5 working days.
        let stats = build_stats(
            &records,
            1,
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 5).unwrap(),
            8.0,
        );

        assert_eq!(stats.actual_work_days, 3);
        // Excused lateness does not count.
        assert_eq!(stats.late_days, 1);
        assert_eq!(stats.on_leave_days, 1);
        // 5 working days - 3 worked - 1 on leave.
        assert_eq!(stats.absent_days, 1);
        assert_eq!(stats.overtime_hours, 1.5);
    }
}
