use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStats;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayrollStatus {
    Draft,
    Pending,
    Approved,
    Paid,
    Cancelled,
}

/// Fixed allowance categories; absent values count as zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct Allowances {
    #[serde(default)]
    #[schema(example = 1000.0)]
    pub transportation: f64,

    #[serde(default)]
    #[schema(example = 2000.0)]
    pub housing: f64,

    #[serde(default)]
    #[schema(example = 500.0)]
    pub meal: f64,

    #[serde(default)]
    #[schema(example = 1500.0)]
    pub position: f64,

    #[serde(default)]
    pub other: f64,
}

impl Allowances {
    pub fn total(&self) -> f64 {
        self.transportation + self.housing + self.meal + self.position + self.other
    }
}

/// Deduction categories on a computed payroll.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct Deductions {
    #[schema(example = 250.0)]
    pub tax: f64,

    #[schema(example = 750.0)]
    pub social_security: f64,

    pub provident_fund: f64,

    #[serde(default)]
    pub loan: f64,

    #[serde(default)]
    pub advance: f64,

    pub late_penalty: f64,

    pub absence_penalty: f64,

    #[serde(default)]
    pub other: f64,
}

impl Deductions {
    pub fn total(&self) -> f64 {
        self.tax
            + self.social_security
            + self.provident_fund
            + self.loan
            + self.advance
            + self.late_penalty
            + self.absence_penalty
            + self.other
    }
}

/// Everything the payroll calculation needs; plain data, no I/O.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollInput {
    #[schema(example = 30000.0)]
    pub base_salary: f64,

    #[schema(example = 8)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[serde(default)]
    pub stats: AttendanceStats,

    #[serde(default)]
    pub allowances: Allowances,

    #[serde(default)]
    #[schema(example = 0.0)]
    pub bonus: f64,

    /// Overtime multiplier over the hourly rate, e.g. 1.5.
    #[schema(example = 1.5)]
    pub overtime_rate: Option<f64>,

    /// Flat withholding-tax rate. None selects the progressive schedule.
    pub tax_rate: Option<f64>,

    /// Explicit social-security rate. None selects 5% capped at the ceiling.
    pub social_security_rate: Option<f64>,

    /// Provident-fund rate. None contributes nothing.
    pub provident_fund_rate: Option<f64>,

    #[serde(default)]
    pub loan_deduction: f64,

    #[serde(default)]
    pub advance_deduction: f64,

    #[serde(default)]
    pub other_deduction: f64,
}

/// Result of the pure payroll calculation, all money rounded to 2 dp.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollBreakdown {
    #[schema(example = 21)]
    pub working_days: u32,

    #[schema(example = 1428.57)]
    pub daily_rate: f64,

    #[schema(example = 178.57)]
    pub hourly_rate: f64,

    pub overtime_pay: f64,

    pub total_allowances: f64,

    #[schema(example = 30000.0)]
    pub gross_income: f64,

    pub deductions: Deductions,

    pub total_deductions: f64,

    /// May be negative when deductions exceed gross income; not clamped.
    #[schema(example = 29000.0)]
    pub net_pay: f64,
}

/// Persisted payroll record, one per employee per (month, year).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 8)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    pub base_salary: f64,

    pub stats: AttendanceStats,

    pub allowances: Allowances,

    pub bonus: f64,

    pub overtime_pay: f64,

    pub gross_income: f64,

    pub deductions: Deductions,

    pub total_deductions: f64,

    pub net_pay: f64,

    pub status: PayrollStatus,

    #[schema(example = "bank_transfer")]
    pub payment_method: Option<String>,

    pub paid_by: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub paid_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Company-wide rollup for one pay period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollSummary {
    #[schema(example = 8)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 42)]
    pub employee_count: i64,

    pub total_gross: f64,
    pub total_deductions: f64,
    pub total_net: f64,

    pub draft_count: i64,
    pub pending_count: i64,
    pub approved_count: i64,
    pub paid_count: i64,
    pub cancelled_count: i64,
}
