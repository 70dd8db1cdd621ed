use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationType {
    Late,
    EarlyLeave,
    NoClockOut,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CalculationMode {
    FixedAmount,
    RatePerMinute,
    PercentOfSalary,
}

/// Penalty configuration, owned by HR admins and consumed read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PenaltyPolicy {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Late arrival deduction")]
    pub name: String,

    pub violation_type: ViolationType,

    /// Minimum violation minutes before the policy fires. None applies always.
    #[schema(example = 15)]
    pub threshold_minutes: Option<i64>,

    pub calculation_mode: CalculationMode,

    /// Fixed amount or per-minute rate depending on the mode.
    #[schema(example = 100.0)]
    pub amount: Option<f64>,

    /// Percentage of base salary for the percent mode.
    #[schema(example = 1.5)]
    pub percent: Option<f64>,

    // Scope filters; None matches every employee.
    pub department_id: Option<u64>,
    pub job_title_id: Option<u64>,
    pub employment_type: Option<String>,

    pub auto_apply: bool,
    pub is_active: bool,
}

/// Monetary penalty attached to an attendance record after clock-out.
/// Immutable once attached; removal is an administrative action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendancePenalty {
    #[schema(example = "7d1f0b2e-4a3c-4e5f-8a9b-0c1d2e3f4a5b")]
    pub id: String,

    #[schema(example = 1)]
    pub policy_id: u64,

    pub violation_type: ViolationType,

    #[schema(example = 100.0)]
    pub amount: f64,

    #[schema(example = "Late arrival deduction: 20 minutes late")]
    pub description: String,
}
