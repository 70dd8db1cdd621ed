use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::penalty::AttendancePenalty;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    ClockedIn,
    ClockedOut,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BreakType {
    Lunch,
    Rest,
    Prayer,
    Other,
}

impl BreakType {
    /// Lunch is unpaid with a 60-minute allowance; everything else is a
    /// short paid break.
    pub fn default_scheduled_minutes(&self) -> i64 {
        match self {
            BreakType::Lunch => 60,
            _ => 15,
        }
    }

    pub fn default_paid(&self) -> bool {
        !matches!(self, BreakType::Lunch)
    }
}

/// Rest period embedded in an attendance record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BreakRecord {
    #[schema(example = "c3a9f3a0-5c4e-4a2e-9d6b-1f2e3d4c5b6a")]
    pub id: String,

    pub break_type: BreakType,

    #[schema(value_type = String, format = "date-time")]
    pub start_time: NaiveDateTime,

    /// None while the break is still running.
    #[schema(value_type = Option<String>, format = "date-time")]
    pub end_time: Option<NaiveDateTime>,

    /// Whole minutes between start and end, None while open.
    pub duration_minutes: Option<i64>,

    pub scheduled_minutes: i64,

    pub is_paid: bool,
}

impl BreakRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Where a clock event was reported from, tagged with the geofence verdict.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationSnapshot {
    #[schema(example = 13.7563)]
    pub latitude: f64,

    #[schema(example = 100.5018)]
    pub longitude: f64,

    pub location_id: Option<u64>,

    #[schema(example = "Head Office")]
    pub location_name: Option<String>,

    /// Distance to the nearest configured site in meters.
    pub distance_m: Option<f64>,

    pub within_geofence: bool,
}

/// One attendance record per employee per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-08-06", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = String, format = "date-time")]
    pub clock_in_time: NaiveDateTime,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_out_time: Option<NaiveDateTime>,

    pub status: AttendanceStatus,

    /// Schedule values resolved at clock-in, carried for clock-out.
    #[schema(example = "09:00")]
    pub schedule_start: String,

    #[schema(example = "18:00")]
    pub schedule_end: String,

    pub minutes_late: i64,
    pub minutes_early: i64,

    pub is_late: bool,
    pub is_excused_late: bool,
    pub is_early_leave: bool,
    pub is_approved_early_leave: bool,

    pub breaks: Vec<BreakRecord>,
    pub total_break_minutes: i64,
    pub unpaid_break_minutes: i64,

    pub clock_in_location: Option<LocationSnapshot>,
    pub clock_out_location: Option<LocationSnapshot>,

    /// Hours between clock-in and clock-out net of break time, 2 dp.
    pub duration_hours: Option<f64>,

    pub penalties: Vec<AttendancePenalty>,

    pub requires_approval: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn open_break(&self) -> Option<&BreakRecord> {
        self.breaks.iter().find(|b| b.is_open())
    }
}

/// Aggregates for one employee over a date range, consumed by payroll.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AttendanceStats {
    #[schema(example = 20)]
    pub actual_work_days: u32,

    #[schema(example = 1)]
    pub absent_days: u32,

    #[schema(example = 2)]
    pub late_days: u32,

    #[schema(example = 1)]
    pub on_leave_days: u32,

    #[schema(example = 4.5)]
    pub overtime_hours: f64,
}
