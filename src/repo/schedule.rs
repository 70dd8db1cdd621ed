use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};

use crate::config::Config;
use crate::error::DomainResult;
use crate::model::employee::EmployeeProfile;
use crate::model::schedule::DaySchedule;

#[derive(FromRow)]
struct ScheduleRow {
    start_time: String,
    end_time: String,
    grace_minutes: i64,
    late_threshold_minutes: i64,
    early_threshold_minutes: i64,
    flex_earliest: Option<String>,
    flex_latest: Option<String>,
    standard_hours: f64,
}

impl From<ScheduleRow> for DaySchedule {
    fn from(row: ScheduleRow) -> Self {
        DaySchedule {
            start: row.start_time,
            end: row.end_time,
            grace_minutes: row.grace_minutes,
            late_threshold_minutes: row.late_threshold_minutes,
            early_threshold_minutes: row.early_threshold_minutes,
            flex_earliest: row.flex_earliest,
            flex_latest: row.flex_latest,
            standard_hours: row.standard_hours,
        }
    }
}

/// Resolves the schedule for one employee on one day.
///
/// Priority: active shift assignment for the day, then a work-schedule
/// policy matching the employee's org context, then the config defaults.
pub async fn resolve(
    pool: &MySqlPool,
    profile: &EmployeeProfile,
    date: NaiveDate,
    config: &Config,
) -> DomainResult<DaySchedule> {
    let shift = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT start_time, end_time, grace_minutes, late_threshold_minutes,
               early_threshold_minutes, flex_earliest, flex_latest, standard_hours
        FROM shift_assignments
        WHERE employee_id = ? AND work_date = ? AND is_active = TRUE
        "#,
    )
    .bind(profile.id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = shift {
        return Ok(row.into());
    }

    let policy = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT start_time, end_time, grace_minutes, late_threshold_minutes,
               early_threshold_minutes, flex_earliest, flex_latest, standard_hours
        FROM work_schedule_policies
        WHERE is_active = TRUE
        AND (department_id IS NULL OR department_id = ?)
        AND (job_title_id IS NULL OR job_title_id = ?)
        AND (employment_type IS NULL OR employment_type = ?)
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(profile.department_id)
    .bind(profile.job_title_id)
    .bind(&profile.employment_type)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = policy {
        return Ok(row.into());
    }

    Ok(config.default_schedule())
}
