use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{DomainError, DomainResult};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BreakRecord, LocationSnapshot,
};
use crate::model::penalty::AttendancePenalty;
use crate::repo::decode_err;

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    date: NaiveDate,
    clock_in_time: NaiveDateTime,
    clock_out_time: Option<NaiveDateTime>,
    status: String,
    schedule_start: String,
    schedule_end: String,
    minutes_late: i64,
    minutes_early: i64,
    is_late: bool,
    is_excused_late: bool,
    is_early_leave: bool,
    is_approved_early_leave: bool,
    breaks_json: String,
    total_break_minutes: i64,
    unpaid_break_minutes: i64,
    clock_in_location_json: Option<String>,
    clock_out_location_json: Option<String>,
    duration_hours: Option<f64>,
    penalties_json: String,
    requires_approval: bool,
    created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, employee_id, date, clock_in_time, clock_out_time, status, \
     schedule_start, schedule_end, minutes_late, minutes_early, is_late, is_excused_late, \
     is_early_leave, is_approved_early_leave, breaks_json, total_break_minutes, \
     unpaid_break_minutes, clock_in_location_json, clock_out_location_json, duration_hours, \
     penalties_json, requires_approval, created_at";

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = DomainError;

    fn try_from(row: AttendanceRow) -> DomainResult<Self> {
        let status: AttendanceStatus = row.status.parse().map_err(decode_err)?;
        let breaks: Vec<BreakRecord> =
            serde_json::from_str(&row.breaks_json).map_err(decode_err)?;
        let penalties: Vec<AttendancePenalty> =
            serde_json::from_str(&row.penalties_json).map_err(decode_err)?;

        let parse_snapshot = |json: Option<String>| -> DomainResult<Option<LocationSnapshot>> {
            json.map(|j| serde_json::from_str(&j).map_err(decode_err))
                .transpose()
        };

        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            clock_in_time: row.clock_in_time,
            clock_out_time: row.clock_out_time,
            status,
            schedule_start: row.schedule_start,
            schedule_end: row.schedule_end,
            minutes_late: row.minutes_late,
            minutes_early: row.minutes_early,
            is_late: row.is_late,
            is_excused_late: row.is_excused_late,
            is_early_leave: row.is_early_leave,
            is_approved_early_leave: row.is_approved_early_leave,
            breaks,
            total_break_minutes: row.total_break_minutes,
            unpaid_break_minutes: row.unpaid_break_minutes,
            clock_in_location: parse_snapshot(row.clock_in_location_json)?,
            clock_out_location: parse_snapshot(row.clock_out_location_json)?,
            duration_hours: row.duration_hours,
            penalties,
            requires_approval: row.requires_approval,
            created_at: row.created_at,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> DomainResult<String> {
    serde_json::to_string(value).map_err(decode_err)
}

/// The day's record for an employee, open or closed.
pub async fn find_for_day(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> DomainResult<Option<AttendanceRecord>> {
    let sql = format!(
        "SELECT {} FROM attendance_records WHERE employee_id = ? AND date = ?",
        COLUMNS
    );

    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;

    row.map(AttendanceRecord::try_from).transpose()
}

pub async fn insert(pool: &MySqlPool, record: &AttendanceRecord) -> DomainResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance_records
            (employee_id, date, clock_in_time, status, schedule_start, schedule_end,
             minutes_late, minutes_early, is_late, is_excused_late, is_early_leave,
             is_approved_early_leave, breaks_json, total_break_minutes, unpaid_break_minutes,
             clock_in_location_json, penalties_json, duration_hours, requires_approval,
             created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.employee_id)
    .bind(record.date)
    .bind(record.clock_in_time)
    .bind(record.status.to_string())
    .bind(&record.schedule_start)
    .bind(&record.schedule_end)
    .bind(record.minutes_late)
    .bind(record.minutes_early)
    .bind(record.is_late)
    .bind(record.is_excused_late)
    .bind(record.is_early_leave)
    .bind(record.is_approved_early_leave)
    .bind(to_json(&record.breaks)?)
    .bind(record.total_break_minutes)
    .bind(record.unpaid_break_minutes)
    .bind(
        record
            .clock_in_location
            .as_ref()
            .map(to_json)
            .transpose()?,
    )
    .bind(to_json(&record.penalties)?)
    .bind(record.duration_hours)
    .bind(record.requires_approval)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

/// Finalizes the record. Guarded on the open status; zero rows affected
/// means a concurrent clock-out got there first.
pub async fn finalize_clock_out(
    pool: &MySqlPool,
    record: &AttendanceRecord,
) -> DomainResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE attendance_records
        SET clock_out_time = ?, status = ?, minutes_early = ?, is_early_leave = ?,
            clock_out_location_json = ?, duration_hours = ?, requires_approval = ?
        WHERE id = ? AND status = 'clocked_in'
        "#,
    )
    .bind(record.clock_out_time)
    .bind(record.status.to_string())
    .bind(record.minutes_early)
    .bind(record.is_early_leave)
    .bind(
        record
            .clock_out_location
            .as_ref()
            .map(to_json)
            .transpose()?,
    )
    .bind(record.duration_hours)
    .bind(record.requires_approval)
    .bind(record.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::StateConflict("Already clocked out today".into()));
    }

    Ok(())
}

/// Writes the break list and totals back, guarded on the open status.
pub async fn save_breaks(pool: &MySqlPool, record: &AttendanceRecord) -> DomainResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE attendance_records
        SET breaks_json = ?, total_break_minutes = ?, unpaid_break_minutes = ?
        WHERE id = ? AND status = 'clocked_in'
        "#,
    )
    .bind(to_json(&record.breaks)?)
    .bind(record.total_break_minutes)
    .bind(record.unpaid_break_minutes)
    .bind(record.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::StateConflict(
            "Attendance record is no longer open".into(),
        ));
    }

    Ok(())
}

/// Penalty attachment after clock-out; not guarded, the record is closed.
pub async fn save_penalties(
    pool: &MySqlPool,
    record_id: u64,
    penalties: &[AttendancePenalty],
) -> DomainResult<()> {
    sqlx::query("UPDATE attendance_records SET penalties_json = ? WHERE id = ?")
        .bind(to_json(&penalties)?)
        .bind(record_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// All records for an employee inside a date range, oldest first.
pub async fn list_range(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> DomainResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "SELECT {} FROM attendance_records \
         WHERE employee_id = ? AND date BETWEEN ? AND ? ORDER BY date",
        COLUMNS
    );

    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(AttendanceRecord::try_from).collect()
}

/// Paginated listing with optional employee/date filters.
pub async fn list_paginated(
    pool: &MySqlPool,
    employee_id: Option<u64>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    page: u32,
    per_page: u32,
) -> DomainResult<(Vec<AttendanceRecord>, i64)> {
    let mut where_sql = String::from(" WHERE 1=1");
    if employee_id.is_some() {
        where_sql.push_str(" AND employee_id = ?");
    }
    if from.is_some() {
        where_sql.push_str(" AND date >= ?");
    }
    if to.is_some() {
        where_sql.push_str(" AND date <= ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance_records{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(id) = employee_id {
        count_q = count_q.bind(id);
    }
    if let Some(d) = from {
        count_q = count_q.bind(d);
    }
    if let Some(d) = to {
        count_q = count_q.bind(d);
    }
    let total = count_q.fetch_one(pool).await?;

    let offset = (page - 1) * per_page;
    let data_sql = format!(
        "SELECT {} FROM attendance_records{} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRow>(&data_sql);
    if let Some(id) = employee_id {
        data_q = data_q.bind(id);
    }
    if let Some(d) = from {
        data_q = data_q.bind(d);
    }
    if let Some(d) = to {
        data_q = data_q.bind(d);
    }

    let rows = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let records = rows
        .into_iter()
        .map(AttendanceRecord::try_from)
        .collect::<DomainResult<Vec<_>>>()?;

    Ok((records, total))
}
