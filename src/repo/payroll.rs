use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{DomainError, DomainResult};
use crate::model::attendance::AttendanceStats;
use crate::model::payroll::{
    Allowances, Deductions, PayrollRecord, PayrollStatus, PayrollSummary,
};
use crate::repo::decode_err;

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: u64,
    month: u32,
    year: i32,
    base_salary: f64,
    actual_work_days: u32,
    absent_days: u32,
    late_days: u32,
    on_leave_days: u32,
    overtime_hours: f64,
    allowances_json: String,
    bonus: f64,
    overtime_pay: f64,
    gross_income: f64,
    deductions_json: String,
    total_deductions: f64,
    net_pay: f64,
    status: String,
    payment_method: Option<String>,
    paid_by: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, employee_id, month, year, base_salary, actual_work_days, \
     absent_days, late_days, on_leave_days, overtime_hours, allowances_json, bonus, \
     overtime_pay, gross_income, deductions_json, total_deductions, net_pay, status, \
     payment_method, paid_by, paid_at, created_at";

impl TryFrom<PayrollRow> for PayrollRecord {
    type Error = DomainError;

    fn try_from(row: PayrollRow) -> DomainResult<Self> {
        let status: PayrollStatus = row.status.parse().map_err(decode_err)?;
        let allowances: Allowances =
            serde_json::from_str(&row.allowances_json).map_err(decode_err)?;
        let deductions: Deductions =
            serde_json::from_str(&row.deductions_json).map_err(decode_err)?;

        Ok(PayrollRecord {
            id: row.id,
            employee_id: row.employee_id,
            month: row.month,
            year: row.year,
            base_salary: row.base_salary,
            stats: AttendanceStats {
                actual_work_days: row.actual_work_days,
                absent_days: row.absent_days,
                late_days: row.late_days,
                on_leave_days: row.on_leave_days,
                overtime_hours: row.overtime_hours,
            },
            allowances,
            bonus: row.bonus,
            overtime_pay: row.overtime_pay,
            gross_income: row.gross_income,
            deductions,
            total_deductions: row.total_deductions,
            net_pay: row.net_pay,
            status,
            payment_method: row.payment_method,
            paid_by: row.paid_by,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}

pub async fn exists_for_period(
    pool: &MySqlPool,
    employee_id: u64,
    month: u32,
    year: i32,
) -> DomainResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM payroll_records WHERE employee_id = ? AND month = ? AND year = ?",
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

pub async fn insert(pool: &MySqlPool, record: &PayrollRecord) -> DomainResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO payroll_records
            (employee_id, month, year, base_salary, actual_work_days, absent_days,
             late_days, on_leave_days, overtime_hours, allowances_json, bonus,
             overtime_pay, gross_income, deductions_json, total_deductions, net_pay,
             status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.employee_id)
    .bind(record.month)
    .bind(record.year)
    .bind(record.base_salary)
    .bind(record.stats.actual_work_days)
    .bind(record.stats.absent_days)
    .bind(record.stats.late_days)
    .bind(record.stats.on_leave_days)
    .bind(record.stats.overtime_hours)
    .bind(serde_json::to_string(&record.allowances).map_err(decode_err)?)
    .bind(record.bonus)
    .bind(record.overtime_pay)
    .bind(record.gross_income)
    .bind(serde_json::to_string(&record.deductions).map_err(decode_err)?)
    .bind(record.total_deductions)
    .bind(record.net_pay)
    .bind(record.status.to_string())
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

pub async fn fetch(pool: &MySqlPool, id: u64) -> DomainResult<Option<PayrollRecord>> {
    let sql = format!("SELECT {} FROM payroll_records WHERE id = ?", COLUMNS);

    let row = sqlx::query_as::<_, PayrollRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(PayrollRecord::try_from).transpose()
}

pub async fn list_paginated(
    pool: &MySqlPool,
    employee_id: Option<u64>,
    page: u32,
    per_page: u32,
) -> DomainResult<(Vec<PayrollRecord>, i64)> {
    let mut where_sql = String::from(" WHERE 1=1");
    if employee_id.is_some() {
        where_sql.push_str(" AND employee_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM payroll_records{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(id) = employee_id {
        count_q = count_q.bind(id);
    }
    let total = count_q.fetch_one(pool).await?;

    let offset = (page - 1) * per_page;
    let data_sql = format!(
        "SELECT {} FROM payroll_records{} ORDER BY year DESC, month DESC, id DESC LIMIT ? OFFSET ?",
        COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, PayrollRow>(&data_sql);
    if let Some(id) = employee_id {
        data_q = data_q.bind(id);
    }

    let rows = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let records = rows
        .into_iter()
        .map(PayrollRecord::try_from)
        .collect::<DomainResult<Vec<_>>>()?;

    Ok((records, total))
}

/// Draft-only edit; the recomputed money fields are written together so the
/// gross/net identity always holds on disk.
pub async fn update_draft(pool: &MySqlPool, record: &PayrollRecord) -> DomainResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE payroll_records
        SET base_salary = ?, allowances_json = ?, bonus = ?, overtime_pay = ?,
            gross_income = ?, deductions_json = ?, total_deductions = ?, net_pay = ?
        WHERE id = ? AND status = 'draft'
        "#,
    )
    .bind(record.base_salary)
    .bind(serde_json::to_string(&record.allowances).map_err(decode_err)?)
    .bind(record.bonus)
    .bind(record.overtime_pay)
    .bind(record.gross_income)
    .bind(serde_json::to_string(&record.deductions).map_err(decode_err)?)
    .bind(record.total_deductions)
    .bind(record.net_pay)
    .bind(record.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::StateConflict(
            "Only draft payroll records can be edited".into(),
        ));
    }

    Ok(())
}

pub async fn approve(pool: &MySqlPool, id: u64) -> DomainResult<()> {
    let result = sqlx::query(
        "UPDATE payroll_records SET status = 'approved' \
         WHERE id = ? AND status IN ('draft', 'pending')",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::StateConflict(
            "Payroll record is not in an approvable status".into(),
        ));
    }

    Ok(())
}

pub async fn mark_paid(
    pool: &MySqlPool,
    id: u64,
    payment_method: &str,
    paid_by: &str,
    paid_at: DateTime<Utc>,
) -> DomainResult<()> {
    let result = sqlx::query(
        "UPDATE payroll_records \
         SET status = 'paid', payment_method = ?, paid_by = ?, paid_at = ? \
         WHERE id = ? AND status = 'approved'",
    )
    .bind(payment_method)
    .bind(paid_by)
    .bind(paid_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::StateConflict(
            "Payroll record must be approved before payment".into(),
        ));
    }

    Ok(())
}

#[derive(FromRow)]
struct SummaryRow {
    employee_count: i64,
    total_gross: Option<f64>,
    total_deductions: Option<f64>,
    total_net: Option<f64>,
    draft_count: i64,
    pending_count: i64,
    approved_count: i64,
    paid_count: i64,
    cancelled_count: i64,
}

pub async fn summary(pool: &MySqlPool, month: u32, year: i32) -> DomainResult<PayrollSummary> {
    let row = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT
            COUNT(*) AS employee_count,
            SUM(gross_income) AS total_gross,
            SUM(total_deductions) AS total_deductions,
            SUM(net_pay) AS total_net,
            COUNT(CASE WHEN status = 'draft' THEN 1 END) AS draft_count,
            COUNT(CASE WHEN status = 'pending' THEN 1 END) AS pending_count,
            COUNT(CASE WHEN status = 'approved' THEN 1 END) AS approved_count,
            COUNT(CASE WHEN status = 'paid' THEN 1 END) AS paid_count,
            COUNT(CASE WHEN status = 'cancelled' THEN 1 END) AS cancelled_count
        FROM payroll_records
        WHERE month = ? AND year = ?
        "#,
    )
    .bind(month)
    .bind(year)
    .fetch_one(pool)
    .await?;

    Ok(PayrollSummary {
        month,
        year,
        employee_count: row.employee_count,
        total_gross: row.total_gross.unwrap_or(0.0),
        total_deductions: row.total_deductions.unwrap_or(0.0),
        total_net: row.total_net.unwrap_or(0.0),
        draft_count: row.draft_count,
        pending_count: row.pending_count,
        approved_count: row.approved_count,
        paid_count: row.paid_count,
        cancelled_count: row.cancelled_count,
    })
}
