use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};

use crate::core::payroll::working_days_between;
use crate::error::DomainResult;

/// Approved leave overlapping [start, end]?
pub async fn has_overlapping_leave(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> DomainResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM leave_requests
        WHERE employee_id = ?
        AND status = 'approved'
        AND start_date <= ?
        AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(end)
    .bind(start)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[derive(FromRow)]
struct LeaveSpan {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// Working days inside [start, end] covered by approved leave. Overlapping
/// requests are clipped to the range before counting.
pub async fn on_leave_working_days(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> DomainResult<u32> {
    let spans = sqlx::query_as::<_, LeaveSpan>(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE employee_id = ?
        AND status = 'approved'
        AND start_date <= ?
        AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await?;

    Ok(spans
        .iter()
        .map(|span| working_days_between(span.start_date.max(start), span.end_date.min(end)))
        .sum())
}
