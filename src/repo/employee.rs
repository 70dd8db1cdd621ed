use sqlx::{FromRow, MySqlPool};

use crate::error::DomainResult;
use crate::model::employee::EmployeeProfile;

#[derive(FromRow)]
struct ProfileRow {
    id: u64,
    department_id: u64,
    job_title_id: u64,
    employment_type: String,
    base_salary: f64,
}

/// Org and compensation context from the employee directory.
pub async fn fetch_profile(
    pool: &MySqlPool,
    employee_id: u64,
) -> DomainResult<Option<EmployeeProfile>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, department_id, job_title_id, employment_type, base_salary \
         FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| EmployeeProfile {
        id: r.id,
        department_id: r.department_id,
        job_title_id: r.job_title_id,
        employment_type: r.employment_type,
        base_salary: r.base_salary,
    }))
}
