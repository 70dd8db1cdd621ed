use sqlx::{FromRow, MySqlPool};

use crate::error::DomainResult;
use crate::model::penalty::{CalculationMode, PenaltyPolicy, ViolationType};
use crate::repo::decode_err;

#[derive(FromRow)]
struct PolicyRow {
    id: u64,
    name: String,
    violation_type: String,
    threshold_minutes: Option<i64>,
    calculation_mode: String,
    amount: Option<f64>,
    percent: Option<f64>,
    department_id: Option<u64>,
    job_title_id: Option<u64>,
    employment_type: Option<String>,
    auto_apply: bool,
    is_active: bool,
}

/// Active penalty policies; the engine filters by scope and threshold.
pub async fn fetch_active(pool: &MySqlPool) -> DomainResult<Vec<PenaltyPolicy>> {
    let rows = sqlx::query_as::<_, PolicyRow>(
        r#"
        SELECT id, name, violation_type, threshold_minutes, calculation_mode,
               amount, percent, department_id, job_title_id, employment_type,
               auto_apply, is_active
        FROM penalty_policies
        WHERE is_active = TRUE
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let violation_type: ViolationType =
                row.violation_type.parse().map_err(decode_err)?;
            let calculation_mode: CalculationMode =
                row.calculation_mode.parse().map_err(decode_err)?;

            Ok(PenaltyPolicy {
                id: row.id,
                name: row.name,
                violation_type,
                threshold_minutes: row.threshold_minutes,
                calculation_mode,
                amount: row.amount,
                percent: row.percent,
                department_id: row.department_id,
                job_title_id: row.job_title_id,
                employment_type: row.employment_type,
                auto_apply: row.auto_apply,
                is_active: row.is_active,
            })
        })
        .collect()
}
