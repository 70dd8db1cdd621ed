use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::core;
use crate::error::{DomainError, DomainResult};
use crate::model::payroll::{
    Allowances, PayrollBreakdown, PayrollInput, PayrollRecord, PayrollStatus, PayrollSummary,
};
use crate::repo;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 8)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[serde(default)]
    #[schema(example = 0.0)]
    pub bonus: f64,

    #[serde(default)]
    pub allowances: Allowances,

    #[schema(example = 1.5)]
    pub overtime_rate: Option<f64>,

    pub tax_rate: Option<f64>,

    pub social_security_rate: Option<f64>,

    pub provident_fund_rate: Option<f64>,

    #[serde(default)]
    pub loan_deduction: f64,

    #[serde(default)]
    pub advance_deduction: f64,

    #[serde(default)]
    pub other_deduction: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    #[schema(example = 32000.0)]
    pub base_salary: Option<f64>,

    #[schema(example = 1000.0)]
    pub bonus: Option<f64>,

    pub allowances: Option<Allowances>,

    pub overtime_rate: Option<f64>,

    pub tax_rate: Option<f64>,

    pub social_security_rate: Option<f64>,

    pub provident_fund_rate: Option<f64>,

    pub loan_deduction: Option<f64>,

    pub advance_deduction: Option<f64>,

    pub other_deduction: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct ProcessPayment {
    #[schema(example = "bank_transfer")]
    pub payment_method: String,

    #[schema(example = "hr.admin")]
    pub paid_by: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<PayrollRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[schema(example = 8)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,
}

fn validate_month(month: u32) -> DomainResult<()> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::Validation(
            "month must be between 1 and 12".into(),
        ));
    }
    Ok(())
}

fn month_bounds(year: i32, month: u32) -> DomainResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::Validation("Invalid month/year".into()))?;

    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| DomainError::Validation("Invalid month/year".into()))?;

    let last = next_first
        .pred_opt()
        .ok_or_else(|| DomainError::Validation("Invalid month/year".into()))?;

    Ok((first, last))
}

/// Preview a payroll calculation without persisting anything
#[utoipa::path(
    post,
    path = "/api/v1/payroll/calculate",
    request_body = PayrollInput,
    responses(
        (status = 200, description = "Calculated breakdown", body = PayrollBreakdown),
        (status = 400, description = "Invalid input")
    ),
    tag = "Payroll"
)]
pub async fn calculate_payroll(
    config: web::Data<Config>,
    payload: web::Json<PayrollInput>,
) -> Result<HttpResponse, DomainError> {
    validate_month(payload.month)?;
    if payload.base_salary < 0.0 {
        return Err(DomainError::Validation(
            "base_salary must be non-negative".into(),
        ));
    }

    let breakdown = core::payroll::calculate(&payload, &config.payroll_rules());
    Ok(HttpResponse::Ok().json(breakdown))
}

/// Create a draft payroll record for one employee and period
#[utoipa::path(
    post,
    path = "/api/v1/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = PayrollRecord),
        (status = 400, description = "Payroll already exists for this period", body = Object, example = json!({
            "message": "Payroll record already exists for this period"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll"
)]
#[instrument(
    name = "payroll_create",
    skip(pool, config, payload),
    fields(employee_id = payload.employee_id, month = payload.month, year = payload.year)
)]
pub async fn create_payroll(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreatePayroll>,
) -> Result<HttpResponse, DomainError> {
    validate_month(payload.month)?;

    let profile = repo::employee::fetch_profile(pool.get_ref(), payload.employee_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Employee".into()))?;

    let exists = repo::payroll::exists_for_period(
        pool.get_ref(),
        profile.id,
        payload.month,
        payload.year,
    )
    .await?;
    if exists {
        return Err(DomainError::StateConflict(
            "Payroll record already exists for this period".into(),
        ));
    }

    let (first, last) = month_bounds(payload.year, payload.month)?;

    let (records, on_leave_days) = futures::try_join!(
        repo::attendance::list_range(pool.get_ref(), profile.id, first, last),
        repo::leave::on_leave_working_days(pool.get_ref(), profile.id, first, last)
    )?;

    let stats = core::payroll::build_stats(
        &records,
        on_leave_days,
        first,
        last,
        config.standard_hours_per_day,
    );

    let input = PayrollInput {
        base_salary: profile.base_salary,
        month: payload.month,
        year: payload.year,
        stats: stats.clone(),
        allowances: payload.allowances,
        bonus: payload.bonus,
        overtime_rate: payload.overtime_rate,
        tax_rate: payload.tax_rate,
        social_security_rate: payload.social_security_rate,
        provident_fund_rate: payload.provident_fund_rate,
        loan_deduction: payload.loan_deduction,
        advance_deduction: payload.advance_deduction,
        other_deduction: payload.other_deduction,
    };

    let breakdown = core::payroll::calculate(&input, &config.payroll_rules());

    let mut record = PayrollRecord {
        id: 0,
        employee_id: profile.id,
        month: payload.month,
        year: payload.year,
        base_salary: profile.base_salary,
        stats,
        allowances: payload.allowances,
        bonus: payload.bonus,
        overtime_pay: breakdown.overtime_pay,
        gross_income: breakdown.gross_income,
        deductions: breakdown.deductions,
        total_deductions: breakdown.total_deductions,
        net_pay: breakdown.net_pay,
        status: PayrollStatus::Draft,
        payment_method: None,
        paid_by: None,
        paid_at: None,
        created_at: Utc::now(),
    };

    record.id = repo::payroll::insert(pool.get_ref(), &record).await?;

    info!(payroll_id = record.id, net_pay = record.net_pay, "Payroll created");

    Ok(HttpResponse::Created().json(record))
}

/// Fetch one payroll record
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, body = PayrollRecord),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, DomainError> {
    let payroll_id = path.into_inner();

    let record = repo::payroll::fetch(pool.get_ref(), payroll_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Payroll record".into()))?;

    Ok(HttpResponse::Ok().json(record))
}

/// Paginated payroll list
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let (data, total) =
        repo::payroll::list_paginated(pool.get_ref(), query.employee_id, page, per_page).await?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Edit a draft payroll record; money fields are re-derived
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}",
    request_body = UpdatePayroll,
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll updated", body = PayrollRecord),
        (status = 400, description = "Only draft payroll records can be edited"),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn update_payroll(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayroll>,
) -> Result<HttpResponse, DomainError> {
    let payroll_id = path.into_inner();

    let mut record = repo::payroll::fetch(pool.get_ref(), payroll_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Payroll record".into()))?;

    if record.status != PayrollStatus::Draft {
        return Err(DomainError::StateConflict(
            "Only draft payroll records can be edited".into(),
        ));
    }

    let input = PayrollInput {
        base_salary: body.base_salary.unwrap_or(record.base_salary),
        month: record.month,
        year: record.year,
        stats: record.stats.clone(),
        allowances: body.allowances.unwrap_or(record.allowances),
        bonus: body.bonus.unwrap_or(record.bonus),
        overtime_rate: body.overtime_rate,
        tax_rate: body.tax_rate,
        social_security_rate: body.social_security_rate,
        provident_fund_rate: body.provident_fund_rate,
        loan_deduction: body.loan_deduction.unwrap_or(record.deductions.loan),
        advance_deduction: body.advance_deduction.unwrap_or(record.deductions.advance),
        other_deduction: body.other_deduction.unwrap_or(record.deductions.other),
    };

    let breakdown = core::payroll::calculate(&input, &config.payroll_rules());

    record.base_salary = input.base_salary;
    record.allowances = input.allowances;
    record.bonus = input.bonus;
    record.overtime_pay = breakdown.overtime_pay;
    record.gross_income = breakdown.gross_income;
    record.deductions = breakdown.deductions;
    record.total_deductions = breakdown.total_deductions;
    record.net_pay = breakdown.net_pay;

    repo::payroll::update_draft(pool.get_ref(), &record).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Approve a draft or pending payroll record
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}/approve",
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll approved", body = Object, example = json!({
            "message": "Payroll approved"
        })),
        (status = 400, description = "Not in an approvable status"),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn approve_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, DomainError> {
    let payroll_id = path.into_inner();

    repo::payroll::fetch(pool.get_ref(), payroll_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Payroll record".into()))?;

    repo::payroll::approve(pool.get_ref(), payroll_id).await?;

    info!(payroll_id, "Payroll approved");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Payroll approved"
    })))
}

/// Record payment of an approved payroll
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}/pay",
    request_body = ProcessPayment,
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payment recorded", body = Object, example = json!({
            "message": "Payment recorded"
        })),
        (status = 400, description = "Payroll must be approved before payment"),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn process_payment(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ProcessPayment>,
) -> Result<HttpResponse, DomainError> {
    let payroll_id = path.into_inner();

    if payload.payment_method.trim().is_empty() || payload.paid_by.trim().is_empty() {
        return Err(DomainError::Validation(
            "payment_method and paid_by are required".into(),
        ));
    }

    repo::payroll::fetch(pool.get_ref(), payroll_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Payroll record".into()))?;

    repo::payroll::mark_paid(
        pool.get_ref(),
        payroll_id,
        &payload.payment_method,
        &payload.paid_by,
        Utc::now(),
    )
    .await?;

    info!(payroll_id, paid_by = %payload.paid_by, "Payroll payment recorded");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Payment recorded"
    })))
}

/// Company-wide payroll rollup for one period
#[utoipa::path(
    get,
    path = "/api/v1/payroll/summary",
    params(SummaryQuery),
    responses(
        (status = 200, body = PayrollSummary),
        (status = 400, description = "Invalid month")
    ),
    tag = "Payroll"
)]
pub async fn payroll_summary(
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, DomainError> {
    validate_month(query.month)?;

    let summary = repo::payroll::summary(pool.get_ref(), query.month, query.year).await?;

    Ok(HttpResponse::Ok().json(summary))
}
