use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::core;
use crate::core::attendance::{ClockInContext, ClockOutContext};
use crate::error::{DomainError, DomainResult};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, BreakType,
};
use crate::model::penalty::AttendancePenalty;
use crate::repo;
use crate::utils::location_cache;

#[derive(Deserialize, ToSchema)]
pub struct ClockInRequest {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 13.7563)]
    pub latitude: Option<f64>,

    #[schema(example = 100.5018)]
    pub longitude: Option<f64>,

    /// Skips the geofence gate; the position is still recorded.
    #[serde(default)]
    pub remote_work: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockOutRequest {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 13.7563)]
    pub latitude: Option<f64>,

    #[schema(example = 100.5018)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub remote_work: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct StartBreakRequest {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "lunch")]
    pub break_type: BreakType,
}

#[derive(Deserialize, ToSchema)]
pub struct EndBreakRequest {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "c3a9f3a0-5c4e-4a2e-9d6b-1f2e3d4c5b6a")]
    pub break_id: String,
}

/// Clock-out result: the finalized record plus the best-effort penalty
/// outcome, so callers can tell a clean success from one with a deferred
/// penalty failure.
#[derive(Serialize, ToSchema)]
pub struct ClockOutResponse {
    pub record: AttendanceRecord,

    pub penalties_applied: Vec<AttendancePenalty>,

    #[schema(example = json!(null))]
    pub penalty_error: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct StatsQuery {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[param(example = "2026-08-01", value_type = String, format = "date")]
    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[param(example = "2026-08-31", value_type = String, format = "date")]
    #[schema(example = "2026-08-31", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,

    #[param(example = "2026-08-01", value_type = String, format = "date")]
    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub from: Option<NaiveDate>,

    #[param(example = "2026-08-31", value_type = String, format = "date")]
    #[schema(example = "2026-08-31", value_type = String, format = "date")]
    pub to: Option<NaiveDate>,

    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn reported_position(latitude: Option<f64>, longitude: Option<f64>) -> DomainResult<Option<(f64, f64)>> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Some((lat, lon))),
        (None, None) => Ok(None),
        _ => Err(DomainError::Validation(
            "latitude and longitude must be provided together".into(),
        )),
    }
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockInRequest,
    responses(
        (status = 200, description = "Clocked in successfully", body = AttendanceRecord),
        (status = 400, description = "Already clocked in, on leave, or outside the geofence", body = Object, example = json!({
            "message": "Already clocked in today"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_clock_in",
    skip(pool, config, payload),
    fields(employee_id = payload.employee_id)
)]
pub async fn clock_in(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockInRequest>,
) -> Result<HttpResponse, DomainError> {
    let position = reported_position(payload.latitude, payload.longitude)?;

    let profile = repo::employee::fetch_profile(pool.get_ref(), payload.employee_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Employee".into()))?;

    let now = Local::now().naive_local();
    let today = now.date();

    let existing = repo::attendance::find_for_day(pool.get_ref(), profile.id, today).await?;
    if let Some(record) = &existing {
        if record.status == AttendanceStatus::ClockedOut {
            return Err(DomainError::StateConflict(
                "Attendance already completed for today".into(),
            ));
        }
    }

    let on_approved_leave =
        repo::leave::has_overlapping_leave(pool.get_ref(), profile.id, today, today).await?;

    let schedule = repo::schedule::resolve(pool.get_ref(), &profile, today, &config).await?;

    let locations = if position.is_some() {
        location_cache::active_locations(pool.get_ref()).await?
    } else {
        Vec::new()
    };

    let mut record = core::attendance::build_clock_in(ClockInContext {
        employee_id: profile.id,
        now,
        has_open_record_today: existing.is_some(),
        on_approved_leave,
        schedule,
        position,
        remote_work: payload.remote_work,
        locations,
    })?;

    record.id = repo::attendance::insert(pool.get_ref(), &record).await?;

    info!(
        record_id = record.id,
        minutes_late = record.minutes_late,
        is_late = record.is_late,
        "Clocked in"
    );

    Ok(HttpResponse::Ok().json(record))
}

/// Clock-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockOutRequest,
    responses(
        (status = 200, description = "Clocked out successfully", body = ClockOutResponse),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_clock_out",
    skip(pool, config, payload),
    fields(employee_id = payload.employee_id)
)]
pub async fn clock_out(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockOutRequest>,
) -> Result<HttpResponse, DomainError> {
    let position = reported_position(payload.latitude, payload.longitude)?;

    let profile = repo::employee::fetch_profile(pool.get_ref(), payload.employee_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Employee".into()))?;

    let now = Local::now().naive_local();
    let today = now.date();

    let record = repo::attendance::find_for_day(pool.get_ref(), profile.id, today)
        .await?
        .ok_or_else(|| {
            DomainError::StateConflict("No active check-in found for today".into())
        })?;

    // Grace and threshold come from today's schedule; the scheduled end
    // time itself was carried on the record at clock-in.
    let schedule = repo::schedule::resolve(pool.get_ref(), &profile, today, &config).await?;

    let locations = if position.is_some() {
        location_cache::active_locations(pool.get_ref()).await?
    } else {
        Vec::new()
    };

    let mut updated = core::attendance::build_clock_out(
        &record,
        ClockOutContext {
            now,
            position,
            remote_work: payload.remote_work,
            locations,
            grace_minutes: schedule.grace_minutes,
            early_threshold_minutes: schedule.early_threshold_minutes,
        },
    )?;

    repo::attendance::finalize_clock_out(pool.get_ref(), &updated).await?;

    // Penalty evaluation is best-effort: a failure here is reported back
    // but never rolls back the clock-out.
    let mut penalties_applied = Vec::new();
    let mut penalty_error = None;

    match repo::policy::fetch_active(pool.get_ref()).await {
        Ok(policies) => {
            let computed = core::penalty::evaluate(&updated, &profile, &policies);
            if !computed.is_empty() {
                let mut all = updated.penalties.clone();
                all.extend(computed.iter().cloned());

                match repo::attendance::save_penalties(pool.get_ref(), updated.id, &all).await {
                    Ok(()) => {
                        updated.penalties = all;
                        penalties_applied = computed;
                    }
                    Err(e) => {
                        warn!(error = %e, record_id = updated.id, "Failed to save penalties after clock-out");
                        penalty_error = Some("Penalty calculation failed".to_string());
                    }
                }
            }
        }
        Err(e) => {
            warn!(error = %e, record_id = updated.id, "Failed to load penalty policies after clock-out");
            penalty_error = Some("Penalty calculation failed".to_string());
        }
    }

    info!(
        record_id = updated.id,
        minutes_early = updated.minutes_early,
        penalties = penalties_applied.len(),
        "Clocked out"
    );

    Ok(HttpResponse::Ok().json(ClockOutResponse {
        record: updated,
        penalties_applied,
        penalty_error,
    }))
}

/// Start a break on today's open attendance record
#[utoipa::path(
    post,
    path = "/api/v1/attendance/break/start",
    request_body = StartBreakRequest,
    responses(
        (status = 200, description = "Break started", body = AttendanceRecord),
        (status = 400, description = "No open record or a break is already running", body = Object, example = json!({
            "message": "A break is already in progress"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn start_break(
    pool: web::Data<MySqlPool>,
    payload: web::Json<StartBreakRequest>,
) -> Result<HttpResponse, DomainError> {
    let now = Local::now().naive_local();

    let mut record = repo::attendance::find_for_day(
        pool.get_ref(),
        payload.employee_id,
        now.date(),
    )
    .await?
    .ok_or_else(|| DomainError::StateConflict("No active check-in found for today".into()))?;

    core::breaks::start_break(&mut record, payload.break_type, now)?;
    repo::attendance::save_breaks(pool.get_ref(), &record).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// End a running break
#[utoipa::path(
    put,
    path = "/api/v1/attendance/break/end",
    request_body = EndBreakRequest,
    responses(
        (status = 200, description = "Break ended", body = AttendanceRecord),
        (status = 400, description = "Break already ended or no open record", body = Object, example = json!({
            "message": "Break is already ended"
        })),
        (status = 404, description = "Break not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn end_break(
    pool: web::Data<MySqlPool>,
    payload: web::Json<EndBreakRequest>,
) -> Result<HttpResponse, DomainError> {
    let now = Local::now().naive_local();

    let mut record = repo::attendance::find_for_day(
        pool.get_ref(),
        payload.employee_id,
        now.date(),
    )
    .await?
    .ok_or_else(|| DomainError::StateConflict("No active check-in found for today".into()))?;

    core::breaks::end_break(&mut record, &payload.break_id, now)?;
    repo::attendance::save_breaks(pool.get_ref(), &record).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Attendance statistics over a date range
#[utoipa::path(
    get,
    path = "/api/v1/attendance/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Aggregated attendance statistics", body = AttendanceStats),
        (status = 400, description = "Invalid date range"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_stats(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, DomainError> {
    if query.start_date > query.end_date {
        return Err(DomainError::Validation(
            "start_date cannot be after end_date".into(),
        ));
    }

    let (records, on_leave_days) = futures::try_join!(
        repo::attendance::list_range(
            pool.get_ref(),
            query.employee_id,
            query.start_date,
            query.end_date
        ),
        repo::leave::on_leave_working_days(
            pool.get_ref(),
            query.employee_id,
            query.start_date,
            query.end_date
        )
    )?;

    let stats = core::payroll::build_stats(
        &records,
        on_leave_days,
        query.start_date,
        query.end_date,
        config.standard_hours_per_day,
    );

    Ok(HttpResponse::Ok().json(stats))
}

/// Paginated attendance record list
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let (data, total) = repo::attendance::list_paginated(
        pool.get_ref(),
        query.employee_id,
        query.from,
        query.to,
        page,
        per_page,
    )
    .await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
