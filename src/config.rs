use dotenvy::dotenv;
use std::env;

use crate::core::payroll::PayrollRules;
use crate::model::schedule::DaySchedule;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_clock_per_min: u32,
    pub rate_default_per_min: u32,

    // Fallback schedule when no shift or policy matches
    pub default_schedule_start: String,
    pub default_schedule_end: String,
    pub default_grace_minutes: i64,
    pub default_late_threshold: i64,
    pub default_early_threshold: i64,
    pub standard_hours_per_day: f64,

    // Payroll & statutory defaults
    pub default_overtime_rate: f64,
    pub late_penalty_per_day: f64,
    pub social_security_rate: f64,
    pub social_security_cap: f64,
    pub tax_exemption: f64,

    pub api_prefix: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            rate_clock_per_min: env_or("RATE_CLOCK_PER_MIN", "60").parse().unwrap(),
            rate_default_per_min: env_or("RATE_DEFAULT_PER_MIN", "1000").parse().unwrap(),

            default_schedule_start: env_or("DEFAULT_SCHEDULE_START", "09:00"),
            default_schedule_end: env_or("DEFAULT_SCHEDULE_END", "18:00"),
            default_grace_minutes: env_or("DEFAULT_GRACE_MINUTES", "5").parse().unwrap(),
            default_late_threshold: env_or("DEFAULT_LATE_THRESHOLD", "15").parse().unwrap(),
            default_early_threshold: env_or("DEFAULT_EARLY_THRESHOLD", "15").parse().unwrap(),
            standard_hours_per_day: env_or("STANDARD_HOURS_PER_DAY", "8").parse().unwrap(),

            default_overtime_rate: env_or("DEFAULT_OVERTIME_RATE", "1.5").parse().unwrap(),
            late_penalty_per_day: env_or("LATE_PENALTY_PER_DAY", "100").parse().unwrap(),
            social_security_rate: env_or("SOCIAL_SECURITY_RATE", "0.05").parse().unwrap(),
            social_security_cap: env_or("SOCIAL_SECURITY_CAP", "750").parse().unwrap(),
            tax_exemption: env_or("TAX_EXEMPTION", "150000").parse().unwrap(),

            api_prefix: env_or("API_PREFIX", "/api/v1"),
        }
    }

    /// Hard-coded fallback used when neither a shift assignment nor a
    /// work-schedule policy matches the employee.
    pub fn default_schedule(&self) -> DaySchedule {
        DaySchedule {
            start: self.default_schedule_start.clone(),
            end: self.default_schedule_end.clone(),
            grace_minutes: self.default_grace_minutes,
            late_threshold_minutes: self.default_late_threshold,
            early_threshold_minutes: self.default_early_threshold,
            flex_earliest: None,
            flex_latest: None,
            standard_hours: self.standard_hours_per_day,
        }
    }

    pub fn payroll_rules(&self) -> PayrollRules {
        PayrollRules {
            hours_per_day: self.standard_hours_per_day,
            default_overtime_rate: self.default_overtime_rate,
            late_penalty_per_day: self.late_penalty_per_day,
            social_security_rate: self.social_security_rate,
            social_security_cap: self.social_security_cap,
            tax_exemption: self.tax_exemption,
        }
    }
}
