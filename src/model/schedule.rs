use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Work schedule applicable to one employee on one day, after resolution.
///
/// Resolution priority: active shift assignment for the day, then a
/// work-schedule policy matching the employee's department / job title /
/// employment type, then the configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DaySchedule {
    #[schema(example = "09:00")]
    pub start: String,

    #[schema(example = "18:00")]
    pub end: String,

    /// Minutes of tolerance before lateness starts accruing.
    #[schema(example = 5)]
    pub grace_minutes: i64,

    /// Accrued late minutes required before the record is flagged late.
    #[schema(example = 15)]
    pub late_threshold_minutes: i64,

    #[schema(example = 15)]
    pub early_threshold_minutes: i64,

    /// Optional flexible-arrival band; arrival inside it is never late.
    #[schema(example = "08:00")]
    pub flex_earliest: Option<String>,

    #[schema(example = "10:00")]
    pub flex_latest: Option<String>,

    #[schema(example = 8.0)]
    pub standard_hours: f64,
}

impl DaySchedule {
    /// Thresholds below the grace period are legal configuration but make
    /// the violation fire the moment grace ends. Warn, don't reject.
    pub fn warn_if_inconsistent(&self, context: &str) {
        if self.late_threshold_minutes < self.grace_minutes {
            tracing::warn!(
                context,
                grace = self.grace_minutes,
                threshold = self.late_threshold_minutes,
                "Late threshold is below the grace period"
            );
        }
        if self.early_threshold_minutes < self.grace_minutes {
            tracing::warn!(
                context,
                grace = self.grace_minutes,
                threshold = self.early_threshold_minutes,
                "Early-leave threshold is below the grace period"
            );
        }
    }
}
