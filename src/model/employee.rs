use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Compensation and org context resolved from the employee directory.
/// Inputs to penalty scope matching and payroll calculation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeProfile {
    #[schema(example = 1001)]
    pub id: u64,

    #[schema(example = 10)]
    pub department_id: u64,

    #[schema(example = 3)]
    pub job_title_id: u64,

    #[schema(example = "full_time")]
    pub employment_type: String,

    #[schema(example = 30000.0)]
    pub base_salary: f64,
}
