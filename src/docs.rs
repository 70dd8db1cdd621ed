use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, ClockInRequest, ClockOutRequest, ClockOutResponse,
    EndBreakRequest, StartBreakRequest, StatsQuery,
};
use crate::api::payroll::{
    CreatePayroll, PaginatedPayrollResponse, PayrollQuery, ProcessPayment, SummaryQuery,
    UpdatePayroll,
};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, BreakRecord, BreakType,
    LocationSnapshot,
};
use crate::model::payroll::{
    Allowances, Deductions, PayrollBreakdown, PayrollInput, PayrollRecord, PayrollStatus,
    PayrollSummary,
};
use crate::model::penalty::{AttendancePenalty, CalculationMode, ViolationType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workforce Attendance & Payroll API",
        version = "1.0.0",
        description = r#"
## Workforce Attendance & Payroll Service

Turns raw clock events into validated attendance records and monthly payroll.

### Key Features
- **Attendance Tracking**
  - Clock-in/clock-out with geofence validation and late/early-leave rules
  - Break tracking with paid/unpaid totals
- **Penalty Policies**
  - Configurable policies applied automatically after clock-out
- **Payroll Management**
  - Period statistics, allowances, progressive withholding tax,
    social security, provident fund, and net pay
  - Draft → approved → paid lifecycle

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::start_break,
        crate::api::attendance::end_break,
        crate::api::attendance::attendance_stats,
        crate::api::attendance::attendance_list,

        crate::api::payroll::calculate_payroll,
        crate::api::payroll::create_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::update_payroll,
        crate::api::payroll::approve_payroll,
        crate::api::payroll::process_payment,
        crate::api::payroll::payroll_summary
    ),
    components(
        schemas(
            ClockInRequest,
            ClockOutRequest,
            ClockOutResponse,
            StartBreakRequest,
            EndBreakRequest,
            StatsQuery,
            AttendanceQuery,
            AttendanceListResponse,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceStats,
            BreakRecord,
            BreakType,
            LocationSnapshot,
            AttendancePenalty,
            ViolationType,
            CalculationMode,
            CreatePayroll,
            UpdatePayroll,
            ProcessPayment,
            PayrollQuery,
            PaginatedPayrollResponse,
            SummaryQuery,
            PayrollInput,
            PayrollBreakdown,
            PayrollRecord,
            PayrollStatus,
            PayrollSummary,
            Allowances,
            Deductions
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
    )
)]
pub struct ApiDoc;
