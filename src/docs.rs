use crate::api::dashboard::DashboardResponse;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateStatus};
use crate::api::payroll::{CreatePayroll, PayrollListResponse, PayrollQuery};
use crate::api::report::{ReportListQuery, ReportListResponse};
use crate::api::settings::UpdateCompany;
use crate::api::user::RegisterUser;
use crate::model::company::{Company, Profile};
use crate::model::employee::{Department, Employee, EmployeeStatus};
use crate::model::payroll::{PaymentStatus, Payroll, PayrollWithEmployee};
use crate::model::report::{Report, ReportStatus, ReportType};
use crate::model::user::User;
use crate::report::ReportRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PayPulse API",
        version = "1.0.0",
        description = r#"
## PayPulse: Payroll & HR Administration

REST API for employee records, monthly payroll generation, payment-status
tracking and spreadsheet report export.

### Key Features
- **Employee Management**: create, search, update and remove employees
- **Payroll**: generate monthly payrolls with tax, health insurance and
  retirement withheld; mark them paid once the pay period arrives
- **Reports**: payroll detail, department summary, employee summary and
  tax summary spreadsheets over any date range

### Response Format
JSON responses; mutations answer `{"status": "success"|"error", "message": ...}`.
Report generation and download endpoints return the artifact bytes.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::dashboard::dashboard,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::update_employee_status,
        crate::api::employee::delete_employee,

        crate::api::payroll::create_payroll,
        crate::api::payroll::mark_payroll_paid,
        crate::api::payroll::download_payslip,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::list_paid_payrolls,
        crate::api::payroll::list_pending_payrolls,

        crate::api::report::list_reports,
        crate::api::report::generate_report,
        crate::api::report::download_report,
        crate::api::report::delete_report,

        crate::api::user::register_user,
        crate::api::user::get_user,
        crate::api::user::get_profile,
        crate::api::user::update_profile,

        crate::api::settings::get_company,
        crate::api::settings::update_company
    ),
    components(
        schemas(
            DashboardResponse,
            Department,
            EmployeeStatus,
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            UpdateStatus,
            PaymentStatus,
            Payroll,
            PayrollWithEmployee,
            CreatePayroll,
            PayrollQuery,
            PayrollListResponse,
            ReportType,
            ReportStatus,
            Report,
            ReportRequest,
            ReportListQuery,
            ReportListResponse,
            User,
            RegisterUser,
            Profile,
            Company,
            UpdateCompany
        )
    ),
    tags(
        (name = "Dashboard", description = "Headline counters"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Payroll", description = "Payroll generation and payment tracking"),
        (name = "Report", description = "Spreadsheet report generation and downloads"),
        (name = "User", description = "User registration and profiles"),
        (name = "Settings", description = "Company settings"),
    )
)]
pub struct ApiDoc;
