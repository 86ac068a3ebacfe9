use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::employee::Department;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReportType {
    Payroll,
    Department,
    Employee,
    Tax,
}

impl ReportType {
    /// Worksheet title line.
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Payroll => "Payroll Detail Report",
            ReportType::Department => "Department Summary Report",
            ReportType::Employee => "Employee Summary Report",
            ReportType::Tax => "Tax Summary Report",
        }
    }

    /// Leading segment of the artifact filename.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportType::Payroll => "Payroll",
            ReportType::Department => "Department",
            ReportType::Employee => "Employee",
            ReportType::Tax => "Tax",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReportStatus {
    Processing,
    Generated,
    Failed,
}

/// A persisted export artifact plus its metadata. `file_path` points at the
/// generated spreadsheet under the configured reports directory; rows from
/// the superseded generation path may still reference `.pdf` files.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct Report {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Payroll_Report_20260301_20260331_101530.xlsx")]
    pub name: String,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub report_type: ReportType,

    #[schema(example = "2026-03-31T10:15:30Z", format = "date-time", value_type = String)]
    pub generated_date: DateTime<Utc>,

    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,

    #[schema(example = "2026-03-31", format = "date", value_type = String)]
    pub period_end: NaiveDate,

    pub department: Option<Department>,

    pub file_path: Option<String>,

    pub status: ReportStatus,

    #[schema(example = 1)]
    pub generated_by: Option<u64>,
}
