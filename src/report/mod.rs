pub mod builders;
pub mod table;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use std::path::Path;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::calc::month_start;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::employee::Department;
use crate::model::payroll::PayrollWithEmployee;
use crate::model::report::{ReportStatus, ReportType};

pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Deserialize, ToSchema)]
pub struct ReportRequest {
    pub report_type: ReportType,

    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,

    pub department: Option<Department>,

    /// User credited on the Report row.
    #[schema(example = 1)]
    pub generated_by: Option<u64>,
}

pub struct GeneratedReport {
    pub report_id: u64,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub enum ReportOutcome {
    /// Nothing matched the criteria; no Report row, no artifact.
    NoData,
    Generated(GeneratedReport),
}

/// `{Type}_Report_{YYYYMMDD}_{YYYYMMDD}[_{department}]_{HHMMSS}.xlsx`
pub fn artifact_filename(
    report_type: ReportType,
    start: NaiveDate,
    end: NaiveDate,
    department: Option<Department>,
    now: NaiveDateTime,
) -> String {
    let mut name = format!(
        "{}_Report_{}_{}",
        report_type.file_prefix(),
        start.format("%Y%m%d"),
        end.format("%Y%m%d"),
    );
    if let Some(department) = department {
        name.push('_');
        name.push_str(&department.to_string());
    }
    name.push_str(&format!("_{}.xlsx", now.format("%H%M%S")));
    name
}

/// Pay periods are stored month-normalized, so the requested range is
/// widened to month boundaries: every month the range overlaps is included,
/// even when the endpoints fall mid-month.
fn period_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    (month_start(start), month_start(end))
}

/// MIME for a stored artifact. Rows written by the superseded PDF pipeline
/// still point at `.pdf` files and must download with the right type.
pub fn mime_for(file_path: &str) -> &'static str {
    if Path::new(file_path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    {
        "application/pdf"
    } else {
        XLSX_MIME
    }
}

async fn fetch_rows(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
    department: Option<Department>,
) -> Result<Vec<PayrollWithEmployee>, ApiError> {
    let mut sql = String::from(
        r#"
        SELECT
            p.id, p.employee_id, p.reference_id, p.pay_period,
            p.gross_salary, p.total_allowances, p.total_deductions,
            p.tax_rate, p.health_insurance, p.retirement_rate,
            p.tax_amount, p.retirement_amount, p.net_salary,
            p.payment_status, p.payment_date,
            e.first_name, e.last_name, e.department
        FROM payrolls p
        JOIN employees e ON e.id = p.employee_id
        WHERE p.pay_period BETWEEN ? AND ?
        "#,
    );
    if department.is_some() {
        sql.push_str(" AND e.department = ?");
    }
    sql.push_str(" ORDER BY e.department, p.employee_id, p.pay_period");

    let mut query = sqlx::query_as::<_, PayrollWithEmployee>(&sql)
        .bind(start)
        .bind(end);
    if let Some(department) = department {
        query = query.bind(department.to_string());
    }

    Ok(query.fetch_all(pool).await?)
}

/// Runs the shared report pipeline: validate the range, query the rows,
/// short-circuit on "no data", persist a processing Report row, render and
/// write the artifact, and flip the row to generated. Any build or save
/// failure leaves the row in `failed` and surfaces a generic error; a
/// partial artifact is never exposed for download.
pub async fn generate(
    pool: &MySqlPool,
    config: &Config,
    request: &ReportRequest,
) -> Result<ReportOutcome, ApiError> {
    if request.start_date > request.end_date {
        return Err(ApiError::validation("Start date cannot be after end date"));
    }

    let (range_start, range_end) = period_bounds(request.start_date, request.end_date);
    let rows = fetch_rows(pool, range_start, range_end, request.department).await?;
    if rows.is_empty() {
        return Ok(ReportOutcome::NoData);
    }

    let now = Utc::now().naive_utc();
    let file_name = artifact_filename(
        request.report_type,
        request.start_date,
        request.end_date,
        request.department,
        now,
    );

    let insert = sqlx::query(
        r#"
        INSERT INTO reports
        (name, type, period_start, period_end, department, status, generated_by)
        VALUES (?, ?, ?, ?, ?, 'processing', ?)
        "#,
    )
    .bind(&file_name)
    .bind(request.report_type)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(request.department)
    .bind(request.generated_by)
    .execute(pool)
    .await?;
    let report_id = insert.last_insert_id();

    let built = build_artifact(&rows, request).and_then(|bytes| {
        std::fs::create_dir_all(&config.reports_dir)
            .context("failed to create reports directory")?;
        let path = Path::new(&config.reports_dir).join(&file_name);
        std::fs::write(&path, &bytes).context("failed to write report file")?;
        Ok((bytes, path))
    });

    match built {
        Ok((bytes, path)) => {
            sqlx::query("UPDATE reports SET status = 'generated', file_path = ? WHERE id = ?")
                .bind(path.to_string_lossy().into_owned())
                .bind(report_id)
                .execute(pool)
                .await?;

            info!(report_id, %file_name, rows = rows.len(), "report generated");

            Ok(ReportOutcome::Generated(GeneratedReport {
                report_id,
                file_name,
                bytes,
            }))
        }
        Err(source) => {
            error!(report_id, error = ?source, "report build failed");
            sqlx::query("UPDATE reports SET status = ? WHERE id = ?")
                .bind(ReportStatus::Failed)
                .bind(report_id)
                .execute(pool)
                .await?;
            Err(ApiError::Internal(source.context("report generation failed")))
        }
    }
}

fn build_artifact(
    rows: &[PayrollWithEmployee],
    request: &ReportRequest,
) -> Result<Vec<u8>, anyhow::Error> {
    let bytes = match request.report_type {
        ReportType::Payroll => {
            builders::build_payroll_report(rows, request.start_date, request.end_date)?
        }
        ReportType::Department => builders::build_department_report(
            rows,
            request.start_date,
            request.end_date,
            request.department.is_some(),
        )?,
        ReportType::Employee => {
            builders::build_employee_report(rows, request.start_date, request.end_date)?
        }
        ReportType::Tax => {
            builders::build_tax_report(rows, request.start_date, request.end_date)?
        }
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn filename_without_department() {
        let now = d(2026, 3, 31).and_hms_opt(10, 15, 30).unwrap();
        let name = artifact_filename(ReportType::Payroll, d(2026, 3, 1), d(2026, 3, 31), None, now);
        assert_eq!(name, "Payroll_Report_20260301_20260331_101530.xlsx");
    }

    #[test]
    fn filename_with_department() {
        let now = d(2026, 3, 31).and_hms_opt(9, 5, 0).unwrap();
        let name = artifact_filename(
            ReportType::Tax,
            d(2026, 1, 1),
            d(2026, 3, 31),
            Some(Department::HumanResource),
            now,
        );
        assert_eq!(name, "Tax_Report_20260101_20260331_human_resource_090500.xlsx");
    }

    #[test]
    fn mid_month_range_still_covers_overlapped_months() {
        let (start, end) = period_bounds(d(2026, 3, 15), d(2026, 4, 14));
        assert_eq!(start, d(2026, 3, 1));
        assert_eq!(end, d(2026, 4, 1));
    }

    #[test]
    fn month_aligned_range_is_unchanged_at_the_start() {
        let (start, end) = period_bounds(d(2026, 1, 1), d(2026, 3, 31));
        assert_eq!(start, d(2026, 1, 1));
        assert_eq!(end, d(2026, 3, 1));
    }

    #[test]
    fn mime_prefers_pdf_for_legacy_artifacts() {
        assert_eq!(mime_for("reports/old_report.PDF"), "application/pdf");
        assert_eq!(mime_for("reports/new_report.xlsx"), XLSX_MIME);
        assert_eq!(mime_for("reports/odd_name"), XLSX_MIME);
    }
}
