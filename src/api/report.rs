use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::ApiError;
use crate::model::report::Report;
use crate::report::{GeneratedReport, ReportOutcome, ReportRequest, XLSX_MIME, generate, mime_for};
use crate::utils::pagination::clamp_page;

/// Header carrying the new Report row's id, for follow-up download or
/// delete calls against an attachment body.
const REPORT_ID_HEADER: &str = "X-Report-Id";

fn spreadsheet_attachment(report: GeneratedReport) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_MIME)
        .insert_header((REPORT_ID_HEADER, report.report_id.to_string()))
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", report.file_name),
        ))
        .body(report.bytes)
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportListQuery {
    /// Page number (1-based, clamped to the valid range)
    pub page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportListResponse {
    pub data: Vec<Report>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 2)]
    pub total_pages: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 14)]
    pub total: i64,
}

/// List generated reports, newest first.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Paginated report list", body = ReportListResponse)
    ),
    tag = "Report"
)]
pub async fn list_reports(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<ReportListQuery>,
) -> Result<HttpResponse, ApiError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
        .fetch_one(pool.get_ref())
        .await?;

    let page = clamp_page(query.page.unwrap_or(1), total, config.page_size);

    let reports = sqlx::query_as::<_, Report>(
        "SELECT * FROM reports ORDER BY generated_date DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(config.page_size as i64)
    .bind(page.offset as i64)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(ReportListResponse {
        data: reports,
        page: page.page,
        total_pages: page.total_pages,
        per_page: config.page_size,
        total,
    }))
}

/// Generate a report and return the spreadsheet as a download. An empty
/// result set is a warning, not an error, and leaves nothing behind.
#[utoipa::path(
    post,
    path = "/api/reports/generate",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Spreadsheet bytes, or a no-data warning"),
        (status = 400, description = "Invalid date range"),
        (status = 500, description = "Report build or save failure")
    ),
    tag = "Report"
)]
pub async fn generate_report(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    match generate(pool.get_ref(), &config, &payload).await? {
        ReportOutcome::NoData => Ok(HttpResponse::Ok().json(json!({
            "status": "warning",
            "message": "No payroll records found for the selected criteria"
        }))),
        ReportOutcome::Generated(report) => Ok(spreadsheet_attachment(report)),
    }
}

/// Download a stored artifact. Legacy rows may serve a PDF.
#[utoipa::path(
    get,
    path = "/api/reports/{report_id}/download",
    params(
        ("report_id", Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Artifact bytes"),
        (status = 404, description = "Report or its file not found")
    ),
    tag = "Report"
)]
pub async fn download_report(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let report_id = path.into_inner();

    let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = ?")
        .bind(report_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Report"))?;

    let file_path = report.file_path.ok_or(ApiError::NotFound("Report file"))?;

    let bytes = std::fs::read(&file_path).map_err(|e| {
        warn!(report_id, %file_path, error = %e, "report file missing on disk");
        ApiError::NotFound("Report file")
    })?;

    Ok(HttpResponse::Ok()
        .content_type(mime_for(&file_path))
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", report.name),
        ))
        .body(bytes))
}

/// Delete a report row and its backing file.
#[utoipa::path(
    delete,
    path = "/api/reports/{report_id}",
    params(
        ("report_id", Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Report not found")
    ),
    tag = "Report"
)]
pub async fn delete_report(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let report_id = path.into_inner();

    let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = ?")
        .bind(report_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Report"))?;

    sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(report_id)
        .execute(pool.get_ref())
        .await?;

    if let Some(file_path) = &report.file_path {
        if let Err(e) = std::fs::remove_file(file_path) {
            // Row is gone either way; a stale file is only noise.
            warn!(report_id, %file_path, error = %e, "failed to remove report file");
        }
    }

    info!(report_id, "report deleted");

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_attachment_exposes_the_report_id() {
        let response = spreadsheet_attachment(GeneratedReport {
            report_id: 42,
            file_name: "Payroll_Report_20260301_20260331_101530.xlsx".to_string(),
            bytes: vec![b'P', b'K'],
        });

        assert_eq!(response.headers().get(REPORT_ID_HEADER).unwrap(), "42");
        let disposition = response
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.contains("Payroll_Report_20260301_20260331_101530.xlsx"));
    }
}
