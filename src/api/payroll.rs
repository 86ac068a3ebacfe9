use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::calc::{
    PayRates, compute_payroll, generate_reference_id, month_start, violates_net_floor,
};
use crate::config::Config;
use crate::error::{ApiError, DUPLICATE_PAYROLL_MSG};
use crate::model::employee::Department;
use crate::model::payroll::{PaymentStatus, PayrollWithEmployee};
use crate::report::{XLSX_MIME, builders::build_payslip};
use crate::utils::pagination::clamp_page;

const JOINED_SELECT: &str = r#"
    SELECT
        p.id, p.employee_id, p.reference_id, p.pay_period,
        p.gross_salary, p.total_allowances, p.total_deductions,
        p.tax_rate, p.health_insurance, p.retirement_rate,
        p.tax_amount, p.retirement_amount, p.net_salary,
        p.payment_status, p.payment_date,
        e.first_name, e.last_name, e.department
    FROM payrolls p
    JOIN employees e ON e.id = p.employee_id
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 1)]
    pub employee_id: u64,

    /// Day the payroll is issued for; determines the covered month.
    #[schema(example = "2026-03-31", format = "date", value_type = String)]
    pub pay_date: NaiveDate,

    #[schema(example = "0.00", value_type = String)]
    pub total_allowances: Option<Decimal>,

    /// Miscellaneous operator-entered deductions.
    #[schema(example = "0.00", value_type = String)]
    pub total_deductions: Option<Decimal>,

    /// Defaults to the employee's base salary.
    #[schema(example = "90000.00", value_type = String)]
    pub gross_salary: Option<Decimal>,

    #[schema(example = "16.00", value_type = String)]
    pub tax_rate: Option<Decimal>,

    #[schema(example = "2000.00", value_type = String)]
    pub health_insurance: Option<Decimal>,

    #[schema(example = "5.00", value_type = String)]
    pub retirement_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    /// Filter by payment status
    pub status: Option<PaymentStatus>,
    /// Filter by the employee's department
    pub department: Option<Department>,
    /// Reference-id substring, or employee name fallback
    pub search: Option<String>,
    /// Page number (1-based, clamped to the valid range)
    pub page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<PayrollWithEmployee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 3)]
    pub total_pages: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 25)]
    pub total: i64,
}

#[derive(sqlx::FromRow)]
struct EmployeeSalaryRow {
    salary: Decimal,
}

#[derive(sqlx::FromRow)]
struct PayrollStateRow {
    payment_status: PaymentStatus,
    pay_period: NaiveDate,
}

/// Builds the search condition for the payroll listing: case-insensitive
/// reference-id substring first, employee first/last-name substring as a
/// fallback, and when the query holds two tokens both "first last" and
/// "last first" orderings are tried.
fn search_filter(query: &str) -> (String, Vec<String>) {
    let q = query.trim().to_lowercase();
    let like = format!("%{}%", q);

    let mut sql = String::from(
        " AND (LOWER(p.reference_id) LIKE ? \
          OR LOWER(e.first_name) LIKE ? OR LOWER(e.last_name) LIKE ?",
    );
    let mut binds = vec![like.clone(), like.clone(), like];

    if let Some((first, last)) = q.split_once(' ') {
        let (first, last) = (first.trim(), last.trim());
        if !first.is_empty() && !last.is_empty() {
            sql.push_str(
                " OR (LOWER(e.first_name) LIKE ? AND LOWER(e.last_name) LIKE ?) \
                  OR (LOWER(e.first_name) LIKE ? AND LOWER(e.last_name) LIKE ?)",
            );
            let first_like = format!("%{}%", first);
            let last_like = format!("%{}%", last);
            binds.push(first_like.clone());
            binds.push(last_like.clone());
            binds.push(last_like);
            binds.push(first_like);
        }
    }

    sql.push(')');
    (sql, binds)
}

fn payslip_filename(reference_id: &str) -> String {
    format!("Payslip_{}.xlsx", reference_id)
}

/// Generate a payroll for one employee and month.
#[utoipa::path(
    post,
    path = "/api/payrolls",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = Object, example = json!({
            "status": "success",
            "message": "Payroll generated successfully",
            "data": { "id": 1, "reference_id": "PAY-202603-0001-9f3a2c", "net_salary": "69100.00" }
        })),
        (status = 400, description = "Validation error (duplicate month, past pay date, net-pay floor)"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll"
)]
pub async fn create_payroll(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayroll>,
) -> Result<HttpResponse, ApiError> {
    let employee = sqlx::query_as::<_, EmployeeSalaryRow>(
        "SELECT salary FROM employees WHERE id = ?",
    )
    .bind(payload.employee_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::NotFound("Employee"))?;

    let today = Utc::now().date_naive();
    if payload.pay_date < today {
        return Err(ApiError::validation("Pay date cannot be in the past"));
    }

    let pay_period = month_start(payload.pay_date);

    // Race-prone convenience check; the unique constraint below is the
    // actual guard against concurrent duplicates.
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM payrolls WHERE employee_id = ? AND pay_period = ?",
    )
    .bind(payload.employee_id)
    .bind(pay_period)
    .fetch_one(pool.get_ref())
    .await?;

    if existing > 0 {
        return Err(ApiError::validation(DUPLICATE_PAYROLL_MSG));
    }

    let gross_salary = payload.gross_salary.unwrap_or(employee.salary);
    let allowances = payload.total_allowances.unwrap_or(Decimal::ZERO);
    let deductions = payload.total_deductions.unwrap_or(Decimal::ZERO);

    let defaults = PayRates::default();
    let rates = PayRates {
        tax_rate: payload.tax_rate.unwrap_or(defaults.tax_rate),
        health_insurance: payload.health_insurance.unwrap_or(defaults.health_insurance),
        retirement_rate: payload.retirement_rate.unwrap_or(defaults.retirement_rate),
    };

    let breakdown = compute_payroll(gross_salary, allowances, deductions, &rates);

    if violates_net_floor(breakdown.net_salary, gross_salary) {
        return Err(ApiError::validation(
            "Net salary would fall below one third of gross salary",
        ));
    }

    let reference_id = generate_reference_id(payload.employee_id, pay_period);

    let result = sqlx::query(
        r#"
        INSERT INTO payrolls
        (employee_id, reference_id, pay_period, gross_salary, total_allowances,
         total_deductions, tax_rate, health_insurance, retirement_rate,
         tax_amount, retirement_amount, net_salary, payment_status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(payload.employee_id)
    .bind(&reference_id)
    .bind(pay_period)
    .bind(gross_salary)
    .bind(allowances)
    .bind(deductions)
    .bind(rates.tax_rate)
    .bind(rates.health_insurance)
    .bind(rates.retirement_rate)
    .bind(breakdown.tax_amount)
    .bind(breakdown.retirement_amount)
    .bind(breakdown.net_salary)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::from_payroll_insert)?;

    info!(
        payroll_id = result.last_insert_id(),
        %reference_id,
        employee_id = payload.employee_id,
        "payroll created"
    );

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Payroll generated successfully",
        "data": {
            "id": result.last_insert_id(),
            "reference_id": reference_id,
            "net_salary": breakdown.net_salary,
        }
    })))
}

/// Transition a pending payroll to paid. Irreversible; rejected while the
/// pay period is still in the future.
#[utoipa::path(
    post,
    path = "/api/payrolls/{payroll_id}/mark-paid",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Marked paid", body = Object, example = json!({
            "status": "success",
            "message": "Payroll marked as paid",
            "data": { "payment_date": "2026-03-31" }
        })),
        (status = 400, description = "Already paid or pay period in the future"),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn mark_payroll_paid(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();

    let state = sqlx::query_as::<_, PayrollStateRow>(
        "SELECT payment_status, pay_period FROM payrolls WHERE id = ?",
    )
    .bind(payroll_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::NotFound("Payroll"))?;

    if state.payment_status == PaymentStatus::Paid {
        return Err(ApiError::validation("Payroll is already marked as paid"));
    }

    let today = Utc::now().date_naive();
    if state.pay_period > today {
        return Err(ApiError::validation(
            "Payroll cannot be marked as paid before its pay period",
        ));
    }

    // Guarded update so a concurrent second request loses cleanly.
    let result = sqlx::query(
        r#"
        UPDATE payrolls
        SET payment_status = 'paid', payment_date = ?
        WHERE id = ? AND payment_status = 'pending'
        "#,
    )
    .bind(today)
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::validation("Payroll is already marked as paid"));
    }

    info!(payroll_id, "payroll marked paid");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll marked as paid",
        "data": { "payment_date": today }
    })))
}

/// Payroll detail with the owning employee.
#[utoipa::path(
    get,
    path = "/api/payrolls/{payroll_id}",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll found", body = PayrollWithEmployee),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();

    let sql = format!("{} WHERE p.id = ?", JOINED_SELECT);
    let payroll = sqlx::query_as::<_, PayrollWithEmployee>(&sql)
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match payroll {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Err(ApiError::NotFound("Payroll")),
    }
}

/// Payslip spreadsheet for one payroll record, built on the fly; nothing
/// is persisted.
#[utoipa::path(
    get,
    path = "/api/payrolls/{payroll_id}/payslip",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payslip spreadsheet bytes"),
        (status = 404, description = "Payroll not found")
    ),
    tag = "Payroll"
)]
pub async fn download_payslip(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();

    let sql = format!("{} WHERE p.id = ?", JOINED_SELECT);
    let payroll = sqlx::query_as::<_, PayrollWithEmployee>(&sql)
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Payroll"))?;

    let bytes = build_payslip(&payroll)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("payslip build failed")))?;

    Ok(HttpResponse::Ok()
        .content_type(XLSX_MIME)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", payslip_filename(&payroll.reference_id)),
        ))
        .body(bytes))
}

async fn list_inner(
    pool: &MySqlPool,
    config: &Config,
    query: &PayrollQuery,
    forced_status: Option<PaymentStatus>,
) -> Result<HttpResponse, ApiError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(status) = forced_status.or(query.status) {
        where_sql.push_str(" AND p.payment_status = ?");
        binds.push(status.to_string());
    }

    if let Some(department) = query.department {
        where_sql.push_str(" AND e.department = ?");
        binds.push(department.to_string());
    }

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let (sql, like_binds) = search_filter(search);
        where_sql.push_str(&sql);
        binds.extend(like_binds);
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM payrolls p JOIN employees e ON e.id = p.employee_id{}",
        where_sql
    );
    debug!(sql = %count_sql, "counting payrolls");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &binds {
        count_q = count_q.bind(b);
    }
    let total = count_q.fetch_one(pool).await?;

    let page = clamp_page(query.page.unwrap_or(1), total, config.page_size);

    let data_sql = format!(
        "{}{} ORDER BY p.pay_period DESC, p.id DESC LIMIT ? OFFSET ?",
        JOINED_SELECT, where_sql
    );

    let mut data_q = sqlx::query_as::<_, PayrollWithEmployee>(&data_sql);
    for b in &binds {
        data_q = data_q.bind(b);
    }
    let payrolls = data_q
        .bind(config.page_size as i64)
        .bind(page.offset as i64)
        .fetch_all(pool)
        .await?;

    Ok(HttpResponse::Ok().json(PayrollListResponse {
        data: payrolls,
        page: page.page,
        total_pages: page.total_pages,
        per_page: config.page_size,
        total,
    }))
}

/// List payrolls with status/department filters and reference-id search.
#[utoipa::path(
    get,
    path = "/api/payrolls",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated payroll list", body = PayrollListResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, ApiError> {
    list_inner(pool.get_ref(), &config, &query, None).await
}

/// Paid payrolls only.
#[utoipa::path(
    get,
    path = "/api/payrolls/paid",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated paid payroll list", body = PayrollListResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_paid_payrolls(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, ApiError> {
    list_inner(pool.get_ref(), &config, &query, Some(PaymentStatus::Paid)).await
}

/// Pending payrolls only.
#[utoipa::path(
    get,
    path = "/api/payrolls/pending",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated pending payroll list", body = PayrollListResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_pending_payrolls(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, ApiError> {
    list_inner(pool.get_ref(), &config, &query, Some(PaymentStatus::Pending)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_token_search_matches_reference_and_names() {
        let (sql, binds) = search_filter("PAY-2026");
        assert!(sql.contains("p.reference_id"));
        assert!(sql.contains("e.first_name"));
        assert!(sql.contains("e.last_name"));
        assert_eq!(binds, vec!["%pay-2026%", "%pay-2026%", "%pay-2026%"]);
    }

    #[test]
    fn two_token_search_tries_both_name_orderings() {
        let (sql, binds) = search_filter("John Doe");
        assert_eq!(sql.matches('?').count(), 7);
        assert_eq!(binds.len(), 7);
        // first last ...
        assert_eq!(binds[3], "%john%");
        assert_eq!(binds[4], "%doe%");
        // ... and last first
        assert_eq!(binds[5], "%doe%");
        assert_eq!(binds[6], "%john%");
    }

    #[test]
    fn search_is_lowercased() {
        let (_, binds) = search_filter("  PAY-202603-0001  ");
        assert_eq!(binds[0], "%pay-202603-0001%");
    }

    #[test]
    fn payslip_filename_carries_the_reference() {
        assert_eq!(
            payslip_filename("PAY-202603-0001-9f3a2c"),
            "Payslip_PAY-202603-0001-9f3a2c.xlsx"
        );
    }

    #[test]
    fn balanced_parentheses_in_search_sql() {
        for q in ["alice", "alice smith", "a b c"] {
            let (sql, _) = search_filter(q);
            let open = sql.matches('(').count();
            let close = sql.matches(')').count();
            assert_eq!(open, close, "unbalanced SQL for {:?}", q);
        }
    }
}
