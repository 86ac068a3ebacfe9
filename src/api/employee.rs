use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::ApiError;
use crate::model::employee::{Department, Employee, EmployeeStatus};
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::pagination::clamp_page;

// Columns the dynamic update path may touch.
const UPDATABLE_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone_number",
    "hire_date",
    "department",
    "salary",
    "is_active",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,

    #[schema(example = "+8801712345678")]
    pub phone_number: Option<String>,

    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,

    pub department: Option<Department>,

    #[schema(example = "90000.00", value_type = String)]
    pub salary: Decimal,

    pub is_active: Option<EmployeeStatus>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Filter by activity status
    pub status: Option<EmployeeStatus>,
    /// Filter by department
    pub department: Option<Department>,
    /// Substring match on name, email or phone
    pub search: Option<String>,
    /// One of: id, name, salary, department
    pub sort: Option<String>,
    /// Page number (1-based, clamped to the valid range)
    pub page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 3)]
    pub total_pages: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 25)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatus {
    #[schema(example = "on_leave")]
    pub status: String,
}

/// Value checks for the dynamic update path. Column names are whitelisted
/// downstream, but enum and salary values have to be rejected here: a bogus
/// department or status string would otherwise persist and break decoding
/// on every later read of the row.
fn validate_update_values(payload: &Value) -> Result<(), ApiError> {
    let Some(obj) = payload.as_object() else {
        // non-objects are rejected when the UPDATE is built
        return Ok(());
    };

    for key in ["first_name", "last_name"] {
        if let Some(value) = obj.get(key) {
            if value.as_str().map(str::trim).filter(|s| !s.is_empty()).is_none() {
                return Err(ApiError::validation("First and last name are required"));
            }
        }
    }

    if let Some(value) = obj.get("email") {
        if !value.as_str().is_some_and(|s| s.contains('@')) {
            return Err(ApiError::validation("A valid email address is required"));
        }
    }

    if let Some(value) = obj.get("department") {
        if !value.is_null() {
            value
                .as_str()
                .and_then(|s| Department::from_str(s).ok())
                .ok_or_else(|| ApiError::validation("Invalid department value"))?;
        }
    }

    if let Some(value) = obj.get("is_active") {
        value
            .as_str()
            .and_then(|s| EmployeeStatus::from_str(s).ok())
            .ok_or_else(|| ApiError::validation("Invalid status value"))?;
    }

    if let Some(value) = obj.get("salary") {
        let salary = value
            .as_number()
            .and_then(|n| Decimal::from_str(&n.to_string()).ok())
            .ok_or_else(|| ApiError::validation("Salary must be a number"))?;
        if salary < Decimal::ZERO {
            return Err(ApiError::validation("Salary cannot be negative"));
        }
    }

    Ok(())
}

fn validate_employee(payload: &CreateEmployee) -> Result<(), ApiError> {
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::validation("First and last name are required"));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email address is required"));
    }
    if payload.salary < Decimal::ZERO {
        return Err(ApiError::validation("Salary cannot be negative"));
    }
    Ok(())
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "status": "success",
            "message": "Employee John Doe added successfully"
        })),
        (status = 400, description = "Validation error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    validate_employee(&payload)?;

    let status = payload.is_active.unwrap_or(EmployeeStatus::Active);

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (first_name, last_name, email, phone_number, hire_date, department, salary, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone_number)
    .bind(payload.hire_date)
    .bind(payload.department)
    .bind(payload.salary)
    .bind(status)
    .execute(pool.get_ref())
    .await?;

    info!(employee_id = result.last_insert_id(), "employee created");

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": format!(
            "Employee {} {} added successfully",
            payload.first_name, payload.last_name
        ),
        "data": { "id": result.last_insert_id() }
    })))
}

/// List employees with filtering, search, sorting and clamped pagination.
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(
            " AND (first_name LIKE ? OR last_name LIKE ? OR email LIKE ? OR phone_number LIKE ?)",
        );
        let like = format!("%{}%", search);
        for _ in 0..4 {
            binds.push(like.clone());
        }
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND is_active = ?");
        binds.push(status.to_string());
    }

    if let Some(department) = query.department {
        where_sql.push_str(" AND department = ?");
        binds.push(department.to_string());
    }

    let order_sql = match query.sort.as_deref() {
        Some("salary") => " ORDER BY id, salary DESC",
        Some("name") => " ORDER BY id, first_name, last_name",
        Some("department") => " ORDER BY id, department, first_name",
        _ => " ORDER BY id",
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    debug!(sql = %count_sql, "counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &binds {
        count_q = count_q.bind(b);
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let page = clamp_page(query.page.unwrap_or(1), total, config.page_size);

    let data_sql = format!(
        "SELECT * FROM employees{}{} LIMIT ? OFFSET ?",
        where_sql, order_sql
    );
    debug!(sql = %data_sql, page = page.page, "fetching employees");

    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &binds {
        data_q = data_q.bind(b);
    }
    let employees = data_q
        .bind(config.page_size as i64)
        .bind(page.offset as i64)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page: page.page,
        total_pages: page.total_pages,
        per_page: config.page_size,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Err(ApiError::NotFound("Employee")),
    }
}

/// Update Employee (partial, whitelisted columns only)
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown or malformed field"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = path.into_inner();

    validate_update_values(&body)?;

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(ApiError::from)?;

    if affected == 0 {
        return Err(ApiError::NotFound("Employee").into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Employee updated successfully"
    })))
}

/// Update only the activity status.
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/status",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateStatus,
    responses(
        (status = 200, description = "Status updated", body = Object, example = json!({
            "status": "success",
            "new_status": "on_leave"
        })),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateStatus>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let new_status = EmployeeStatus::from_str(&payload.status)
        .map_err(|_| ApiError::validation("Invalid status value"))?;

    let result = sqlx::query("UPDATE employees SET is_active = ? WHERE id = ?")
        .bind(new_status)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "new_status": new_status.to_string()
    })))
}

/// Delete Employee (payroll records cascade at the database layer).
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee"));
    }

    info!(employee_id, "employee deleted");

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_unknown_department() {
        assert!(validate_update_values(&json!({ "department": "astrology" })).is_err());
    }

    #[test]
    fn update_rejects_unknown_status() {
        assert!(validate_update_values(&json!({ "is_active": "zombie" })).is_err());
    }

    #[test]
    fn update_rejects_negative_salary() {
        assert!(validate_update_values(&json!({ "salary": -5000 })).is_err());
    }

    #[test]
    fn update_rejects_non_numeric_salary() {
        assert!(validate_update_values(&json!({ "salary": "lots" })).is_err());
    }

    #[test]
    fn update_accepts_valid_values() {
        let payload = json!({
            "first_name": "Ada",
            "email": "ada@company.com",
            "department": "engineering",
            "is_active": "on_leave",
            "salary": 75000.50
        });
        assert!(validate_update_values(&payload).is_ok());
    }

    #[test]
    fn department_may_be_cleared_with_null() {
        assert!(validate_update_values(&json!({ "department": null })).is_ok());
    }
}
