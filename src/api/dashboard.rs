use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::error::ApiError;

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    #[schema(example = 42)]
    pub total_employees: i64,
    #[schema(example = 30)]
    pub active_employees: i64,
    #[schema(example = 5)]
    pub on_leave_employees: i64,
    #[schema(example = 7)]
    pub probation_employees: i64,
    #[schema(example = 12)]
    pub pending_payrolls: i64,
}

/// Headline counts for the landing dashboard.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardResponse)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let total_employees = count(&pool, "SELECT COUNT(*) FROM employees").await?;
    let active_employees =
        count(&pool, "SELECT COUNT(*) FROM employees WHERE is_active = 'active'").await?;
    let on_leave_employees =
        count(&pool, "SELECT COUNT(*) FROM employees WHERE is_active = 'on_leave'").await?;
    let probation_employees =
        count(&pool, "SELECT COUNT(*) FROM employees WHERE is_active = 'probation'").await?;
    let pending_payrolls =
        count(&pool, "SELECT COUNT(*) FROM payrolls WHERE payment_status = 'pending'").await?;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        total_employees,
        active_employees,
        on_leave_employees,
        probation_employees,
        pending_payrolls,
    }))
}

async fn count(pool: &MySqlPool, sql: &str) -> Result<i64, ApiError> {
    let n = sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await?;
    Ok(n)
}
