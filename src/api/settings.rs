use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::company::Company;

const DEFAULT_COMPANY_NAME: &str = "PayPulse";

#[derive(Deserialize, ToSchema)]
pub struct UpdateCompany {
    #[schema(example = "Acme Corp")]
    pub name: String,

    pub logo: Option<String>,
}

// Only the first row is ever used; it springs into existence on first read.
async fn load_or_create_company(pool: &MySqlPool) -> Result<Company, ApiError> {
    let company = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await?;

    if let Some(company) = company {
        return Ok(company);
    }

    let inserted = sqlx::query("INSERT INTO companies (name) VALUES (?)")
        .bind(DEFAULT_COMPANY_NAME)
        .execute(pool)
        .await?;

    Ok(Company {
        id: inserted.last_insert_id(),
        name: DEFAULT_COMPANY_NAME.to_string(),
        logo: None,
    })
}

/// Company settings.
#[utoipa::path(
    get,
    path = "/api/settings/company",
    responses(
        (status = 200, description = "Company settings", body = Company)
    ),
    tag = "Settings"
)]
pub async fn get_company(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let company = load_or_create_company(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(company))
}

/// Update company settings.
#[utoipa::path(
    put,
    path = "/api/settings/company",
    request_body = UpdateCompany,
    responses(
        (status = 200, description = "Company updated"),
        (status = 400, description = "Validation error")
    ),
    tag = "Settings"
)]
pub async fn update_company(
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateCompany>,
) -> Result<HttpResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Company name is required"));
    }

    let company = load_or_create_company(pool.get_ref()).await?;

    sqlx::query("UPDATE companies SET name = ?, logo = ? WHERE id = ?")
        .bind(payload.name.trim())
        .bind(&payload.logo)
        .bind(company.id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Company settings updated"
    })))
}
