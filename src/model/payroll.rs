use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
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
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// One employee's payroll for one calendar month. `pay_period` is stored
/// normalized to the first day of the month; the unique constraint on
/// (employee_id, pay_period) is what actually prevents duplicates under
/// concurrent creates.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "PAY-202603-0001-9f3a2c")]
    pub reference_id: String,

    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub pay_period: NaiveDate,

    #[schema(example = "90000.00", value_type = String)]
    pub gross_salary: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub total_allowances: Decimal,

    #[schema(example = "0.00", value_type = String)]
    pub total_deductions: Decimal,

    #[schema(example = "16.00", value_type = String)]
    pub tax_rate: Decimal,

    #[schema(example = "2000.00", value_type = String)]
    pub health_insurance: Decimal,

    #[schema(example = "5.00", value_type = String)]
    pub retirement_rate: Decimal,

    #[schema(example = "14400.00", value_type = String)]
    pub tax_amount: Decimal,

    #[schema(example = "4500.00", value_type = String)]
    pub retirement_amount: Decimal,

    #[schema(example = "69100.00", value_type = String)]
    pub net_salary: Decimal,

    pub payment_status: PaymentStatus,

    #[schema(example = "2026-03-05", format = "date", value_type = String)]
    pub payment_date: Option<NaiveDate>,

    #[schema(example = "2026-03-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2026-03-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// Payroll joined with the owning employee, as used by listings and the
/// report builders.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PayrollWithEmployee {
    pub id: u64,
    pub employee_id: u64,
    pub reference_id: String,

    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub pay_period: NaiveDate,

    #[schema(value_type = String)]
    pub gross_salary: Decimal,
    #[schema(value_type = String)]
    pub total_allowances: Decimal,
    #[schema(value_type = String)]
    pub total_deductions: Decimal,
    #[schema(value_type = String)]
    pub tax_rate: Decimal,
    #[schema(value_type = String)]
    pub health_insurance: Decimal,
    #[schema(value_type = String)]
    pub retirement_rate: Decimal,
    #[schema(value_type = String)]
    pub tax_amount: Decimal,
    #[schema(value_type = String)]
    pub retirement_amount: Decimal,
    #[schema(value_type = String)]
    pub net_salary: Decimal,

    pub payment_status: PaymentStatus,

    #[schema(format = "date", value_type = String)]
    pub payment_date: Option<NaiveDate>,

    pub first_name: String,
    pub last_name: String,
    pub department: Option<Department>,
}

impl PayrollWithEmployee {
    pub fn employee_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
