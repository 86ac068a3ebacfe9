use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Department {
    Engineering,
    Marketing,
    Sales,
    HumanResource,
    Finance,
    Design,
}

impl Department {
    /// Display name used in report output.
    pub fn label(&self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
            Department::HumanResource => "Human Resource",
            Department::Finance => "Finance",
            Department::Design => "Design",
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
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Probation,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone_number": "+8801712345678",
        "hire_date": "2024-01-01",
        "department": "engineering",
        "salary": "90000.00",
        "is_active": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678")]
    pub phone_number: Option<String>,

    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,

    pub department: Option<Department>,

    #[schema(example = "90000.00", value_type = String)]
    pub salary: Decimal,

    pub is_active: EmployeeStatus,
}
