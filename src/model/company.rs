use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Company-wide settings. At most one row is ever used; it is created on
/// first read with a default name.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "PayPulse")]
    pub name: String,

    pub logo: Option<String>,
}

/// Per-user profile record, created explicitly when the user is registered.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Profile {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub user_id: u64,

    pub avatar: Option<String>,

    pub bio: Option<String>,

    #[schema(example = "+8801712345678")]
    pub phone_number: Option<String>,
}
