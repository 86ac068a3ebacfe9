use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::company::Profile;
use crate::model::user::User;
use crate::utils::db_utils::{build_update_sql, execute_update};

const PROFILE_COLUMNS: &[&str] = &["avatar", "bio", "phone_number"];

#[derive(Deserialize, ToSchema)]
pub struct RegisterUser {
    #[schema(example = "jdoe")]
    pub username: String,

    #[schema(example = "jdoe@company.com", format = "email")]
    pub email: String,
}

/// Register a user. The profile row is created here, explicitly, in the
/// same transaction; there is no on-save hook doing it behind the scenes.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "status": "success",
            "message": "User registered successfully",
            "data": { "id": 1 }
        })),
        (status = 400, description = "Validation error or duplicate username")
    ),
    tag = "User"
)]
pub async fn register_user(
    pool: web::Data<MySqlPool>,
    payload: web::Json<RegisterUser>,
) -> Result<HttpResponse, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email address is required"));
    }

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO users (username, email) VALUES (?, ?)")
        .bind(payload.username.trim())
        .bind(&payload.email)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::validation("Username is already taken")
            }
            _ => ApiError::from(e),
        })?;
    let user_id = inserted.last_insert_id();

    sqlx::query("INSERT INTO profiles (user_id) VALUES (?)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id, username = %payload.username, "user registered");

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "User registered successfully",
        "data": { "id": user_id }
    })))
}

/// Get User by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found")
    ),
    tag = "User"
)]
pub async fn get_user(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Err(ApiError::NotFound("User")),
    }
}

/// Get a user's profile.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/profile",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile found", body = Profile),
        (status = 404, description = "Profile not found")
    ),
    tag = "User"
)]
pub async fn get_profile(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Err(ApiError::NotFound("Profile")),
    }
}

/// Update a user's profile (avatar, bio, phone).
#[utoipa::path(
    put,
    path = "/api/users/{user_id}/profile",
    params(
        ("user_id", Path, description = "User ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Unknown or malformed field"),
        (status = 404, description = "Profile not found")
    ),
    tag = "User"
)]
pub async fn update_profile(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<HttpResponse> {
    let user_id = path.into_inner();

    let update = build_update_sql("profiles", &body, PROFILE_COLUMNS, "user_id", user_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(ApiError::from)?;

    if affected == 0 {
        return Err(ApiError::NotFound("Profile").into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Profile updated successfully"
    })))
}
