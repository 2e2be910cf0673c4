//! Account registration and login endpoints.

use actix_web::{HttpResponse, post, web};
use tracing::info;

use crate::auth::{SessionSecret, create_session_token};
use crate::db::{DbPool, users};
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::services::password;

/// Session token lifetime, shared from config at startup.
#[derive(Clone, Copy)]
pub struct SessionTtl(pub u64);

fn validate_registration(body: &RegisterRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let username = body.username.trim();
    if username.is_empty() {
        errors.push("username: This field is required.".to_string());
    } else if username.len() > 150 {
        errors.push("username: Ensure this value has at most 150 characters.".to_string());
    }

    let email = body.email.trim();
    if email.is_empty() {
        errors.push("email: This field is required.".to_string());
    } else if !email.contains('@') {
        errors.push("email: Enter a valid email address.".to_string());
    }

    if body.password.chars().count() < 8 {
        errors.push("password: Password must be at least 8 characters.".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Register a citizen account.
///
/// POST /auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = crate::models::UserResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/register")]
pub async fn register(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    validate_registration(&body).map_err(AppError::Validation)?;

    let password_hash = password::hash_password(&body.password)?;
    let user = pool
        .create_user(body.username.trim(), body.email.trim(), &password_hash, false)
        .await?;

    info!("Account created: {}", user.username);

    Ok(HttpResponse::Created().json(users::model_to_response(user)))
}

/// Log in and receive a session token.
///
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Bad credentials", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/login")]
pub async fn login(
    pool: web::Data<DbPool>,
    secret: web::Data<SessionSecret>,
    ttl: web::Data<SessionTtl>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let user = pool
        .find_user_by_username(body.username.trim())
        .await?
        .filter(|u| password::verify_password(&body.password, &u.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password.".to_string()))?;

    let access_token =
        create_session_token(user.id, &user.username, user.is_staff, &secret, ttl.0)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        user: users::model_to_response(user),
    }))
}

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_registration_validation_collects_errors() {
        let errors =
            validate_registration(&request("", "not-an-email", "short")).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_registration_validation_accepts_good_input() {
        assert!(validate_registration(&request("amira", "amira@example.gov", "sufficiently-long")).is_ok());
    }
}
