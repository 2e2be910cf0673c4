//! Actix-web extractors for session authentication.
//!
//! `AuthUser` yields 401 when credentials are missing or invalid.
//! `StaffUser` additionally yields 403 for authenticated non-staff
//! callers, so unauthenticated requests to staff surfaces still see the
//! standard "must authenticate" outcome rather than "forbidden".

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use super::{SessionSecret, verify_session_token};
use crate::error::ErrorResponse;
use crate::models::SessionClaims;

/// Extract the bearer token from the Authorization header.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication/authorization error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: String,
}

impl AuthError {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let code = if self.status == StatusCode::FORBIDDEN {
            "FORBIDDEN"
        } else {
            "UNAUTHORIZED"
        };
        HttpResponse::build(self.status).json(ErrorResponse {
            error: code.to_string(),
            message: self.message.clone(),
            details: None,
        })
    }
}

/// Extractor for any authenticated account.
///
/// Use this in handlers that require a logged-in caller:
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl Responder {
///     // auth.claims carries the session identity
/// }
/// ```
#[derive(Debug)]
pub struct AuthUser {
    pub claims: SessionClaims,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.claims.user_id
    }

    pub fn is_staff(&self) -> bool {
        self.claims.is_staff
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AuthError> {
    let secret = req
        .app_data::<web::Data<SessionSecret>>()
        .ok_or_else(|| AuthError::unauthorized("Internal configuration error"))?;

    let token = bearer_token(req).ok_or_else(|| {
        AuthError::unauthorized("Missing credentials. Provide an Authorization: Bearer token.")
    })?;

    let claims = verify_session_token(token, secret).map_err(AuthError::unauthorized)?;

    Ok(AuthUser { claims })
}

impl FromRequest for AuthUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Extractor for staff accounts. Unauthenticated callers get 401,
/// authenticated non-staff callers get 403.
#[derive(Debug)]
pub struct StaffUser(pub AuthUser);

impl StaffUser {
    pub fn user_id(&self) -> Uuid {
        self.0.user_id()
    }
}

impl FromRequest for StaffUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            if user.is_staff() {
                Ok(StaffUser(user))
            } else {
                Err(AuthError::forbidden("Staff access required."))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_session_token;
    use actix_web::test::TestRequest;
    use secrecy::SecretString;

    fn secret() -> SessionSecret {
        SessionSecret::new(SecretString::from("extractor-test-secret".to_string()))
    }

    fn request_with_token(token: Option<&str>) -> HttpRequest {
        let mut req = TestRequest::default().app_data(web::Data::new(secret()));
        if let Some(token) = token {
            req = req.insert_header(("Authorization", format!("Bearer {}", token)));
        }
        req.to_http_request()
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let req = request_with_token(None);
        let err = authenticate(&req).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        let req = request_with_token(Some("not-a-jwt"));
        let err = authenticate(&req).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_valid_token_authenticates() {
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, "amira", false, &secret(), 3600).unwrap();
        let req = request_with_token(Some(&token));
        let user = authenticate(&req).unwrap();
        assert_eq!(user.user_id(), user_id);
        assert!(!user.is_staff());
    }

    #[test]
    fn test_staff_gate_forbids_non_staff() {
        let token =
            create_session_token(Uuid::new_v4(), "amira", false, &secret(), 3600).unwrap();
        let req = request_with_token(Some(&token));
        let user = authenticate(&req).unwrap();
        assert!(!user.is_staff());
        // Authenticated but not staff: the StaffUser gate must produce 403,
        // never 401.
        let gate = authenticate(&req).and_then(|u| {
            if u.is_staff() {
                Ok(StaffUser(u))
            } else {
                Err(AuthError::forbidden("Staff access required."))
            }
        });
        assert_eq!(gate.unwrap_err().status, StatusCode::FORBIDDEN);
    }
}
