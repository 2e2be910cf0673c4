//! Handler-level tests that need no live database or S3.
//!
//! These exercise the auth extractors and error rendering through a real
//! actix-web service, using small test-only handlers.

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test, web};
use secrecy::SecretString;
use uuid::Uuid;

use complaints_portal_lib::auth::{AuthUser, SessionSecret, StaffUser, create_session_token};
use complaints_portal_lib::error::AppError;

fn secret() -> SessionSecret {
    SessionSecret::new(SecretString::from("api-contract-test-secret".to_string()))
}

async fn whoami(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "username": auth.claims.username,
        "is_staff": auth.is_staff(),
    }))
}

async fn staff_only(_staff: StaffUser) -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn always_invalid() -> Result<HttpResponse, AppError> {
    Err(AppError::Validation(vec![
        "title: This field is required.".to_string(),
        "attachments: 'a.txt': Only JPG, JPEG, PNG, and PDF files are allowed.".to_string(),
    ]))
}

fn token(is_staff: bool) -> String {
    create_session_token(Uuid::new_v4(), "amira", is_staff, &secret(), 3600).unwrap()
}

macro_rules! test_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(secret()))
                .route("/whoami", web::get().to(whoami))
                .route("/staff-only", web::get().to(staff_only))
                .route("/invalid", web::get().to(always_invalid)),
        )
        .await
    };
}

#[actix_rt::test]
async fn missing_token_yields_401() {
    let app = test_app!();
    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn valid_token_authenticates() {
    let app = test_app!();
    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", token(false))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "amira");
    assert_eq!(body["is_staff"], false);
}

#[actix_rt::test]
async fn staff_surface_is_401_without_credentials() {
    // Unauthenticated callers must see the standard "must authenticate"
    // outcome, not "forbidden".
    let app = test_app!();
    let req = test::TestRequest::get().uri("/staff-only").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn staff_surface_is_403_for_citizens() {
    let app = test_app!();
    let req = test::TestRequest::get()
        .uri("/staff-only")
        .insert_header(("Authorization", format!("Bearer {}", token(false))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[actix_rt::test]
async fn staff_surface_admits_staff() {
    let app = test_app!();
    let req = test::TestRequest::get()
        .uri("/staff-only")
        .insert_header(("Authorization", format!("Bearer {}", token(true))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn validation_errors_carry_field_details() {
    let app = test_app!();
    let req = test::TestRequest::get().uri("/invalid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert!(details[0].as_str().unwrap().starts_with("title:"));
}
