use crate::database::MongoDB;
use crate::services::auth_service::{
    self, Claims, LoginRequest, SignupRequest, VerifyRequest,
};
use crate::services::email_service::Mailer;
use crate::utils::error::ApiError;
use crate::utils::response::success_object;
use crate::utils::validation::{validate_credentials, validate_login, validate_not_blank};
use actix_web::{web, HttpResponse};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/v1/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created, verification code emailed"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn signup(
    db: web::Data<MongoDB>,
    mailer: web::Data<Mailer>,
    request: web::Json<SignupRequest>,
) -> HttpResponse {
    log::info!("📝 POST /v1/signup - email: {}", request.email);

    if let Err(errors) = validate_credentials(&request.email, &request.password) {
        return ApiError::ValidationFailed(errors).to_response();
    }

    match auth_service::signup(&db, &mailer, &request).await {
        Ok(response) => HttpResponse::Ok().json(success_object(
            "Sign up success",
            json!({ "token": response.token }),
        )),
        Err(e) => {
            log::warn!("❌ Signup failed: {} - {}", request.email, e);
            e.to_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    mailer: web::Data<Mailer>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /v1/login - email: {}", request.email);

    if let Err(errors) = validate_login(&request.email, &request.password) {
        return ApiError::ValidationFailed(errors).to_response();
    }

    match auth_service::login(&db, &mailer, &request).await {
        Ok(response) => HttpResponse::Ok().json(success_object(
            "Login success",
            json!({ "token": response.token, "verified": response.verified }),
        )),
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.to_response()
        }
    }
}

pub async fn verify_account(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    request: web::Json<VerifyRequest>,
) -> HttpResponse {
    log::info!("✓ POST /v1/verify - user: {}", user.sub);

    if let Err(errors) = validate_not_blank("code", &request.code) {
        return ApiError::ValidationFailed(errors).to_response();
    }

    match auth_service::verify_account(&db, &user.sub, &request.code).await {
        Ok(()) => HttpResponse::Ok().json(success_object("Account verified", json!({}))),
        Err(e) => {
            log::warn!("❌ Verification failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}

pub async fn verification_email(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    mailer: web::Data<Mailer>,
) -> HttpResponse {
    log::info!("📧 POST /v1/verificationEmail - user: {}", user.sub);

    match auth_service::resend_verification(&db, &mailer, &user.sub).await {
        Ok(()) => HttpResponse::Ok().json(success_object("Verification email sent", json!({}))),
        Err(e) => {
            log::warn!("❌ Re-send failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}
