use crate::database::MongoDB;
use crate::services::early_access_service::{self, EarlyAccessRequest};
use crate::utils::error::ApiError;
use crate::utils::response::success_object;
use crate::utils::validation::validate_email;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn add_early_access_user(
    db: web::Data<MongoDB>,
    request: web::Json<EarlyAccessRequest>,
) -> HttpResponse {
    log::info!("📝 POST /v1/addEarlyAccessUser - email: {}", request.email);

    if let Err(errors) = validate_email(&request.email) {
        return ApiError::ValidationFailed(errors).to_response();
    }

    match early_access_service::add_early_access_user(&db, &request.email).await {
        Ok(()) => {
            HttpResponse::Ok().json(success_object("Early access signup success", json!({})))
        }
        Err(e) => {
            log::warn!("❌ Early access signup failed: {} - {}", request.email, e);
            e.to_response()
        }
    }
}
